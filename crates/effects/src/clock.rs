/// Per-frame time increment used by the step-driven effects.
pub const FRAME_STEP: f32 = 0.016;

/// Accumulates animation time one frame at a time.
///
/// Never runs backwards: negative, NaN and infinite scales advance by zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepClock {
    time: f32,
}

impl StepClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances by `FRAME_STEP * scale` and returns the new time.
    pub fn tick(&mut self, scale: f32) -> f32 {
        let increment = FRAME_STEP * scale;
        if increment.is_finite() && increment > 0.0 {
            self.time += increment;
        }
        self.time
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }
}

/// Tracks wall-clock seconds handed over by the render loop, clamped so the
/// reported value is non-decreasing even if the source jumps backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WallClock {
    time: f32,
    delta: f32,
}

impl WallClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(&mut self, seconds: f32) -> f32 {
        if seconds.is_finite() && seconds > self.time {
            self.delta = seconds - self.time;
            self.time = seconds;
        } else {
            self.delta = 0.0;
        }
        self.time
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Seconds elapsed between the last two syncs.
    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_clock_is_monotonic_for_hostile_scales() {
        let mut clock = StepClock::new();
        let mut last = clock.time();
        for scale in [1.0, 0.5, -3.0, f32::NAN, 0.0, f32::INFINITY, 2.0] {
            let now = clock.tick(scale);
            assert!(now >= last, "time went backwards at scale {scale}");
            assert!(now.is_finite());
            last = now;
        }
        assert!((last - FRAME_STEP * 3.5).abs() < 1e-6);
    }

    #[test]
    fn wall_clock_ignores_backwards_jumps() {
        let mut clock = WallClock::new();
        assert_eq!(clock.sync(1.0), 1.0);
        assert_eq!(clock.delta(), 1.0);
        assert_eq!(clock.sync(0.5), 1.0);
        assert_eq!(clock.delta(), 0.0);
        assert_eq!(clock.sync(1.25), 1.25);
        assert_eq!(clock.delta(), 0.25);
    }
}
