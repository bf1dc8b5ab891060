use std::time::{Duration, Instant};

/// Frame rate used when the caller does not ask for one.
pub const DEFAULT_FPS: f32 = 60.0;

/// High-level behaviour requested by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPolicy {
    /// Run the render loop continuously.
    Animate {
        /// Frames-per-second cap. `None` means [`DEFAULT_FPS`]; zero renders
        /// as fast as the surface allows.
        target_fps: Option<f32>,
    },
    /// Render a single frame at a fixed timestamp, then idle until input.
    Still {
        /// Timestamp the effect is evaluated at (seconds).
        time: f32,
    },
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::Animate { target_fps: None }
    }
}

/// Snapshot of the time state handed to effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Elapsed wall-clock or simulated time in seconds.
    pub seconds: f32,
    /// Monotonic frame counter for the running effect.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

/// Abstraction over where time values originate from.
pub trait TimeSource: Send {
    /// Restarts the source, e.g. when the effect changes.
    fn reset(&mut self);
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            frame: 0,
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self) {
        self.origin = Instant::now();
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.origin.elapsed().as_secs_f32(), self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source that always reports a fixed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    time: f32,
    frame: u64,
}

impl FixedTimeSource {
    pub fn new(time: f32) -> Self {
        Self { time, frame: 0 }
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

impl TimeSource for FixedTimeSource {
    fn reset(&mut self) {
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.time, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

pub type BoxedTimeSource = Box<dyn TimeSource + Send>;

/// Builds a time source suited to the requested render policy.
pub fn time_source_for_policy(policy: &RenderPolicy) -> BoxedTimeSource {
    match policy {
        RenderPolicy::Animate { .. } => Box::new(SystemTimeSource::new()),
        RenderPolicy::Still { time } => Box::new(FixedTimeSource::new(*time)),
    }
}

/// Decides when the next frame is due.
///
/// Animated policies pace frames at a fixed interval and skip frames that
/// were missed instead of catching up. A still policy produces exactly one
/// frame until [`FrameScheduler::request_frame`] or [`FrameScheduler::reset`].
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    still: bool,
    next_frame: Option<Instant>,
    still_pending: bool,
}

impl FrameScheduler {
    pub fn new(policy: &RenderPolicy) -> Self {
        match policy {
            RenderPolicy::Animate { target_fps } => {
                let fps = target_fps.unwrap_or(DEFAULT_FPS);
                let interval = (fps.is_finite() && fps > 0.0)
                    .then(|| Duration::from_secs_f32(1.0 / fps));
                Self {
                    interval,
                    still: false,
                    next_frame: None,
                    still_pending: false,
                }
            }
            RenderPolicy::Still { .. } => Self {
                interval: None,
                still: true,
                next_frame: None,
                still_pending: true,
            },
        }
    }

    pub fn frame_interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        if self.still {
            return self.still_pending;
        }
        self.next_frame.is_none_or(|deadline| now >= deadline)
    }

    /// Instant the event loop should wake up for, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.still {
            return None;
        }
        self.next_frame
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        if self.still {
            self.still_pending = false;
            return;
        }
        let Some(interval) = self.interval else {
            self.next_frame = None;
            return;
        };
        let next = match self.next_frame {
            Some(deadline) if now < deadline + interval => deadline + interval,
            _ => now + interval,
        };
        self.next_frame = Some(next);
    }

    /// Asks for one more frame, e.g. after input changed a still image.
    pub fn request_frame(&mut self) {
        if self.still {
            self.still_pending = true;
        } else {
            self.next_frame = None;
        }
    }

    pub fn reset(&mut self) {
        self.next_frame = None;
        self.still_pending = self.still;
    }
}
