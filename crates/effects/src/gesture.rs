//! Pointer input normalisation.
//!
//! Positions arrive in physical pixels with a top-left origin. Effects consume
//! them in one of a few normalised spaces; every helper clamps its input to the
//! viewport first so out-of-window drags never escape the documented range.

/// Drawable size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn min_axis(&self) -> f32 {
        self.width.min(self.height)
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Clamps a point into the drawable rectangle.
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            sanitize(point.x).clamp(0.0, self.width),
            sanitize(point.y).clamp(0.0, self.height),
        )
    }

    /// `[0, 1]` on both axes, y growing downwards.
    pub fn unit(&self, point: Point) -> [f32; 2] {
        let p = self.clamp(point);
        [p.x / self.width, p.y / self.height]
    }

    /// `[0, 1]` on both axes, y growing upwards.
    pub fn unit_flipped(&self, point: Point) -> [f32; 2] {
        let [x, y] = self.unit(point);
        [x, 1.0 - y]
    }

    /// Clip space: `[-1, 1]` on both axes, y growing upwards.
    pub fn clip(&self, point: Point) -> [f32; 2] {
        let [x, y] = self.unit(point);
        [x * 2.0 - 1.0, -(y * 2.0 - 1.0)]
    }

    /// Offset from the center divided by the half extent of each axis, so
    /// both axes span `[-1, 1]`. The y axis grows downwards.
    pub fn centered(&self, point: Point) -> [f32; 2] {
        let p = self.clamp(point);
        let c = self.center();
        [(p.x - c.x) / c.x, (p.y - c.y) / c.y]
    }

    /// Offset from the center scaled by the shorter axis. The shorter axis
    /// spans `[-1, 1]`; the longer axis extends proportionally beyond it.
    pub fn centered_min_axis(&self, point: Point) -> [f32; 2] {
        let p = self.clamp(point);
        let c = self.center();
        let min = self.min_axis();
        [(p.x - c.x) / min * 2.0, (p.y - c.y) / min * 2.0]
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// A position in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Touch or mouse gesture phases delivered to effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Drag(Point),
    Up,
}

impl PointerEvent {
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down(point) | PointerEvent::Drag(point) => Some(*point),
            PointerEvent::Up => None,
        }
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
