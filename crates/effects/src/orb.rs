use bytemuck::{Pod, Zeroable};

use crate::catalog::EffectKind;
use crate::clock::WallClock;
use crate::controls::{Control, ControlValue};
use crate::effect::{BlendMode, Effect, FrameContext};
use crate::gesture::{PointerEvent, Viewport};

/// Pointer radius (in min-axis units) inside which the orb reacts.
const HOVER_RADIUS: f32 = 0.8;
const HOVER_SMOOTHING: f32 = 0.1;
const ROTATION_SPEED: f32 = 0.3;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct OrbUniforms {
    pub time: f32,
    /// Hue shift in degrees.
    pub hue: f32,
    pub hover: f32,
    pub rot: f32,
    pub resolution: [f32; 2],
    pub hover_intensity: f32,
    pub _pad: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbParams {
    pub hue: f32,
    pub hover_intensity: f32,
    pub rotate_on_hover: bool,
    pub force_hover: bool,
}

impl Default for OrbParams {
    fn default() -> Self {
        Self {
            hue: 0.0,
            hover_intensity: 0.2,
            rotate_on_hover: true,
            force_hover: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Orb {
    pub params: OrbParams,
    clock: WallClock,
    target_hover: f32,
    hover: f32,
    rot: f32,
}

impl Orb {
    pub fn new(params: OrbParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn hover(&self) -> f32 {
        self.hover
    }

    pub fn rotation(&self) -> f32 {
        self.rot
    }

    pub fn pack(&self, frame: &FrameContext) -> OrbUniforms {
        OrbUniforms {
            time: self.clock.time(),
            hue: self.params.hue,
            hover: self.hover,
            rot: self.rot,
            resolution: [frame.viewport.width, frame.viewport.height],
            hover_intensity: self.params.hover_intensity,
            _pad: 0.0,
        }
    }
}

impl Effect for Orb {
    fn kind(&self) -> EffectKind {
        EffectKind::Orb
    }

    fn blend(&self) -> BlendMode {
        BlendMode::Premultiplied
    }

    fn transparent_background(&self) -> bool {
        true
    }

    fn advance(&mut self, frame: &FrameContext) {
        self.clock.sync(frame.seconds);
        let target = if self.params.force_hover {
            1.0
        } else {
            self.target_hover
        };
        self.hover += (target - self.hover) * HOVER_SMOOTHING;
        if self.params.rotate_on_hover && self.hover > 0.5 {
            self.rot += self.clock.delta() * ROTATION_SPEED;
        }
    }

    fn pointer(&mut self, event: PointerEvent, viewport: Viewport) {
        self.target_hover = match event.position() {
            Some(point) => {
                let [x, y] = viewport.centered_min_axis(point);
                if (x * x + y * y).sqrt() < HOVER_RADIUS {
                    1.0
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
    }

    fn uniforms(&self, frame: &FrameContext) -> Vec<u8> {
        bytemuck::bytes_of(&self.pack(frame)).to_vec()
    }

    fn controls(&self) -> Vec<Control> {
        vec![
            Control::slider("hue", "Hue", -180.0, 180.0, self.params.hue).with_decimals(0),
            Control::slider(
                "hover_intensity",
                "Hover Intensity",
                0.0,
                1.0,
                self.params.hover_intensity,
            )
            .with_decimals(2),
            Control::toggle(
                "rotate_on_hover",
                "Rotate on Hover",
                self.params.rotate_on_hover,
            ),
            Control::toggle("force_hover", "Force Hover", self.params.force_hover),
        ]
    }

    fn assign(&mut self, id: &str, value: ControlValue) {
        match (id, value) {
            ("hue", ControlValue::Float(v)) => self.params.hue = v,
            ("hover_intensity", ControlValue::Float(v)) => self.params.hover_intensity = v,
            ("rotate_on_hover", ControlValue::Bool(v)) => self.params.rotate_on_hover = v,
            ("force_hover", ControlValue::Bool(v)) => self.params.force_hover = v,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Point;

    fn frame(seconds: f32) -> FrameContext {
        FrameContext::new(seconds, 0, Viewport::new(400.0, 400.0))
    }

    #[test]
    fn payload_mirrors_parameters() {
        let mut orb = Orb::default();
        orb.apply("hue", 90.0.into()).unwrap();
        orb.apply("hover_intensity", 0.7.into()).unwrap();
        let packed = orb.pack(&frame(0.0));
        assert_eq!(packed.hue, 90.0);
        assert_eq!(packed.hover_intensity, 0.7);
        assert_eq!(packed.resolution, [400.0, 400.0]);
        assert_eq!(std::mem::size_of::<OrbUniforms>(), 32);
    }

    #[test]
    fn pointer_near_center_raises_hover_and_rotates() {
        let mut orb = Orb::default();
        let viewport = Viewport::new(400.0, 400.0);
        orb.pointer(PointerEvent::Down(Point::new(200.0, 200.0)), viewport);
        let mut seconds = 0.0;
        for _ in 0..60 {
            seconds += 1.0 / 60.0;
            orb.advance(&frame(seconds));
        }
        assert!(orb.hover() > 0.9);
        assert!(orb.rotation() > 0.0);

        orb.pointer(PointerEvent::Up, viewport);
        for _ in 0..60 {
            seconds += 1.0 / 60.0;
            orb.advance(&frame(seconds));
        }
        assert!(orb.hover() < 0.1);
    }

    #[test]
    fn pointer_outside_radius_targets_zero() {
        let mut orb = Orb::default();
        let viewport = Viewport::new(400.0, 400.0);
        orb.pointer(PointerEvent::Drag(Point::new(0.0, 0.0)), viewport);
        orb.advance(&frame(0.1));
        assert_eq!(orb.hover(), 0.0);
    }

    #[test]
    fn forced_hover_without_rotation_keeps_angle() {
        let mut orb = Orb::new(OrbParams {
            rotate_on_hover: false,
            force_hover: true,
            ..OrbParams::default()
        });
        for step in 1..=60 {
            orb.advance(&frame(step as f32 / 60.0));
        }
        assert!(orb.hover() > 0.9);
        assert_eq!(orb.rotation(), 0.0);
    }
}
