use bytemuck::{Pod, Zeroable};

use crate::catalog::EffectKind;
use crate::clock::StepClock;
use crate::color::Rgb;
use crate::controls::{Control, ControlValue};
use crate::effect::{BlendMode, Effect, FrameContext, Geometry};

/// Quads allocated up front; the beam count slider never exceeds this.
pub const MAX_BEAMS: u32 = 20;

const LIGHT_COLORS: [(&str, Rgb); 5] = [
    ("White", Rgb::WHITE),
    ("Cyan", Rgb::new(0.0, 0.8, 1.0)),
    ("Purple", Rgb::new(0.8, 0.3, 1.0)),
    ("Gold", Rgb::new(1.0, 0.8, 0.3)),
    ("Green", Rgb::new(0.3, 1.0, 0.5)),
];
const LIGHT_NAMES: &[&str] = &["White", "Cyan", "Purple", "Gold", "Green"];

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BeamsUniforms {
    /// time, beam width, beam height, beam count
    pub beam: [f32; 4],
    /// speed, noise intensity, noise scale, rotation (radians)
    pub params: [f32; 4],
    pub light: [f32; 4],
    pub resolution: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeamsParams {
    pub light_color: String,
    pub beam_number: f32,
    pub beam_width: f32,
    pub beam_height: f32,
    pub speed: f32,
    pub noise_intensity: f32,
    pub scale: f32,
    /// Degrees.
    pub rotation: f32,
}

impl Default for BeamsParams {
    fn default() -> Self {
        Self {
            light_color: LIGHT_NAMES[0].to_string(),
            beam_number: 12.0,
            beam_width: 2.0,
            beam_height: 15.0,
            speed: 2.0,
            noise_intensity: 1.75,
            scale: 0.2,
            rotation: 0.0,
        }
    }
}

impl BeamsParams {
    pub fn light(&self) -> Rgb {
        LIGHT_COLORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&self.light_color))
            .map(|(_, rgb)| *rgb)
            .unwrap_or(Rgb::WHITE)
    }

    /// Beams actually drawn, truncated and clamped to the allocated quads.
    pub fn beam_count(&self) -> u32 {
        if self.beam_number.is_finite() {
            (self.beam_number.max(0.0) as u32).min(MAX_BEAMS)
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Beams {
    pub params: BeamsParams,
    clock: StepClock,
}

impl Beams {
    pub fn new(params: BeamsParams) -> Self {
        Self {
            params,
            clock: StepClock::new(),
        }
    }

    pub fn pack(&self, frame: &FrameContext) -> BeamsUniforms {
        let p = &self.params;
        BeamsUniforms {
            beam: [self.clock.time(), p.beam_width, p.beam_height, p.beam_number],
            params: [
                p.speed,
                p.noise_intensity,
                p.scale,
                p.rotation.to_radians(),
            ],
            light: p.light().extend(1.0),
            resolution: [frame.viewport.width, frame.viewport.height, 0.0, 0.0],
        }
    }
}

impl Effect for Beams {
    fn kind(&self) -> EffectKind {
        EffectKind::Beams
    }

    fn geometry(&self) -> Geometry {
        Geometry::IndexedQuads {
            count: self.params.beam_count(),
            capacity: MAX_BEAMS,
        }
    }

    fn blend(&self) -> BlendMode {
        BlendMode::Replace
    }

    fn transparent_background(&self) -> bool {
        false
    }

    fn advance(&mut self, _frame: &FrameContext) {
        self.clock.tick(1.0);
    }

    fn uniforms(&self, frame: &FrameContext) -> Vec<u8> {
        bytemuck::bytes_of(&self.pack(frame)).to_vec()
    }

    fn controls(&self) -> Vec<Control> {
        let p = &self.params;
        vec![
            Control::picker("light_color", "Light Color", LIGHT_NAMES, &p.light_color),
            Control::slider("beam_number", "Beam Count", 4.0, 20.0, p.beam_number)
                .with_step(1.0)
                .with_decimals(0),
            Control::slider("beam_width", "Beam Width", 0.5, 5.0, p.beam_width),
            Control::slider("beam_height", "Beam Height", 5.0, 25.0, p.beam_height),
            Control::slider("speed", "Wave Speed", 0.5, 5.0, p.speed),
            Control::slider("noise_intensity", "Noise Intensity", 0.5, 3.0, p.noise_intensity)
                .with_decimals(2),
            Control::slider("scale", "Noise Scale", 0.1, 1.0, p.scale).with_decimals(2),
            Control::slider("rotation", "Rotation", -45.0, 45.0, p.rotation).with_decimals(0),
        ]
    }

    fn assign(&mut self, id: &str, value: ControlValue) {
        let p = &mut self.params;
        match (id, value) {
            ("light_color", ControlValue::Choice(name)) => p.light_color = name,
            ("beam_number", ControlValue::Float(v)) => p.beam_number = v,
            ("beam_width", ControlValue::Float(v)) => p.beam_width = v,
            ("beam_height", ControlValue::Float(v)) => p.beam_height = v,
            ("speed", ControlValue::Float(v)) => p.speed = v,
            ("noise_intensity", ControlValue::Float(v)) => p.noise_intensity = v,
            ("scale", ControlValue::Float(v)) => p.scale = v,
            ("rotation", ControlValue::Float(v)) => p.rotation = v,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Viewport;

    #[test]
    fn rotation_is_packed_in_radians() {
        let mut beams = Beams::default();
        beams.apply("rotation", 45.0.into()).unwrap();
        let frame = FrameContext::new(0.0, 0, Viewport::new(320.0, 240.0));
        let packed = beams.pack(&frame);
        assert!((packed.params[3] - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert_eq!(packed.resolution, [320.0, 240.0, 0.0, 0.0]);
        assert_eq!(std::mem::size_of::<BeamsUniforms>(), 64);
    }

    #[test]
    fn geometry_draws_one_quad_per_beam() {
        let mut beams = Beams::default();
        assert_eq!(
            beams.geometry(),
            Geometry::IndexedQuads {
                count: 12,
                capacity: MAX_BEAMS
            }
        );
        beams.apply("beam_number", 40.0.into()).unwrap();
        assert_eq!(beams.params.beam_count(), 20);
    }

    #[test]
    fn beam_count_is_clamped_even_when_set_directly() {
        let params = BeamsParams {
            beam_number: 57.9,
            ..BeamsParams::default()
        };
        assert_eq!(params.beam_count(), MAX_BEAMS);
        let params = BeamsParams {
            beam_number: -2.0,
            ..BeamsParams::default()
        };
        assert_eq!(params.beam_count(), 0);
    }

    #[test]
    fn light_preset_selects_color() {
        let mut beams = Beams::default();
        beams.apply("light_color", "gold".into()).unwrap();
        let frame = FrameContext::new(0.0, 0, Viewport::default());
        assert_eq!(beams.pack(&frame).light, [1.0, 0.8, 0.3, 1.0]);
    }
}
