use bytemuck::{Pod, Zeroable};

use crate::catalog::EffectKind;
use crate::clock::WallClock;
use crate::color::Rgb;
use crate::controls::{Control, ControlValue};
use crate::effect::{BlendMode, Effect, FrameContext};

pub const STOP_COUNT: usize = 3;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct AuroraUniforms {
    pub time: f32,
    pub amplitude: f32,
    pub blend: f32,
    pub _pad0: f32,
    pub resolution: [f32; 2],
    pub _pad1: [f32; 2],
    pub color_stops: [[f32; 4]; STOP_COUNT],
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuroraParams {
    pub color_stops: [Rgb; STOP_COUNT],
    pub amplitude: f32,
    pub blend: f32,
}

impl Default for AuroraParams {
    fn default() -> Self {
        Self {
            color_stops: [
                Rgb::new(0.32, 0.15, 1.0),
                Rgb::new(0.49, 1.0, 0.40),
                Rgb::new(0.32, 0.15, 1.0),
            ],
            amplitude: 1.0,
            blend: 0.5,
        }
    }
}

impl AuroraParams {
    /// Takes the first three stops, padding with white when fewer are given.
    pub fn with_stops(mut self, stops: &[Rgb]) -> Self {
        for (index, slot) in self.color_stops.iter_mut().enumerate() {
            *slot = stops.get(index).copied().unwrap_or(Rgb::WHITE);
        }
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Aurora {
    pub params: AuroraParams,
    clock: WallClock,
}

impl Aurora {
    pub fn new(params: AuroraParams) -> Self {
        Self {
            params,
            clock: WallClock::new(),
        }
    }

    pub fn pack(&self, frame: &FrameContext) -> AuroraUniforms {
        AuroraUniforms {
            time: self.clock.time(),
            amplitude: self.params.amplitude,
            blend: self.params.blend,
            _pad0: 0.0,
            resolution: [frame.viewport.width, frame.viewport.height],
            _pad1: [0.0; 2],
            color_stops: self.params.color_stops.map(|stop| stop.extend(0.0)),
        }
    }
}

const STOP_IDS: [&str; STOP_COUNT] = ["stop1", "stop2", "stop3"];
const STOP_LABELS: [&str; STOP_COUNT] = ["Color Stop 1", "Color Stop 2", "Color Stop 3"];

impl Effect for Aurora {
    fn kind(&self) -> EffectKind {
        EffectKind::Aurora
    }

    fn blend(&self) -> BlendMode {
        BlendMode::Premultiplied
    }

    fn transparent_background(&self) -> bool {
        true
    }

    fn advance(&mut self, frame: &FrameContext) {
        self.clock.sync(frame.seconds);
    }

    fn uniforms(&self, frame: &FrameContext) -> Vec<u8> {
        bytemuck::bytes_of(&self.pack(frame)).to_vec()
    }

    fn controls(&self) -> Vec<Control> {
        let mut controls = vec![
            Control::slider("amplitude", "Amplitude", 0.2, 2.0, self.params.amplitude)
                .with_decimals(2),
            Control::slider("blend", "Blend", 0.0, 1.0, self.params.blend).with_decimals(2),
        ];
        for index in 0..STOP_COUNT {
            controls.push(Control::color(
                STOP_IDS[index],
                STOP_LABELS[index],
                self.params.color_stops[index],
            ));
        }
        controls
    }

    fn assign(&mut self, id: &str, value: ControlValue) {
        match (id, value) {
            ("amplitude", ControlValue::Float(v)) => self.params.amplitude = v,
            ("blend", ControlValue::Float(v)) => self.params.blend = v,
            (stop, ControlValue::Color(rgb)) => {
                if let Some(index) = STOP_IDS.iter().position(|id| *id == stop) {
                    self.params.color_stops[index] = rgb;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Viewport;
    use crate::error::EffectError;

    #[test]
    fn payload_mirrors_parameters() {
        let mut aurora = Aurora::default();
        aurora.apply("amplitude", 1.5.into()).unwrap();
        aurora.apply("blend", 0.25.into()).unwrap();
        let frame = FrameContext::new(2.5, 150, Viewport::new(1280.0, 720.0));
        aurora.advance(&frame);
        let packed = aurora.pack(&frame);
        assert_eq!(packed.time, 2.5);
        assert_eq!(packed.amplitude, 1.5);
        assert_eq!(packed.blend, 0.25);
        assert_eq!(packed.resolution, [1280.0, 720.0]);
        assert_eq!(packed.color_stops[1], [0.49, 1.0, 0.40, 0.0]);
        assert_eq!(std::mem::size_of::<AuroraUniforms>(), 80);
    }

    #[test]
    fn short_stop_lists_are_padded_with_white() {
        let params = AuroraParams::default().with_stops(&[Rgb::BLACK]);
        assert_eq!(params.color_stops, [Rgb::BLACK, Rgb::WHITE, Rgb::WHITE]);
        let params = AuroraParams::default().with_stops(&[Rgb::BLACK; 5]);
        assert_eq!(params.color_stops, [Rgb::BLACK; 3]);
    }

    #[test]
    fn stops_accept_hex_strings() {
        let mut aurora = Aurora::default();
        aurora.apply_str("stop2", "#FF0000").unwrap();
        assert_eq!(aurora.params.color_stops[1], Rgb::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn multibyte_stop_value_is_an_invalid_value_error() {
        let mut aurora = Aurora::default();
        let before = aurora.controls();
        let err = aurora.apply_str("stop1", "#aéaaa").unwrap_err();
        assert!(matches!(err, EffectError::InvalidValue { .. }), "{err}");
        assert_eq!(aurora.controls(), before);
    }

    #[test]
    fn time_follows_wall_clock_monotonically() {
        let mut aurora = Aurora::default();
        let viewport = Viewport::new(10.0, 10.0);
        aurora.advance(&FrameContext::new(3.0, 0, viewport));
        aurora.advance(&FrameContext::new(1.0, 1, viewport));
        assert_eq!(aurora.pack(&FrameContext::new(1.0, 1, viewport)).time, 3.0);
    }
}
