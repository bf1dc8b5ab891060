use bytemuck::{Pod, Zeroable};

use crate::catalog::EffectKind;
use crate::clock::StepClock;
use crate::color::Rgb;
use crate::controls::{Control, ControlValue};
use crate::effect::{BlendMode, Effect, FrameContext};
use crate::gesture::{Point, PointerEvent, Viewport};

const PALETTE: [(&str, Rgb); 5] = [
    ("Monochrome", Rgb::new(0.5, 0.5, 0.5)),
    ("Ocean", Rgb::new(0.2, 0.5, 0.8)),
    ("Sunset", Rgb::new(0.9, 0.4, 0.3)),
    ("Forest", Rgb::new(0.3, 0.7, 0.4)),
    ("Purple", Rgb::new(0.6, 0.3, 0.8)),
];
const PALETTE_NAMES: &[&str] = &["Monochrome", "Ocean", "Sunset", "Forest", "Purple"];

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DitherUniforms {
    /// time, width, height, wave speed
    pub frame: [f32; 4],
    /// frequency, amplitude, color levels, pixel size
    pub wave: [f32; 4],
    /// rgb, mouse interaction flag
    pub color: [f32; 4],
    /// x, y (physical pixels), radius, unused
    pub mouse: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct DitherParams {
    pub wave_color: String,
    pub wave_speed: f32,
    pub wave_frequency: f32,
    pub wave_amplitude: f32,
    pub color_num: f32,
    pub pixel_size: f32,
    pub mouse_interaction: bool,
    pub mouse_radius: f32,
}

impl Default for DitherParams {
    fn default() -> Self {
        Self {
            wave_color: PALETTE_NAMES[0].to_string(),
            wave_speed: 0.05,
            wave_frequency: 3.0,
            wave_amplitude: 0.3,
            color_num: 4.0,
            pixel_size: 2.0,
            mouse_interaction: true,
            mouse_radius: 0.3,
        }
    }
}

impl DitherParams {
    pub fn color(&self) -> Rgb {
        PALETTE
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&self.wave_color))
            .map(|(_, rgb)| *rgb)
            .unwrap_or(PALETTE[0].1)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dither {
    pub params: DitherParams,
    clock: StepClock,
    mouse: Point,
}

impl Dither {
    pub fn new(params: DitherParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn pack(&self, frame: &FrameContext) -> DitherUniforms {
        let p = &self.params;
        let mouse_flag = if p.mouse_interaction { 1.0 } else { 0.0 };
        DitherUniforms {
            frame: [
                self.clock.time(),
                frame.viewport.width,
                frame.viewport.height,
                p.wave_speed,
            ],
            wave: [p.wave_frequency, p.wave_amplitude, p.color_num, p.pixel_size],
            color: p.color().extend(mouse_flag),
            mouse: [self.mouse.x, self.mouse.y, p.mouse_radius, 0.0],
        }
    }
}

impl Effect for Dither {
    fn kind(&self) -> EffectKind {
        EffectKind::Dither
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

    fn pointer(&mut self, event: PointerEvent, viewport: Viewport) {
        if !self.params.mouse_interaction {
            return;
        }
        if let Some(point) = event.position() {
            self.mouse = viewport.clamp(point);
        }
    }

    fn uniforms(&self, frame: &FrameContext) -> Vec<u8> {
        bytemuck::bytes_of(&self.pack(frame)).to_vec()
    }

    fn controls(&self) -> Vec<Control> {
        let p = &self.params;
        vec![
            Control::picker("wave_color", "Color Preset", PALETTE_NAMES, &p.wave_color),
            Control::slider("wave_speed", "Wave Speed", 0.01, 0.2, p.wave_speed).with_decimals(3),
            Control::slider("wave_frequency", "Wave Frequency", 1.0, 10.0, p.wave_frequency),
            Control::slider("wave_amplitude", "Wave Amplitude", 0.1, 0.8, p.wave_amplitude)
                .with_decimals(2),
            Control::slider("color_num", "Color Levels", 2.0, 16.0, p.color_num)
                .with_step(1.0)
                .with_decimals(0),
            Control::slider("pixel_size", "Pixel Size", 1.0, 8.0, p.pixel_size)
                .with_step(1.0)
                .with_decimals(0),
            Control::toggle("mouse_interaction", "Mouse Interaction", p.mouse_interaction),
            Control::slider("mouse_radius", "Mouse Radius", 0.05, 1.0, p.mouse_radius)
                .with_decimals(2),
        ]
    }

    fn assign(&mut self, id: &str, value: ControlValue) {
        let p = &mut self.params;
        match (id, value) {
            ("wave_color", ControlValue::Choice(name)) => p.wave_color = name,
            ("wave_speed", ControlValue::Float(v)) => p.wave_speed = v,
            ("wave_frequency", ControlValue::Float(v)) => p.wave_frequency = v,
            ("wave_amplitude", ControlValue::Float(v)) => p.wave_amplitude = v,
            ("color_num", ControlValue::Float(v)) => p.color_num = v,
            ("pixel_size", ControlValue::Float(v)) => p.pixel_size = v,
            ("mouse_interaction", ControlValue::Bool(v)) => p.mouse_interaction = v,
            ("mouse_radius", ControlValue::Float(v)) => p.mouse_radius = v,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FRAME_STEP;

    fn frame() -> FrameContext {
        FrameContext::new(0.0, 0, Viewport::new(800.0, 600.0))
    }

    #[test]
    fn payload_mirrors_parameters() {
        let mut dither = Dither::default();
        dither.apply("wave_color", "ocean".into()).unwrap();
        dither.apply("color_num", 8.0.into()).unwrap();
        dither.apply("pixel_size", 3.0.into()).unwrap();
        dither.advance(&frame());
        dither.advance(&frame());
        let packed = dither.pack(&frame());
        assert!((packed.frame[0] - 2.0 * FRAME_STEP).abs() < 1e-6);
        assert_eq!(&packed.frame[1..], &[800.0, 600.0, 0.05]);
        assert_eq!(packed.wave, [3.0, 0.3, 8.0, 3.0]);
        assert_eq!(packed.color, [0.2, 0.5, 0.8, 1.0]);
        assert_eq!(std::mem::size_of::<DitherUniforms>(), 64);
    }

    #[test]
    fn color_levels_snap_to_whole_numbers() {
        let mut dither = Dither::default();
        let value = dither.apply("color_num", 5.4.into()).unwrap();
        assert_eq!(value, ControlValue::Float(5.0));
    }

    #[test]
    fn pointer_is_ignored_when_interaction_disabled() {
        let mut dither = Dither::default();
        let viewport = Viewport::new(800.0, 600.0);
        dither.pointer(PointerEvent::Drag(Point::new(100.0, 50.0)), viewport);
        assert_eq!(&dither.pack(&frame()).mouse[..3], &[100.0, 50.0, 0.3]);

        dither.apply("mouse_interaction", false.into()).unwrap();
        dither.pointer(PointerEvent::Drag(Point::new(300.0, 300.0)), viewport);
        let packed = dither.pack(&frame());
        assert_eq!(&packed.mouse[..2], &[100.0, 50.0]);
        assert_eq!(packed.color[3], 0.0);
    }
}
