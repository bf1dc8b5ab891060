use bytemuck::{Pod, Zeroable};

use crate::catalog::EffectKind;
use crate::clock::WallClock;
use crate::color::Rgb;
use crate::controls::{Control, ControlValue};
use crate::effect::{BlendMode, Effect, FrameContext};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SilkUniforms {
    pub time: f32,
    pub speed: f32,
    pub scale: f32,
    pub rotation: f32,
    pub resolution: [f32; 2],
    pub noise_intensity: f32,
    pub _pad: f32,
    pub color: [f32; 4],
}

/// Silk parameters. The fabric tint is kept as hue/saturation/brightness so
/// the dock can walk each channel independently.
#[derive(Debug, Clone, PartialEq)]
pub struct SilkParams {
    pub speed: f32,
    pub scale: f32,
    pub noise_intensity: f32,
    pub rotation: f32,
    pub hue: f32,
    pub saturation: f32,
    pub brightness: f32,
}

impl Default for SilkParams {
    fn default() -> Self {
        Self {
            speed: 5.0,
            scale: 1.0,
            noise_intensity: 1.5,
            rotation: 0.0,
            hue: 270.0,
            saturation: 0.15,
            brightness: 0.55,
        }
    }
}

impl SilkParams {
    pub fn color(&self) -> Rgb {
        Rgb::from_hsb(self.hue, self.saturation, self.brightness)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Silk {
    pub params: SilkParams,
    clock: WallClock,
}

impl Silk {
    pub fn new(params: SilkParams) -> Self {
        Self {
            params,
            clock: WallClock::new(),
        }
    }

    pub fn pack(&self, frame: &FrameContext) -> SilkUniforms {
        SilkUniforms {
            time: self.clock.time(),
            speed: self.params.speed,
            scale: self.params.scale,
            rotation: self.params.rotation,
            resolution: [frame.viewport.width, frame.viewport.height],
            noise_intensity: self.params.noise_intensity,
            _pad: 0.0,
            color: self.params.color().extend(1.0),
        }
    }
}

impl Effect for Silk {
    fn kind(&self) -> EffectKind {
        EffectKind::Silk
    }

    fn blend(&self) -> BlendMode {
        BlendMode::Replace
    }

    fn transparent_background(&self) -> bool {
        false
    }

    fn advance(&mut self, frame: &FrameContext) {
        self.clock.sync(frame.seconds);
    }

    fn uniforms(&self, frame: &FrameContext) -> Vec<u8> {
        bytemuck::bytes_of(&self.pack(frame)).to_vec()
    }

    fn controls(&self) -> Vec<Control> {
        let p = &self.params;
        vec![
            Control::slider("speed", "Speed", 0.0, 10.0, p.speed),
            Control::slider("scale", "Scale", 0.5, 3.0, p.scale).with_decimals(2),
            Control::slider("noise_intensity", "Noise", 0.0, 3.0, p.noise_intensity),
            Control::slider("rotation", "Rotation", -3.14, 3.14, p.rotation).with_decimals(2),
            Control::slider("hue", "Hue", 0.0, 360.0, p.hue).with_decimals(0),
            Control::slider("saturation", "Saturation", 0.0, 1.0, p.saturation).with_decimals(2),
            Control::slider("brightness", "Brightness", 0.0, 1.0, p.brightness).with_decimals(2),
        ]
    }

    fn assign(&mut self, id: &str, value: ControlValue) {
        let Some(v) = value.as_float() else {
            return;
        };
        let p = &mut self.params;
        match id {
            "speed" => p.speed = v,
            "scale" => p.scale = v,
            "noise_intensity" => p.noise_intensity = v,
            "rotation" => p.rotation = v,
            "hue" => p.hue = v,
            "saturation" => p.saturation = v,
            "brightness" => p.brightness = v,
            _ => {}
        }
    }
}
