use bytemuck::{Pod, Zeroable};

use crate::catalog::EffectKind;
use crate::clock::StepClock;
use crate::color::{NamedColor, Rgb};
use crate::controls::{Control, ControlValue};
use crate::effect::{BlendMode, Effect, FrameContext};
use crate::gesture::{Point, PointerEvent, Viewport};

const COLORS: &[&str] = &["Blue", "Green", "Orange", "Pink", "Purple", "White"];
const DIRECTIONS: &[&str] = &["forward", "reverse", "pingpong"];
/// Shader time runs at this fraction of the configured speed.
const SPEED_FACTOR: f32 = 0.4;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PlasmaUniforms {
    /// time, width, height, speed
    pub u1: [f32; 4],
    /// direction, scale, opacity, use custom color
    pub u2: [f32; 4],
    /// rgb, mouse interactive
    pub color: [f32; 4],
    pub mouse: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlasmaParams {
    pub color: String,
    pub speed: f32,
    pub direction: String,
    pub scale: f32,
    pub opacity: f32,
    pub mouse_interactive: bool,
}

impl Default for PlasmaParams {
    fn default() -> Self {
        Self {
            color: "White".to_string(),
            speed: 1.0,
            direction: DIRECTIONS[0].to_string(),
            scale: 1.0,
            opacity: 1.0,
            mouse_interactive: true,
        }
    }
}

impl PlasmaParams {
    pub fn rgb(&self) -> Rgb {
        NamedColor::from_name(&self.color)
            .map(NamedColor::rgb)
            .unwrap_or(Rgb::WHITE)
    }

    /// Signed multiplier applied to the flow at `time`.
    pub fn direction_value(&self, time: f32) -> f32 {
        match self.direction.to_ascii_lowercase().as_str() {
            "reverse" => -1.0,
            "pingpong" => (time * 0.5).sin(),
            _ => 1.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Plasma {
    pub params: PlasmaParams,
    clock: StepClock,
    mouse: Point,
}

impl Plasma {
    pub fn new(params: PlasmaParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn pack(&self, frame: &FrameContext) -> PlasmaUniforms {
        let p = &self.params;
        let time = self.clock.time();
        let rgb = p.rgb();
        let custom = if rgb.is_white() { 0.0 } else { 1.0 };
        let interactive = if p.mouse_interactive { 1.0 } else { 0.0 };
        PlasmaUniforms {
            u1: [
                time,
                frame.viewport.width,
                frame.viewport.height,
                p.speed * SPEED_FACTOR,
            ],
            u2: [p.direction_value(time), p.scale, p.opacity, custom],
            color: rgb.extend(interactive),
            mouse: [self.mouse.x, self.mouse.y, 0.0, 0.0],
        }
    }
}

impl Effect for Plasma {
    fn kind(&self) -> EffectKind {
        EffectKind::Plasma
    }

    fn blend(&self) -> BlendMode {
        BlendMode::Alpha
    }

    fn transparent_background(&self) -> bool {
        true
    }

    fn advance(&mut self, _frame: &FrameContext) {
        self.clock.tick(1.0);
    }

    fn pointer(&mut self, event: PointerEvent, viewport: Viewport) {
        if !self.params.mouse_interactive {
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
            Control::picker("color", "Color", COLORS, &p.color),
            Control::picker("direction", "Direction", DIRECTIONS, &p.direction),
            Control::slider("speed", "Speed", 0.1, 3.0, p.speed),
            Control::slider("scale", "Scale", 0.5, 3.0, p.scale),
            Control::slider("opacity", "Opacity", 0.0, 1.0, p.opacity).with_decimals(2),
            Control::toggle("mouse_interactive", "Mouse Interactive", p.mouse_interactive),
        ]
    }

    fn assign(&mut self, id: &str, value: ControlValue) {
        let p = &mut self.params;
        match (id, value) {
            ("color", ControlValue::Choice(name)) => p.color = name,
            ("direction", ControlValue::Choice(name)) => p.direction = name,
            ("speed", ControlValue::Float(v)) => p.speed = v,
            ("scale", ControlValue::Float(v)) => p.scale = v,
            ("opacity", ControlValue::Float(v)) => p.opacity = v,
            ("mouse_interactive", ControlValue::Bool(v)) => p.mouse_interactive = v,
            _ => {}
        }
    }
}
