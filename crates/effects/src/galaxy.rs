use bytemuck::{Pod, Zeroable};

use crate::catalog::EffectKind;
use crate::clock::{StepClock, FRAME_STEP};
use crate::controls::{Control, ControlValue};
use crate::effect::{BlendMode, Effect, FrameContext};
use crate::gesture::{PointerEvent, Viewport};

/// Seconds the mouse influence takes to fade after release.
const RELEASE_SECONDS: f32 = 0.5;

/// Named looks: (name, hue shift in degrees, saturation, glow).
const PRESETS: [(&str, f32, f32, f32); 5] = [
    ("Nebula", 140.0, 0.8, 0.3),
    ("Aurora", 180.0, 1.0, 0.5),
    ("Cosmic", 280.0, 0.6, 0.4),
    ("Solar", 60.0, 0.9, 0.6),
    ("Deep Space", 220.0, 0.4, 0.2),
];
const PRESET_NAMES: &[&str] = &["Nebula", "Aurora", "Cosmic", "Solar", "Deep Space"];

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GalaxyUniforms {
    /// time, width, height, star speed
    pub frame: [f32; 4],
    /// density, hue shift, speed, glow
    pub params1: [f32; 4],
    /// saturation, twinkle, rotation speed, repulsion strength
    pub params2: [f32; 4],
    /// x, y in unit coordinates (y up), active, auto center repulsion
    pub mouse: [f32; 4],
    /// focal x, focal y, rotation x, rotation y
    pub focal: [f32; 4],
    /// mouse repulsion, transparent
    pub flags: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalaxyParams {
    pub preset: String,
    pub focal: [f32; 2],
    pub rotation: [f32; 2],
    pub star_speed: f32,
    pub density: f32,
    pub speed: f32,
    pub twinkle_intensity: f32,
    pub rotation_speed: f32,
    pub repulsion_strength: f32,
    pub auto_center_repulsion: f32,
    pub mouse_repulsion: bool,
    pub transparent: bool,
}

impl Default for GalaxyParams {
    fn default() -> Self {
        Self {
            preset: PRESET_NAMES[0].to_string(),
            focal: [0.5, 0.5],
            rotation: [1.0, 0.0],
            star_speed: 0.5,
            density: 1.0,
            speed: 1.0,
            twinkle_intensity: 0.3,
            rotation_speed: 0.1,
            repulsion_strength: 2.0,
            auto_center_repulsion: 0.0,
            mouse_repulsion: true,
            transparent: true,
        }
    }
}

impl GalaxyParams {
    /// Hue shift, saturation and glow of the selected preset.
    pub fn look(&self) -> (f32, f32, f32) {
        let (_, hue, saturation, glow) = PRESETS
            .iter()
            .find(|(name, ..)| name.eq_ignore_ascii_case(&self.preset))
            .copied()
            .unwrap_or(PRESETS[0]);
        (hue, saturation, glow)
    }
}

#[derive(Debug, Clone)]
enum MouseState {
    Idle,
    Dragging,
    /// Seconds since release.
    Releasing(f32),
}

#[derive(Debug, Clone)]
pub struct Galaxy {
    pub params: GalaxyParams,
    clock: StepClock,
    mouse: [f32; 2],
    state: MouseState,
}

impl Default for Galaxy {
    fn default() -> Self {
        Self::new(GalaxyParams::default())
    }
}

impl Galaxy {
    pub fn new(params: GalaxyParams) -> Self {
        Self {
            params,
            clock: StepClock::new(),
            mouse: [0.5, 0.5],
            state: MouseState::Idle,
        }
    }

    /// Mouse influence in `[0, 1]`: full while dragging, eased out after release.
    pub fn mouse_active(&self) -> f32 {
        match self.state {
            MouseState::Idle => 0.0,
            MouseState::Dragging => 1.0,
            MouseState::Releasing(elapsed) => {
                let remaining = 1.0 - (elapsed / RELEASE_SECONDS).clamp(0.0, 1.0);
                remaining * remaining
            }
        }
    }

    pub fn pack(&self, frame: &FrameContext) -> GalaxyUniforms {
        let p = &self.params;
        let (hue_shift, saturation, glow) = p.look();
        let flag = |on: bool| if on { 1.0 } else { 0.0 };
        GalaxyUniforms {
            frame: [
                self.clock.time(),
                frame.viewport.width,
                frame.viewport.height,
                p.star_speed,
            ],
            params1: [p.density, hue_shift, p.speed, glow],
            params2: [
                saturation,
                p.twinkle_intensity,
                p.rotation_speed,
                p.repulsion_strength,
            ],
            mouse: [
                self.mouse[0],
                self.mouse[1],
                self.mouse_active(),
                p.auto_center_repulsion,
            ],
            focal: [p.focal[0], p.focal[1], p.rotation[0], p.rotation[1]],
            flags: [flag(p.mouse_repulsion), flag(p.transparent), 0.0, 0.0],
        }
    }
}

impl Effect for Galaxy {
    fn kind(&self) -> EffectKind {
        EffectKind::Galaxy
    }

    fn blend(&self) -> BlendMode {
        BlendMode::Alpha
    }

    fn transparent_background(&self) -> bool {
        self.params.transparent
    }

    fn advance(&mut self, _frame: &FrameContext) {
        self.clock.tick(1.0);
        if let MouseState::Releasing(elapsed) = &mut self.state {
            *elapsed += FRAME_STEP;
            if *elapsed >= RELEASE_SECONDS {
                self.state = MouseState::Idle;
            }
        }
    }

    fn pointer(&mut self, event: PointerEvent, viewport: Viewport) {
        match event.position() {
            Some(point) => {
                self.mouse = viewport.unit_flipped(point);
                self.state = MouseState::Dragging;
            }
            None => {
                if matches!(self.state, MouseState::Dragging) {
                    self.state = MouseState::Releasing(0.0);
                }
            }
        }
    }

    fn uniforms(&self, frame: &FrameContext) -> Vec<u8> {
        bytemuck::bytes_of(&self.pack(frame)).to_vec()
    }

    fn controls(&self) -> Vec<Control> {
        let p = &self.params;
        vec![
            Control::picker("preset", "Preset", PRESET_NAMES, &p.preset),
            Control::slider("star_speed", "Star Speed", 0.1, 2.0, p.star_speed).with_decimals(2),
            Control::slider("density", "Star Density", 0.5, 3.0, p.density),
            Control::slider("speed", "Animation Speed", 0.1, 3.0, p.speed),
            Control::slider("twinkle_intensity", "Twinkle Intensity", 0.0, 1.0, p.twinkle_intensity)
                .with_decimals(2),
            Control::slider("rotation_speed", "Rotation Speed", 0.0, 0.5, p.rotation_speed)
                .with_decimals(2),
            Control::slider(
                "repulsion_strength",
                "Repulsion Strength",
                0.5,
                5.0,
                p.repulsion_strength,
            ),
            Control::slider(
                "auto_center_repulsion",
                "Center Repulsion",
                0.0,
                3.0,
                p.auto_center_repulsion,
            ),
            Control::toggle("mouse_repulsion", "Mouse Repulsion", p.mouse_repulsion),
            Control::toggle("transparent", "Transparent Background", p.transparent),
        ]
    }

    fn assign(&mut self, id: &str, value: ControlValue) {
        let p = &mut self.params;
        match (id, value) {
            ("preset", ControlValue::Choice(name)) => p.preset = name,
            ("star_speed", ControlValue::Float(v)) => p.star_speed = v,
            ("density", ControlValue::Float(v)) => p.density = v,
            ("speed", ControlValue::Float(v)) => p.speed = v,
            ("twinkle_intensity", ControlValue::Float(v)) => p.twinkle_intensity = v,
            ("rotation_speed", ControlValue::Float(v)) => p.rotation_speed = v,
            ("repulsion_strength", ControlValue::Float(v)) => p.repulsion_strength = v,
            ("auto_center_repulsion", ControlValue::Float(v)) => p.auto_center_repulsion = v,
            ("mouse_repulsion", ControlValue::Bool(v)) => p.mouse_repulsion = v,
            ("transparent", ControlValue::Bool(v)) => p.transparent = v,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Point;

    fn frame() -> FrameContext {
        FrameContext::new(0.0, 0, Viewport::new(200.0, 100.0))
    }

    #[test]
    fn preset_drives_hue_saturation_and_glow() {
        let mut galaxy = Galaxy::default();
        galaxy.apply("preset", "deep space".into()).unwrap();
        let packed = galaxy.pack(&frame());
        assert_eq!(packed.params1[1], 220.0);
        assert_eq!(packed.params1[3], 0.2);
        assert_eq!(packed.params2[0], 0.4);
        assert_eq!(std::mem::size_of::<GalaxyUniforms>(), 96);
    }

    #[test]
    fn drag_sets_flipped_unit_position() {
        let mut galaxy = Galaxy::default();
        galaxy.pointer(PointerEvent::Drag(Point::new(50.0, 25.0)), frame().viewport);
        let packed = galaxy.pack(&frame());
        assert_eq!(&packed.mouse[..3], &[0.25, 0.75, 1.0]);
    }

    #[test]
    fn release_fades_out_within_half_a_second() {
        let mut galaxy = Galaxy::default();
        galaxy.pointer(PointerEvent::Down(Point::new(10.0, 10.0)), frame().viewport);
        galaxy.pointer(PointerEvent::Up, frame().viewport);
        galaxy.advance(&frame());
        let early = galaxy.mouse_active();
        assert!(early > 0.0 && early < 1.0);
        for _ in 0..40 {
            galaxy.advance(&frame());
        }
        assert_eq!(galaxy.mouse_active(), 0.0);
    }

    #[test]
    fn transparency_controls_clear_alpha_and_flag() {
        let mut galaxy = Galaxy::default();
        let clear = galaxy.clear_color();
        let see_through = galaxy.pack(&frame());
        assert_eq!(clear[3], 0.0);
        assert_eq!(see_through.flags[1], 1.0);

        galaxy.apply("transparent", false.into()).unwrap();
        let mut expected = see_through;
        expected.flags[1] = 0.0;
        assert_eq!(galaxy.pack(&frame()), expected);
        assert_eq!(galaxy.clear_color(), [clear[0], clear[1], clear[2], 1.0]);
    }
}
