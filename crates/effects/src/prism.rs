use bytemuck::{Pod, Zeroable};

use crate::catalog::EffectKind;
use crate::clock::StepClock;
use crate::controls::{Control, ControlValue};
use crate::effect::{BlendMode, Effect, FrameContext};
use crate::gesture::{PointerEvent, Viewport};

const ANIMATIONS: &[&str] = &["rotate", "hover", "3drotate"];
const HOVER_RANGE: f32 = 0.6;
const RELEASE_SMOOTHING: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    /// Built-in wobble in the shader, no external rotation.
    Rotate,
    /// Tilts toward the pointer.
    Hover,
    /// Continuous yaw, pitch and roll.
    Rotate3d,
}

impl Animation {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "hover" => Animation::Hover,
            "3drotate" => Animation::Rotate3d,
            _ => Animation::Rotate,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PrismUniforms {
    /// time, width, height, prism height
    pub u1: [f32; 4],
    /// base half width, glow, noise, saturation
    pub u2: [f32; 4],
    /// scale, hue shift, color frequency, bloom
    pub u3: [f32; 4],
    /// center shift, 1 / base half width, 1 / height, min axis
    pub u4: [f32; 4],
    /// pixel scale, time scale
    pub u5: [f32; 4],
    /// Rotation matrix columns (xyz + pad).
    pub rotation: [[f32; 4]; 3],
    /// use base wobble
    pub flags: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrismParams {
    pub height: f32,
    pub base_width: f32,
    pub animation: String,
    pub glow: f32,
    pub noise: f32,
    pub transparent: bool,
    pub scale: f32,
    pub hue_shift: f32,
    pub color_frequency: f32,
    pub hover_strength: f32,
    pub inertia: f32,
    pub bloom: f32,
    pub time_scale: f32,
}

impl Default for PrismParams {
    fn default() -> Self {
        Self {
            height: 3.5,
            base_width: 5.5,
            animation: ANIMATIONS[0].to_string(),
            glow: 1.0,
            noise: 0.5,
            transparent: true,
            scale: 3.6,
            hue_shift: 0.0,
            color_frequency: 1.0,
            hover_strength: 2.0,
            inertia: 0.05,
            bloom: 1.0,
            time_scale: 0.5,
        }
    }
}

impl PrismParams {
    /// Keeps geometry strictly positive and intensities non-negative.
    pub fn sanitized(mut self) -> Self {
        self.height = self.height.max(0.001);
        self.base_width = self.base_width.max(0.001);
        self.scale = self.scale.max(0.001);
        self.glow = self.glow.max(0.0);
        self.noise = self.noise.max(0.0);
        self.color_frequency = self.color_frequency.max(0.0);
        self.hover_strength = self.hover_strength.max(0.0);
        self.bloom = self.bloom.max(0.0);
        self.time_scale = self.time_scale.max(0.0);
        self.inertia = self.inertia.clamp(0.0, 1.0);
        self
    }

    pub fn animation(&self) -> Animation {
        Animation::parse(&self.animation)
    }
}

/// Column-major rotation from yaw (y axis), pitch (x axis) and roll (z axis).
pub fn rotation_matrix(yaw: f32, pitch: f32, roll: f32) -> [[f32; 3]; 3] {
    let (sy, cy) = yaw.sin_cos();
    let (sx, cx) = pitch.sin_cos();
    let (sz, cz) = roll.sin_cos();
    [
        [cy * cz + sy * sx * sz, cx * sz, -sy * cz + cy * sx * sz],
        [-cy * sz + sy * sx * cz, cx * cz, sy * sz + cy * sx * cz],
        [sy * cx, -sx, cy * cx],
    ]
}

#[derive(Debug, Clone)]
pub struct Prism {
    pub params: PrismParams,
    clock: StepClock,
    yaw: f32,
    pitch: f32,
    roll: f32,
    /// Pointer-driven (yaw, pitch) while hovering.
    target: Option<[f32; 2]>,
}

impl Default for Prism {
    fn default() -> Self {
        Self::new(PrismParams::default())
    }
}

impl Prism {
    pub fn new(params: PrismParams) -> Self {
        Self {
            params: params.sanitized(),
            clock: StepClock::new(),
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            target: None,
        }
    }

    pub fn angles(&self) -> [f32; 3] {
        [self.yaw, self.pitch, self.roll]
    }

    pub fn pack(&self, frame: &FrameContext) -> PrismUniforms {
        let p = &self.params;
        let base_half = p.base_width * 0.5;
        let saturation = if p.transparent { 1.5 } else { 1.0 };
        let px_scale = 1.0 / (frame.viewport.height * 0.1 * p.scale);
        let wobble = if p.animation() == Animation::Rotate { 1.0 } else { 0.0 };
        let [c0, c1, c2] = rotation_matrix(self.yaw, self.pitch, self.roll);
        PrismUniforms {
            u1: [
                self.clock.time(),
                frame.viewport.width,
                frame.viewport.height,
                p.height,
            ],
            u2: [base_half, p.glow, p.noise, saturation],
            u3: [p.scale, p.hue_shift, p.color_frequency, p.bloom],
            u4: [
                p.height * 0.25,
                1.0 / base_half,
                1.0 / p.height,
                base_half.min(p.height),
            ],
            u5: [px_scale, p.time_scale, 0.0, 0.0],
            rotation: [
                [c0[0], c0[1], c0[2], 0.0],
                [c1[0], c1[1], c1[2], 0.0],
                [c2[0], c2[1], c2[2], 0.0],
            ],
            flags: [wobble, 0.0, 0.0, 0.0],
        }
    }
}

impl Effect for Prism {
    fn kind(&self) -> EffectKind {
        EffectKind::Prism
    }

    fn blend(&self) -> BlendMode {
        BlendMode::Alpha
    }

    fn transparent_background(&self) -> bool {
        self.params.transparent
    }

    fn advance(&mut self, _frame: &FrameContext) {
        let time = self.clock.tick(1.0);
        match self.params.animation() {
            Animation::Rotate3d => {
                let t = time * self.params.time_scale;
                self.yaw = t * 0.45;
                self.pitch = (t * 0.45).sin() * 0.6;
                self.roll = (t * 0.3).sin() * 0.5;
            }
            Animation::Hover => {
                let (target, factor) = match self.target {
                    Some(target) => (target, 1.0 - self.params.inertia),
                    None => ([0.0, 0.0], RELEASE_SMOOTHING),
                };
                self.yaw += (target[0] - self.yaw) * factor;
                self.pitch += (target[1] - self.pitch) * factor;
                self.roll += (0.0 - self.roll) * RELEASE_SMOOTHING;
            }
            Animation::Rotate => {
                self.yaw = 0.0;
                self.pitch = 0.0;
                self.roll = 0.0;
            }
        }
    }

    fn pointer(&mut self, event: PointerEvent, viewport: Viewport) {
        if self.params.animation() != Animation::Hover {
            self.target = None;
            return;
        }
        self.target = event.position().map(|point| {
            let [x, y] = viewport.centered(point);
            let strength = HOVER_RANGE * self.params.hover_strength;
            [-x * strength, y * strength]
        });
    }

    fn uniforms(&self, frame: &FrameContext) -> Vec<u8> {
        bytemuck::bytes_of(&self.pack(frame)).to_vec()
    }

    fn controls(&self) -> Vec<Control> {
        let p = &self.params;
        vec![
            Control::picker("animation", "Animation Type", ANIMATIONS, &p.animation),
            Control::slider("height", "Height", 1.0, 6.0, p.height),
            Control::slider("base_width", "Base Width", 2.0, 10.0, p.base_width),
            Control::slider("scale", "Scale", 1.0, 8.0, p.scale),
            Control::slider("glow", "Glow Intensity", 0.0, 3.0, p.glow),
            Control::slider("bloom", "Bloom", 0.0, 3.0, p.bloom),
            Control::slider("color_frequency", "Color Frequency", 0.1, 5.0, p.color_frequency),
            Control::slider("hue_shift", "Hue Shift", -3.14, 3.14, p.hue_shift),
            Control::slider("noise", "Noise", 0.0, 1.0, p.noise).with_decimals(2),
            Control::slider("time_scale", "Animation Speed", 0.0, 2.0, p.time_scale),
            Control::slider("hover_strength", "Hover Strength", 0.0, 5.0, p.hover_strength),
            Control::slider("inertia", "Inertia", 0.0, 1.0, p.inertia).with_decimals(2),
            Control::toggle("transparent", "Transparent Background", p.transparent),
        ]
    }

    fn assign(&mut self, id: &str, value: ControlValue) {
        let p = &mut self.params;
        match (id, value) {
            ("animation", ControlValue::Choice(name)) => {
                p.animation = name;
                self.target = None;
            }
            ("height", ControlValue::Float(v)) => p.height = v,
            ("base_width", ControlValue::Float(v)) => p.base_width = v,
            ("scale", ControlValue::Float(v)) => p.scale = v,
            ("glow", ControlValue::Float(v)) => p.glow = v,
            ("bloom", ControlValue::Float(v)) => p.bloom = v,
            ("color_frequency", ControlValue::Float(v)) => p.color_frequency = v,
            ("hue_shift", ControlValue::Float(v)) => p.hue_shift = v,
            ("noise", ControlValue::Float(v)) => p.noise = v,
            ("time_scale", ControlValue::Float(v)) => p.time_scale = v,
            ("hover_strength", ControlValue::Float(v)) => p.hover_strength = v,
            ("inertia", ControlValue::Float(v)) => p.inertia = v,
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
        FrameContext::new(0.0, 0, Viewport::new(400.0, 200.0))
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn construction_clamps_parameters() {
        let prism = Prism::new(PrismParams {
            height: -1.0,
            scale: 0.0,
            glow: -2.0,
            inertia: 4.0,
            ..PrismParams::default()
        });
        assert_eq!(prism.params.height, 0.001);
        assert_eq!(prism.params.scale, 0.001);
        assert_eq!(prism.params.glow, 0.0);
        assert_eq!(prism.params.inertia, 1.0);
    }

    #[test]
    fn derived_values_follow_geometry() {
        let prism = Prism::default();
        let packed = prism.pack(&frame());
        assert_eq!(packed.u2[0], 2.75);
        assert_eq!(packed.u2[3], 1.5);
        assert!(approx(packed.u4[0], 0.875));
        assert!(approx(packed.u4[1], 1.0 / 2.75));
        assert_eq!(packed.u4[3], 2.75);
        assert!(approx(packed.u5[0], 1.0 / (200.0 * 0.1 * 3.6)));
        assert_eq!(packed.flags[0], 1.0);
        assert_eq!(packed.rotation[0], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(std::mem::size_of::<PrismUniforms>(), 144);
    }

    #[test]
    fn opaque_background_lowers_saturation() {
        let mut prism = Prism::default();
        let clear = prism.clear_color();
        let see_through = prism.pack(&frame());

        prism.apply("transparent", false.into()).unwrap();
        let mut expected = see_through;
        expected.u2[3] = 1.0;
        assert_eq!(prism.pack(&frame()), expected);
        assert_eq!(prism.clear_color(), [clear[0], clear[1], clear[2], 1.0]);
    }

    #[test]
    fn three_d_rotation_follows_scaled_time() {
        let mut prism = Prism::default();
        prism.apply("animation", "3DRotate".into()).unwrap();
        for _ in 0..100 {
            prism.advance(&frame());
        }
        let t = 100.0 * 0.016 * 0.5;
        let [yaw, pitch, roll] = prism.angles();
        assert!(approx(yaw, t * 0.45));
        assert!(approx(pitch, (t * 0.45).sin() * 0.6));
        assert!(approx(roll, (t * 0.3).sin() * 0.5));
        assert_eq!(prism.pack(&frame()).flags[0], 0.0);
    }

    #[test]
    fn hover_step_closes_one_minus_inertia_of_the_gap() {
        let mut prism = Prism::default();
        prism.apply("animation", "hover".into()).unwrap();
        prism.apply("inertia", 0.75_f32.into()).unwrap();
        let viewport = frame().viewport;
        prism.pointer(PointerEvent::Drag(Point::new(400.0, 200.0)), viewport);

        prism.advance(&frame());
        assert!(approx(prism.angles()[0], -0.3));
        prism.advance(&frame());
        assert!(approx(prism.angles()[0], -0.525));

        prism.pointer(PointerEvent::Up, viewport);
        prism.advance(&frame());
        assert!(approx(prism.angles()[0], -0.4725));
    }

    #[test]
    fn hover_tilts_toward_pointer_and_recovers() {
        let mut prism = Prism::default();
        prism.apply("animation", "hover".into()).unwrap();
        let viewport = frame().viewport;
        prism.pointer(PointerEvent::Drag(Point::new(400.0, 200.0)), viewport);
        for _ in 0..30 {
            prism.advance(&frame());
        }
        let [yaw, pitch, _] = prism.angles();
        assert!(approx(yaw, -1.2));
        assert!(approx(pitch, 1.2));

        prism.pointer(PointerEvent::Up, viewport);
        for _ in 0..200 {
            prism.advance(&frame());
        }
        let [yaw, pitch, _] = prism.angles();
        assert!(yaw.abs() < 1e-3 && pitch.abs() < 1e-3);
    }

    #[test]
    fn rotation_matrix_is_orthonormal() {
        let m = rotation_matrix(0.7, -0.3, 1.1);
        for (i, a) in m.iter().enumerate() {
            for (j, b) in m.iter().enumerate() {
                let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(approx(dot, expected), "columns {i},{j}: {dot}");
            }
        }
    }
}
