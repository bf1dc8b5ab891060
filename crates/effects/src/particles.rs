//! Rotating cloud of billboarded particles.
//!
//! Unlike the fullscreen effects this one owns per-instance data: a buffer of
//! [`Particle`] records generated from a seeded RNG. The buffer is rebuilt
//! whenever the particle count or palette changes and a generation counter is
//! bumped so the renderer knows to upload it again.

use bytemuck::{Pod, Zeroable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::EffectKind;
use crate::clock::StepClock;
use crate::color::{NamedColor, Rgb};
use crate::controls::{Control, ControlValue};
use crate::effect::{BlendMode, Effect, FrameContext, Geometry, InstanceData};
use crate::gesture::{PointerEvent, Viewport};

const PALETTES: &[&str] = &["Forest", "Galaxy", "Monochrome", "Ocean", "Rainbow", "Sunset"];

const FOV_DEGREES: f32 = 15.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

pub type Mat4 = [[f32; 4]; 4];

pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Colors of a named palette. Unknown names fall back to white.
pub fn palette(name: &str) -> Vec<Rgb> {
    use NamedColor::*;
    let colors: &[NamedColor] = match name.trim().to_ascii_lowercase().as_str() {
        "rainbow" => &[Red, Orange, Yellow, Green, Blue, Purple],
        "ocean" => &[Blue, Cyan, Mint, Teal],
        "sunset" => &[Red, Orange, Pink, Purple],
        "galaxy" => &[Purple, Pink, Indigo, Cyan],
        "forest" => &[Green, Mint, Brown],
        _ => &[White],
    };
    colors.iter().map(|color| color.rgb()).collect()
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Particle {
    /// xyz inside the unit sphere, w unused.
    pub position: [f32; 4],
    pub random: [f32; 4],
    /// rgb, w unused.
    pub color: [f32; 4],
}

/// Builds `count` particles uniformly distributed inside the unit sphere with
/// colors drawn from `colors` (white when empty).
pub fn generate(rng: &mut impl Rng, count: usize, colors: &[Rgb]) -> Vec<Particle> {
    let fallback = [Rgb::WHITE];
    let colors = if colors.is_empty() { &fallback[..] } else { colors };
    (0..count)
        .map(|_| {
            let (x, y, z) = loop {
                let x = rng.gen_range(-1.0f32..=1.0);
                let y = rng.gen_range(-1.0f32..=1.0);
                let z = rng.gen_range(-1.0f32..=1.0);
                let len = x * x + y * y + z * z;
                if len > 0.0 && len <= 1.0 {
                    break (x, y, z);
                }
            };
            let r = rng.gen::<f32>().cbrt();
            let color = colors[rng.gen_range(0..colors.len())];
            Particle {
                position: [x * r, y * r, z * r, 0.0],
                random: [rng.gen(), rng.gen(), rng.gen(), rng.gen()],
                color: color.extend(0.0),
            }
        })
        .collect()
}

/// Right-handed perspective projection with a `[0, 1]` depth range.
pub fn perspective(fov_radians: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let y = 1.0 / (fov_radians * 0.5).tan();
    let x = y / aspect;
    let z = far / (near - far);
    [
        [x, 0.0, 0.0, 0.0],
        [0.0, y, 0.0, 0.0],
        [0.0, 0.0, z, -1.0],
        [0.0, 0.0, near * z, 0.0],
    ]
}

/// View matrix for a camera on the +z axis looking at the origin with +y up.
pub fn look_at_origin(distance: f32) -> Mat4 {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, -distance, 1.0],
    ]
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ParticlesUniforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    /// time, spread, base size, size randomness
    pub params: [f32; 4],
    /// alpha particles, hover factor, aspect, drawable height
    pub style: [f32; 4],
    pub mouse: [f32; 4],
    pub rotation: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticlesParams {
    pub palette: String,
    pub particle_count: f32,
    pub spread: f32,
    pub speed: f32,
    pub base_size: f32,
    pub size_randomness: f32,
    pub camera_distance: f32,
    pub hover_factor: f32,
    pub alpha_particles: bool,
    pub move_on_hover: bool,
    pub disable_rotation: bool,
}

impl Default for ParticlesParams {
    fn default() -> Self {
        Self {
            palette: "Rainbow".to_string(),
            particle_count: 200.0,
            spread: 10.0,
            speed: 0.1,
            base_size: 100.0,
            size_randomness: 1.0,
            camera_distance: 20.0,
            hover_factor: 1.0,
            alpha_particles: false,
            move_on_hover: false,
            disable_rotation: false,
        }
    }
}

impl ParticlesParams {
    pub fn count(&self) -> usize {
        if self.particle_count.is_finite() {
            self.particle_count.max(0.0) as usize
        } else {
            0
        }
    }
}

#[derive(Debug, Clone)]
pub struct Particles {
    pub params: ParticlesParams,
    clock: StepClock,
    rotation: [f32; 3],
    mouse: [f32; 2],
    rng: StdRng,
    particles: Vec<Particle>,
    generation: u64,
}

impl Default for Particles {
    fn default() -> Self {
        Self::new(ParticlesParams::default())
    }
}

impl Particles {
    pub fn new(params: ParticlesParams) -> Self {
        Self::with_rng(params, StdRng::from_entropy())
    }

    /// Deterministic particle layout for a given seed.
    pub fn with_seed(params: ParticlesParams, seed: u64) -> Self {
        Self::with_rng(params, StdRng::seed_from_u64(seed))
    }

    fn with_rng(params: ParticlesParams, rng: StdRng) -> Self {
        let mut particles = Self {
            params,
            clock: StepClock::new(),
            rotation: [0.0; 3],
            mouse: [0.0; 2],
            rng,
            particles: Vec::new(),
            generation: 0,
        };
        particles.regenerate();
        particles
    }

    fn regenerate(&mut self) {
        let colors = palette(&self.params.palette);
        self.particles = generate(&mut self.rng, self.params.count(), &colors);
        self.generation += 1;
        tracing::debug!(
            count = self.particles.len(),
            generation = self.generation,
            "regenerated particles"
        );
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn rotation(&self) -> [f32; 3] {
        self.rotation
    }

    pub fn pack(&self, frame: &FrameContext) -> ParticlesUniforms {
        let p = &self.params;
        let aspect = frame.viewport.aspect();
        let mouse = if p.move_on_hover {
            [-self.mouse[0], -self.mouse[1], 0.0, 0.0]
        } else {
            [0.0; 4]
        };
        let alpha = if p.alpha_particles { 1.0 } else { 0.0 };
        ParticlesUniforms {
            model: IDENTITY,
            view: look_at_origin(p.camera_distance),
            projection: perspective(FOV_DEGREES.to_radians(), aspect, NEAR, FAR),
            params: [self.clock.time(), p.spread, p.base_size, p.size_randomness],
            style: [alpha, p.hover_factor, aspect, frame.viewport.height],
            mouse,
            rotation: [self.rotation[0], self.rotation[1], self.rotation[2], 0.0],
        }
    }
}

impl Effect for Particles {
    fn kind(&self) -> EffectKind {
        EffectKind::Particles
    }

    fn geometry(&self) -> Geometry {
        Geometry::InstancedQuads {
            instances: self.particles.len() as u32,
        }
    }

    fn blend(&self) -> BlendMode {
        BlendMode::Alpha
    }

    fn transparent_background(&self) -> bool {
        true
    }

    fn advance(&mut self, _frame: &FrameContext) {
        let speed = self.params.speed;
        let time = self.clock.tick(speed);
        if !self.params.disable_rotation {
            self.rotation[0] = (time * 0.2).sin() * 0.1;
            self.rotation[1] = (time * 0.5).cos() * 0.15;
            self.rotation[2] += 0.01 * speed;
        }
    }

    fn pointer(&mut self, event: PointerEvent, viewport: Viewport) {
        if !self.params.move_on_hover {
            return;
        }
        if let Some(point) = event.position() {
            self.mouse = viewport.clip(point);
        }
    }

    fn uniforms(&self, frame: &FrameContext) -> Vec<u8> {
        bytemuck::bytes_of(&self.pack(frame)).to_vec()
    }

    fn instances(&self) -> Option<InstanceData<'_>> {
        Some(InstanceData {
            generation: self.generation,
            stride: std::mem::size_of::<Particle>() as u64,
            bytes: bytemuck::cast_slice(&self.particles),
        })
    }

    fn controls(&self) -> Vec<Control> {
        let p = &self.params;
        vec![
            Control::picker("palette", "Color Preset", PALETTES, &p.palette),
            Control::slider("particle_count", "Particle Count", 50.0, 500.0, p.particle_count)
                .with_step(10.0)
                .with_decimals(0),
            Control::slider("spread", "Spread", 5.0, 20.0, p.spread),
            Control::slider("speed", "Animation Speed", 0.01, 0.5, p.speed).with_decimals(2),
            Control::slider("base_size", "Particle Size", 50.0, 200.0, p.base_size)
                .with_decimals(0),
            Control::slider("size_randomness", "Size Variation", 0.0, 2.0, p.size_randomness),
            Control::slider("camera_distance", "Camera Distance", 10.0, 40.0, p.camera_distance)
                .with_decimals(0),
            Control::slider("hover_factor", "Hover Strength", 0.5, 3.0, p.hover_factor),
            Control::toggle("alpha_particles", "Alpha Blending", p.alpha_particles),
            Control::toggle("move_on_hover", "Mouse Interaction", p.move_on_hover),
            Control::toggle("disable_rotation", "Disable Rotation", p.disable_rotation),
        ]
    }

    fn assign(&mut self, id: &str, value: ControlValue) {
        let p = &mut self.params;
        match (id, value) {
            ("palette", ControlValue::Choice(name)) => {
                if !p.palette.eq_ignore_ascii_case(&name) {
                    p.palette = name;
                    self.regenerate();
                }
            }
            ("particle_count", ControlValue::Float(v)) => {
                let changed = p.particle_count != v;
                p.particle_count = v;
                if changed {
                    self.regenerate();
                }
            }
            ("spread", ControlValue::Float(v)) => p.spread = v,
            ("speed", ControlValue::Float(v)) => p.speed = v,
            ("base_size", ControlValue::Float(v)) => p.base_size = v,
            ("size_randomness", ControlValue::Float(v)) => p.size_randomness = v,
            ("camera_distance", ControlValue::Float(v)) => p.camera_distance = v,
            ("hover_factor", ControlValue::Float(v)) => p.hover_factor = v,
            ("alpha_particles", ControlValue::Bool(v)) => p.alpha_particles = v,
            ("move_on_hover", ControlValue::Bool(v)) => p.move_on_hover = v,
            ("disable_rotation", ControlValue::Bool(v)) => p.disable_rotation = v,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Point;

    fn frame() -> FrameContext {
        FrameContext::new(0.0, 0, Viewport::new(800.0, 400.0))
    }

    #[test]
    fn positions_stay_inside_unit_sphere() {
        let mut rng = StdRng::seed_from_u64(7);
        let particles = generate(&mut rng, 500, &palette("ocean"));
        assert_eq!(particles.len(), 500);
        for particle in &particles {
            let [x, y, z, _] = particle.position;
            assert!(x * x + y * y + z * z <= 1.0 + 1e-5);
            assert!(particle.random.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn colors_come_from_palette_or_white() {
        let mut rng = StdRng::seed_from_u64(1);
        let forest = palette("forest");
        for particle in generate(&mut rng, 50, &forest) {
            let rgb = Rgb::new(particle.color[0], particle.color[1], particle.color[2]);
            assert!(forest.contains(&rgb));
        }
        for particle in generate(&mut rng, 10, &[]) {
            assert_eq!(&particle.color[..3], &[1.0, 1.0, 1.0]);
        }
        assert_eq!(palette("unknown"), vec![Rgb::WHITE]);
    }

    #[test]
    fn count_and_palette_changes_bump_generation() {
        let mut particles = Particles::with_seed(ParticlesParams::default(), 3);
        let first = particles.instances().unwrap().generation;
        assert_eq!(particles.particles().len(), 200);

        particles.apply("spread", 12.0.into()).unwrap();
        assert_eq!(particles.instances().unwrap().generation, first);

        particles.apply("particle_count", 305.0.into()).unwrap();
        let data = particles.instances().unwrap();
        assert_eq!(data.generation, first + 1);
        assert_eq!(data.stride, 48);
        assert_eq!(data.bytes.len(), 310 * 48);
        assert_eq!(particles.geometry(), Geometry::InstancedQuads { instances: 310 });

        particles.apply("palette", "sunset".into()).unwrap();
        assert_eq!(particles.instances().unwrap().generation, first + 2);
    }

    #[test]
    fn rotation_follows_speed_scaled_time() {
        let mut particles = Particles::with_seed(ParticlesParams::default(), 0);
        for _ in 0..10 {
            particles.advance(&frame());
        }
        let t = 10.0 * 0.016 * 0.1;
        let [rx, ry, rz] = particles.rotation();
        assert!((rx - (t * 0.2f32).sin() * 0.1).abs() < 1e-6);
        assert!((ry - (t * 0.5f32).cos() * 0.15).abs() < 1e-6);
        assert!((rz - 0.01).abs() < 1e-6);

        particles.apply("disable_rotation", true.into()).unwrap();
        particles.advance(&frame());
        assert_eq!(particles.rotation(), [rx, ry, rz]);
    }

    #[test]
    fn hover_mouse_is_negated_clip_space() {
        let mut particles = Particles::with_seed(ParticlesParams::default(), 0);
        let viewport = frame().viewport;
        particles.pointer(PointerEvent::Drag(Point::new(800.0, 0.0)), viewport);
        assert_eq!(particles.pack(&frame()).mouse, [0.0; 4]);

        particles.apply("move_on_hover", true.into()).unwrap();
        particles.pointer(PointerEvent::Drag(Point::new(800.0, 0.0)), viewport);
        assert_eq!(particles.pack(&frame()).mouse, [-1.0, -1.0, 0.0, 0.0]);
    }

    #[test]
    fn camera_matrices() {
        let packed = Particles::with_seed(ParticlesParams::default(), 0).pack(&frame());
        assert_eq!(packed.view[3], [0.0, 0.0, -20.0, 1.0]);
        assert_eq!(packed.style[2], 2.0);
        let y = 1.0 / (7.5f32.to_radians()).tan();
        assert!((packed.projection[1][1] - y).abs() < 1e-4);
        assert!((packed.projection[0][0] - y / 2.0).abs() < 1e-4);
        assert_eq!(std::mem::size_of::<ParticlesUniforms>(), 256);
    }
}
