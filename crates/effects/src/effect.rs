use crate::catalog::EffectKind;
use crate::controls::{self, Control, ControlValue};
use crate::error::EffectError;
use crate::gesture::{PointerEvent, Viewport};
use crate::shaders::{self, ShaderSpec};

/// Per-frame inputs handed to an effect by the render loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Seconds since the surface started presenting this effect.
    pub seconds: f32,
    pub frame_index: u64,
    pub viewport: Viewport,
}

impl FrameContext {
    pub fn new(seconds: f32, frame_index: u64, viewport: Viewport) -> Self {
        Self {
            seconds,
            frame_index,
            viewport,
        }
    }
}

/// What the renderer draws each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// Three vertices generated in the vertex shader, no buffers.
    FullscreenTriangle,
    /// `capacity` unit quads allocated once; the first `count` are drawn with
    /// six indices each.
    IndexedQuads { count: u32, capacity: u32 },
    /// Six vertices per instance, one instance per record of
    /// [`Effect::instances`].
    InstancedQuads { instances: u32 },
}

/// Color blending applied by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Output overwrites the target.
    Replace,
    /// `src * a + dst * (1 - a)`.
    Alpha,
    /// `src + dst * (1 - a)` for shaders that premultiply.
    Premultiplied,
}

/// Per-instance vertex data. `generation` changes whenever `bytes` does so
/// the renderer only uploads after a change.
#[derive(Debug, Clone, Copy)]
pub struct InstanceData<'a> {
    pub generation: u64,
    pub stride: u64,
    pub bytes: &'a [u8],
}

/// A shader effect: a parameter holder that packs one uniform payload per
/// frame and describes how it should be drawn.
pub trait Effect: Send {
    fn kind(&self) -> EffectKind;

    fn shader(&self) -> ShaderSpec {
        shaders::spec(self.kind())
    }

    fn geometry(&self) -> Geometry {
        Geometry::FullscreenTriangle
    }

    fn blend(&self) -> BlendMode;

    /// Whether the effect draws over a transparent background.
    fn transparent_background(&self) -> bool;

    /// Clear color for the render pass. Only the alpha channel depends on the
    /// background setting.
    fn clear_color(&self) -> [f64; 4] {
        let alpha = if self.transparent_background() { 0.0 } else { 1.0 };
        [0.0, 0.0, 0.0, alpha]
    }

    /// Advances clocks and interaction animators by one frame.
    fn advance(&mut self, frame: &FrameContext);

    fn pointer(&mut self, _event: PointerEvent, _viewport: Viewport) {}

    /// Uniform payload bytes for the current frame.
    fn uniforms(&self, frame: &FrameContext) -> Vec<u8>;

    fn instances(&self) -> Option<InstanceData<'_>> {
        None
    }

    /// Dock controls carrying the current parameter values.
    fn controls(&self) -> Vec<Control>;

    /// Stores a value that has already passed [`Control::coerce`].
    fn assign(&mut self, id: &str, value: ControlValue);

    /// Validates and applies a control change.
    fn apply(&mut self, id: &str, value: ControlValue) -> Result<ControlValue, EffectError> {
        let controls = self.controls();
        let resolved = controls::resolve(self.kind(), &controls, id, value)?;
        let canonical = controls
            .iter()
            .find(|control| control.id.eq_ignore_ascii_case(id.trim()))
            .map(|control| control.id)
            .unwrap_or(id);
        self.assign(canonical, resolved.clone());
        tracing::debug!(effect = %self.kind(), control = canonical, value = %resolved, "applied control");
        Ok(resolved)
    }

    /// Parses and applies a textual control change (`--set`, preset files).
    fn apply_str(&mut self, id: &str, raw: &str) -> Result<ControlValue, EffectError> {
        let controls = self.controls();
        let value = controls::resolve_str(self.kind(), &controls, id, raw)?;
        self.apply(id, value)
    }
}

pub type BoxedEffect = Box<dyn Effect>;

/// Vertex and index data for `capacity` unit quads.
///
/// Each quad contributes corners `(0,0) (1,0) (0,1) (1,1)` as `vec4`s (z = 0,
/// w = 1) and the index pattern `base, base+1, base+2, base+2, base+1, base+3`.
pub fn unit_quads(capacity: u32) -> (Vec<[f32; 4]>, Vec<u32>) {
    const CORNERS: [[f32; 4]; 4] = [
        [0.0, 0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0, 1.0],
        [0.0, 1.0, 0.0, 1.0],
        [1.0, 1.0, 0.0, 1.0],
    ];
    let mut vertices = Vec::with_capacity(capacity as usize * 4);
    let mut indices = Vec::with_capacity(capacity as usize * 6);
    for quad in 0..capacity {
        let base = quad * 4;
        vertices.extend_from_slice(&CORNERS);
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
    }
    (vertices, indices)
}

/// Builds an effect with its default parameters.
pub fn create(kind: EffectKind) -> BoxedEffect {
    match kind {
        EffectKind::Aurora => Box::new(crate::aurora::Aurora::default()),
        EffectKind::Orb => Box::new(crate::orb::Orb::default()),
        EffectKind::Silk => Box::new(crate::silk::Silk::default()),
        EffectKind::Dither => Box::new(crate::dither::Dither::default()),
        EffectKind::Beams => Box::new(crate::beams::Beams::default()),
        EffectKind::Galaxy => Box::new(crate::galaxy::Galaxy::default()),
        EffectKind::Prism => Box::new(crate::prism::Prism::default()),
        EffectKind::Plasma => Box::new(crate::plasma::Plasma::default()),
        EffectKind::Particles => Box::new(crate::particles::Particles::default()),
    }
}
