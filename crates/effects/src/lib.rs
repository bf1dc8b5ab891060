//! Effect catalogue for the shader gallery.
//!
//! Each effect is a small parameter holder implementing [`Effect`]: it owns
//! its time accumulator and interaction state, packs a `#[repr(C)]` uniform
//! payload once per frame, and exposes its tunables as [`Control`]s so the
//! dock, the command line and preset files all go through one validation
//! path.
//!
//! ```text
//!   pointer / keys ──▶ Effect::pointer / Dock ──▶ Effect::apply
//!                                                   │
//!   render loop ──▶ Effect::advance ──▶ Effect::uniforms ──▶ GPU uniform buffer
//! ```
//!
//! The crate has no GPU dependency; WGSL sources are embedded via
//! [`shaders::spec`] and compiled by the renderer.

pub mod aurora;
pub mod beams;
pub mod catalog;
pub mod clock;
pub mod color;
pub mod controls;
pub mod dither;
pub mod dock;
pub mod effect;
pub mod error;
pub mod galaxy;
pub mod gesture;
pub mod orb;
pub mod particles;
pub mod plasma;
pub mod prism;
pub mod shaders;
pub mod silk;

pub use catalog::{search, Card, EffectKind};
pub use color::{NamedColor, Rgb};
pub use controls::{Control, ControlKind, ControlValue};
pub use dock::{Dock, DockChange};
pub use effect::{
    create, unit_quads, BlendMode, BoxedEffect, Effect, FrameContext, Geometry, InstanceData,
};
pub use error::EffectError;
pub use gesture::{Point, PointerEvent, Viewport};
pub use shaders::ShaderSpec;
