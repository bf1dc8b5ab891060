//! GPU orchestration for the gallery window.
//!
//! - `context` owns wgpu instance/device/surface wiring and knows how to
//!   reconfigure the swapchain when the window resizes.
//! - `pipeline` compiles an effect's WGSL into a render pipeline with a single
//!   uniform bind group and the vertex layout its geometry needs.
//! - `state` glues everything together: it writes the effect's payload into
//!   the uniform buffer, uploads instance data when it changes, and issues the
//!   one draw call per frame.

mod context;
mod pipeline;
mod state;

pub(crate) use state::GpuState;
