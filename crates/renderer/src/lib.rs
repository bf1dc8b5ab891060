//! Renderer crate for the ShaderBits gallery.
//!
//! Glues a `winit` window, the `wgpu` pipeline for the active effect and the
//! keyboard dock together. The overall flow is:
//!
//! ```text
//!   CLI / shaderbits
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!                          │                                   │
//!                          │                    Effect::advance ─▶ Effect::uniforms ─▶ GPU UBO
//!                          └─▶ Dock / Tour ─▶ Effect::apply, effect switches
//! ```
//!
//! `WindowState` owns the GPU resources and the boxed [`effects::Effect`];
//! `Renderer` is the thin entry point the binary calls.

pub mod compile;
mod gpu;
pub mod runtime;
pub mod types;
mod window;

use anyhow::Result;

pub use compile::{validate, ShaderError};
pub use runtime::{
    FixedTimeSource, FrameScheduler, RenderPolicy, SystemTimeSource, TimeSample, TimeSource,
    DEFAULT_FPS,
};
pub use types::{Antialiasing, EffectOverrides, RendererConfig, SurfaceAlpha};

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the gallery window and blocks until it is closed.
    pub fn run(self) -> Result<()> {
        tracing::debug!(
            effect = %self.config.effect,
            size = ?self.config.surface_size,
            policy = ?self.config.policy,
            tour = self.config.tour.is_some(),
            "starting renderer"
        );
        window::run(self.config)
    }
}
