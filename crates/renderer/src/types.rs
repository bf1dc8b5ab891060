use std::collections::BTreeMap;

use effects::EffectKind;
use tour::Tour;

use crate::runtime::RenderPolicy;

/// Declares how the compositor should treat the swapchain alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceAlpha {
    /// Frames fully cover the window.
    Opaque,
    /// Effects with a transparent background let the desktop show through.
    #[default]
    Transparent,
}

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Control values applied whenever an effect is (re)built, keyed by effect.
pub type EffectOverrides = BTreeMap<EffectKind, Vec<(String, String)>>;

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Effect shown first.
    pub effect: EffectKind,
    /// `(control, value)` pairs applied through the control parser every time
    /// the effect is created. Invalid entries are logged and skipped.
    pub overrides: EffectOverrides,
    pub antialiasing: Antialiasing,
    pub surface_alpha: SurfaceAlpha,
    pub policy: RenderPolicy,
    /// Optional slideshow that switches effects on its own.
    pub tour: Option<Tour>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            effect: EffectKind::Aurora,
            overrides: EffectOverrides::new(),
            antialiasing: Antialiasing::default(),
            surface_alpha: SurfaceAlpha::default(),
            policy: RenderPolicy::default(),
            tour: None,
        }
    }
}
