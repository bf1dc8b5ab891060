use crate::catalog::EffectKind;

/// WGSL program for one effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSpec {
    pub label: &'static str,
    pub source: &'static str,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
}

const VERTEX_ENTRY: &str = "vs_main";
const FRAGMENT_ENTRY: &str = "fs_main";

pub fn spec(kind: EffectKind) -> ShaderSpec {
    let (label, source) = match kind {
        EffectKind::Aurora => ("aurora", include_str!("../shaders/aurora.wgsl")),
        EffectKind::Orb => ("orb", include_str!("../shaders/orb.wgsl")),
        EffectKind::Silk => ("silk", include_str!("../shaders/silk.wgsl")),
        EffectKind::Dither => ("dither", include_str!("../shaders/dither.wgsl")),
        EffectKind::Beams => ("beams", include_str!("../shaders/beams.wgsl")),
        EffectKind::Galaxy => ("galaxy", include_str!("../shaders/galaxy.wgsl")),
        EffectKind::Prism => ("prism", include_str!("../shaders/prism.wgsl")),
        EffectKind::Plasma => ("plasma", include_str!("../shaders/plasma.wgsl")),
        EffectKind::Particles => ("particles", include_str!("../shaders/particles.wgsl")),
    };
    ShaderSpec {
        label,
        source,
        vertex_entry: VERTEX_ENTRY,
        fragment_entry: FRAGMENT_ENTRY,
    }
}
