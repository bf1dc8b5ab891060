use std::fs;
use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use effects::EffectKind;
use presets::{AntialiasSetting, GalleryConfig, TourConfig};
use renderer::{
    Antialiasing, EffectOverrides, RenderPolicy, Renderer, RendererConfig, SurfaceAlpha,
};
use tour::Tour;
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::paths::AppPaths;

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let gallery = load_config(&args, &paths)?;
    let config = build_renderer_config(&args, gallery.as_ref(), tour_seed())?;
    Renderer::new(config).run()
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads `--config` when given, otherwise `<config_dir>/gallery.toml` if it
/// exists. A missing default file is not an error.
pub fn load_config(args: &RunArgs, paths: &AppPaths) -> Result<Option<GalleryConfig>> {
    match &args.config {
        Some(path) => read_config(path).map(Some),
        None => {
            let path = paths.config_file();
            if path.is_file() {
                read_config(&path).map(Some)
            } else {
                tracing::debug!(path = %path.display(), "no gallery config found");
                Ok(None)
            }
        }
    }
}

fn read_config(path: &Path) -> Result<GalleryConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = GalleryConfig::from_toml_str(&text)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded gallery config");
    Ok(config)
}

/// Merges command line flags over the config file. Flags win; `--set`
/// entries are checked against the starting effect before any window opens.
pub fn build_renderer_config(
    args: &RunArgs,
    gallery: Option<&GalleryConfig>,
    seed: u64,
) -> Result<RendererConfig> {
    let effect = args
        .effect
        .or_else(|| gallery.and_then(GalleryConfig::default_effect))
        .unwrap_or(EffectKind::Aurora);

    let mut overrides = EffectOverrides::new();
    if let Some(gallery) = gallery {
        for kind in EffectKind::ALL {
            let entries = gallery.overrides_for(kind);
            if !entries.is_empty() {
                overrides.insert(kind, entries);
            }
        }
    }
    if !args.set.is_empty() {
        let mut scratch = effects::create(effect);
        for (key, value) in &args.set {
            scratch
                .apply_str(key, value)
                .with_context(|| format!("invalid --set {key}={value} for {effect}"))?;
        }
        overrides
            .entry(effect)
            .or_default()
            .extend(args.set.iter().cloned());
    }

    let defaults = gallery.map(|gallery| &gallery.defaults);
    let surface_size = args
        .size
        .or_else(|| gallery.and_then(GalleryConfig::size))
        .unwrap_or(RendererConfig::default().surface_size);
    let antialiasing = args
        .antialias
        .or_else(|| defaults.and_then(|defaults| defaults.antialias))
        .map(antialiasing_for)
        .unwrap_or_default();

    let policy = match args.still_time {
        Some(time) => RenderPolicy::Still { time },
        None => RenderPolicy::Animate {
            target_fps: args.fps.or_else(|| defaults.and_then(|defaults| defaults.fps)),
        },
    };

    let tour = if args.tour {
        let tour_config = gallery
            .and_then(|gallery| gallery.tour.clone())
            .unwrap_or_else(TourConfig::default);
        let tour = Tour::from_config(&tour_config, seed, Instant::now())
            .context("failed to build effect tour")?;
        tracing::info!(
            effects = tour.len(),
            mode = ?tour_config.mode,
            "tour enabled"
        );
        Some(tour)
    } else {
        None
    };

    let surface_alpha = if args.opaque {
        SurfaceAlpha::Opaque
    } else {
        SurfaceAlpha::Transparent
    };

    Ok(RendererConfig {
        surface_size,
        effect,
        overrides,
        antialiasing,
        surface_alpha,
        policy,
        tour,
    })
}

fn antialiasing_for(setting: AntialiasSetting) -> Antialiasing {
    match setting {
        AntialiasSetting::Auto => Antialiasing::Auto,
        AntialiasSetting::Off => Antialiasing::Off,
        AntialiasSetting::Samples2 => Antialiasing::Samples(2),
        AntialiasSetting::Samples4 => Antialiasing::Samples(4),
        AntialiasSetting::Samples8 => Antialiasing::Samples(8),
        AntialiasSetting::Samples16 => Antialiasing::Samples(16),
    }
}

fn tour_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GALLERY: &str = r#"
version = 1

[defaults]
effect = "galaxy"
fps = 30
antialias = "off"
size = "640x480"

[effects.galaxy]
preset = "Cosmic"

[tour]
effects = ["plasma", "orb"]
item_duration = "10s"
"#;

    fn gallery() -> GalleryConfig {
        GalleryConfig::from_toml_str(GALLERY).unwrap()
    }

    #[test]
    fn config_defaults_fill_missing_flags() {
        let config = build_renderer_config(&RunArgs::default(), Some(&gallery()), 1).unwrap();
        assert_eq!(config.effect, EffectKind::Galaxy);
        assert_eq!(config.surface_size, (640, 480));
        assert_eq!(config.antialiasing, Antialiasing::Off);
        assert_eq!(
            config.policy,
            RenderPolicy::Animate {
                target_fps: Some(30.0)
            }
        );
        assert_eq!(
            config.overrides.get(&EffectKind::Galaxy),
            Some(&vec![("preset".to_string(), "Cosmic".to_string())])
        );
        assert!(config.tour.is_none());
    }

    #[test]
    fn flags_override_config() {
        let args = RunArgs {
            effect: Some(EffectKind::Galaxy),
            set: vec![("preset".into(), "Nebula".into())],
            size: Some((320, 200)),
            still_time: Some(4.0),
            antialias: Some(AntialiasSetting::Samples8),
            opaque: true,
            ..RunArgs::default()
        };
        let config = build_renderer_config(&args, Some(&gallery()), 1).unwrap();
        assert_eq!(config.surface_size, (320, 200));
        assert_eq!(config.antialiasing, Antialiasing::Samples(8));
        assert_eq!(config.policy, RenderPolicy::Still { time: 4.0 });
        assert_eq!(config.surface_alpha, SurfaceAlpha::Opaque);
        let galaxy = &config.overrides[&EffectKind::Galaxy];
        assert_eq!(galaxy.last().unwrap().1, "Nebula");
    }

    #[test]
    fn invalid_set_names_effect_and_key() {
        let args = RunArgs {
            effect: Some(EffectKind::Beams),
            set: vec![("glow".into(), "1".into())],
            ..RunArgs::default()
        };
        let err = build_renderer_config(&args, None, 1).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("beams"), "{message}");
        assert!(message.contains("glow"), "{message}");
    }

    #[test]
    fn tour_uses_config_table_or_whole_catalog() {
        let args = RunArgs {
            tour: true,
            ..RunArgs::default()
        };
        let configured = build_renderer_config(&args, Some(&gallery()), 7).unwrap();
        assert_eq!(configured.tour.as_ref().map(Tour::len), Some(2));

        let fallback = build_renderer_config(&args, None, 7).unwrap();
        assert_eq!(
            fallback.tour.as_ref().map(Tour::len),
            Some(EffectKind::ALL.len())
        );
        assert_eq!(fallback.effect, EffectKind::Aurora);
    }
}
