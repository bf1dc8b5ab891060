use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use effects::{Effect, EffectError, EffectKind};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// File name looked up inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "gallery.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("invalid value for [effects.{effect}] {key}: {source}")]
    Apply {
        effect: EffectKind,
        key: String,
        #[source]
        source: EffectError,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TourMode {
    #[default]
    Continuous,
    Shuffle,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GalleryConfig {
    pub version: u32,
    #[serde(default)]
    pub defaults: Defaults,
    /// Control overrides keyed by effect name, e.g. `[effects.galaxy]`.
    #[serde(default)]
    pub effects: BTreeMap<String, toml::Table>,
    #[serde(default)]
    pub tour: Option<TourConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Defaults {
    pub effect: Option<String>,
    pub fps: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_antialias_opt")]
    pub antialias: Option<AntialiasSetting>,
    /// Initial window size as `WIDTHxHEIGHT`.
    pub size: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TourConfig {
    #[serde(default)]
    pub mode: TourMode,
    #[serde(
        default = "default_item_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub item_duration: Duration,
    /// Effects to visit; empty means the whole catalog in gallery order.
    #[serde(default)]
    pub effects: Vec<String>,
    #[serde(default)]
    pub overrides: Vec<TourOverride>,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            mode: TourMode::Continuous,
            item_duration: default_item_duration(),
            effects: Vec::new(),
            overrides: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TourOverride {
    pub effect: String,
    #[serde(default, deserialize_with = "deserialize_duration_opt")]
    pub duration: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }
}

fn default_item_duration() -> Duration {
    Duration::from_secs(30)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_duration_opt(deserializer).map(|d| d.unwrap_or(default_item_duration()))
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Duration::try_from_secs_f64(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            Some(parse_antialias(&value.to_string()).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

/// Parses `auto`, `off` or a sample count (`2`, `4`, `8`, `16`).
pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" => Ok(AntialiasSetting::Samples2),
        "4" => Ok(AntialiasSetting::Samples4),
        "8" => Ok(AntialiasSetting::Samples8),
        "16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!("invalid antialias setting '{other}'")),
    }
}

/// Parses a `WIDTHxHEIGHT` window size.
pub fn parse_size(raw: &str) -> Result<(u32, u32), String> {
    let trimmed = raw.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{trimmed}'; expected WIDTHxHEIGHT"))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| format!("invalid size '{trimmed}'; dimensions must be positive integers"))
    };
    Ok((parse(width)?, parse(height)?))
}

fn parse_effect(name: &str, context: &str) -> Result<EffectKind, ConfigError> {
    name.parse::<EffectKind>()
        .map_err(|err| ConfigError::Invalid(format!("{context}: {err}")))
}

/// Renders a TOML scalar the way the control parser expects it.
fn value_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(text) => Some(text.clone()),
        toml::Value::Integer(number) => Some(number.to_string()),
        toml::Value::Float(number) => Some(number.to_string()),
        toml::Value::Boolean(flag) => Some(flag.to_string()),
        _ => None,
    }
}

impl GalleryConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: GalleryConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn default_effect(&self) -> Option<EffectKind> {
        self.defaults
            .effect
            .as_deref()
            .and_then(|name| name.parse().ok())
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.defaults
            .size
            .as_deref()
            .and_then(|raw| parse_size(raw).ok())
    }

    /// `(key, value)` overrides configured for `kind`, in key order.
    pub fn overrides_for(&self, kind: EffectKind) -> Vec<(String, String)> {
        self.effects
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(kind.name()))
            .flat_map(|(_, table)| table.iter())
            .filter_map(|(key, value)| value_text(value).map(|text| (key.clone(), text)))
            .collect()
    }

    /// Applies the `[effects.<name>]` table for the effect's kind through the
    /// control validation path.
    pub fn apply_to(&self, effect: &mut dyn Effect) -> Result<usize, ConfigError> {
        let kind = effect.kind();
        let overrides = self.overrides_for(kind);
        for (key, value) in &overrides {
            effect
                .apply_str(key, value)
                .map_err(|source| ConfigError::Apply {
                    effect: kind,
                    key: key.clone(),
                    source,
                })?;
        }
        if !overrides.is_empty() {
            tracing::debug!(effect = %kind, count = overrides.len(), "applied preset overrides");
        }
        Ok(overrides.len())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if let Some(name) = &self.defaults.effect {
            parse_effect(name, "defaults.effect")?;
        }

        if let Some(fps) = self.defaults.fps {
            if !fps.is_finite() || fps < 0.0 {
                return Err(ConfigError::Invalid("defaults.fps must be >= 0".into()));
            }
        }

        if let Some(size) = &self.defaults.size {
            parse_size(size).map_err(|err| ConfigError::Invalid(format!("defaults.size: {err}")))?;
        }

        for (name, table) in &self.effects {
            let kind = parse_effect(name, &format!("[effects.{name}]"))?;
            for (key, value) in table {
                if value_text(value).is_none() {
                    return Err(ConfigError::Invalid(format!(
                        "[effects.{name}] {key} must be a string, number or boolean"
                    )));
                }
            }
            // dry run against a fresh instance so bad keys surface at load time
            let mut scratch = effects::create(kind);
            self.apply_to(scratch.as_mut())?;
        }

        if let Some(tour) = &self.tour {
            tour.validate()?;
        }

        Ok(())
    }
}

impl TourConfig {
    /// Effects in visiting order, the whole catalog when none are listed.
    pub fn effect_kinds(&self) -> Result<Vec<EffectKind>, ConfigError> {
        if self.effects.is_empty() {
            return Ok(EffectKind::ALL.to_vec());
        }
        self.effects
            .iter()
            .map(|name| parse_effect(name, "tour.effects"))
            .collect()
    }

    /// Display time for `kind`, honouring `[[tour.overrides]]`.
    pub fn duration_for(&self, kind: EffectKind) -> Duration {
        self.overrides
            .iter()
            .find(|entry| entry.effect.eq_ignore_ascii_case(kind.name()))
            .and_then(|entry| entry.duration)
            .unwrap_or(self.item_duration)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.item_duration.is_zero() {
            return Err(ConfigError::Invalid(
                "tour.item_duration must be greater than zero".into(),
            ));
        }
        self.effect_kinds()?;
        for entry in &self.overrides {
            parse_effect(&entry.effect, "tour.overrides")?;
            if entry.duration.is_some_and(|duration| duration.is_zero()) {
                return Err(ConfigError::Invalid(format!(
                    "tour override for '{}' duration must be > 0",
                    entry.effect
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use effects::galaxy::Galaxy;

    const SAMPLE: &str = r#"
version = 1

[defaults]
effect = "galaxy"
fps = 60
antialias = "auto"
size = "1280x720"

[effects.galaxy]
preset = "Cosmic"
transparent = false
star_speed = 1.25

[effects.beams]
beam_number = 8

[tour]
mode = "shuffle"
item_duration = "45s"
effects = ["aurora", "galaxy", "plasma"]

[[tour.overrides]]
effect = "galaxy"
duration = 90
"#;

    #[test]
    fn parses_sample_config() {
        let config = GalleryConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.version, 1);
        assert_eq!(config.default_effect(), Some(EffectKind::Galaxy));
        assert_eq!(config.defaults.antialias, Some(AntialiasSetting::Auto));
        assert_eq!(config.size(), Some((1280, 720)));

        let tour = config.tour.as_ref().unwrap();
        assert_eq!(tour.mode, TourMode::Shuffle);
        assert_eq!(
            tour.effect_kinds().unwrap(),
            vec![EffectKind::Aurora, EffectKind::Galaxy, EffectKind::Plasma]
        );
        assert_eq!(tour.duration_for(EffectKind::Galaxy), Duration::from_secs(90));
        assert_eq!(tour.duration_for(EffectKind::Plasma), Duration::from_secs(45));
    }

    #[test]
    fn applies_overrides_through_controls() {
        let config = GalleryConfig::from_toml_str(SAMPLE).unwrap();
        let mut galaxy = Galaxy::default();
        assert_eq!(config.apply_to(&mut galaxy).unwrap(), 3);
        assert_eq!(galaxy.params.preset, "Cosmic");
        assert!(!galaxy.params.transparent);
        assert_eq!(galaxy.params.star_speed, 1.25);
    }

    #[test]
    fn rejects_unknown_effect_table() {
        let err = GalleryConfig::from_toml_str(
            r#"
version = 1

[effects.teapot]
spin = 1
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn bad_override_names_effect_and_key() {
        let err = GalleryConfig::from_toml_str(
            r#"
version = 1

[effects.plasma]
direction = "sideways"
"#,
        )
        .unwrap_err();
        match err {
            ConfigError::Apply { effect, key, .. } => {
                assert_eq!(effect, EffectKind::Plasma);
                assert_eq!(key, "direction");
            }
            other => panic!("unexpected error {other:?}"),
        }

        let err = GalleryConfig::from_toml_str(
            r#"
version = 1

[effects.orb]
wobble = 2
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("wobble"));
    }

    #[test]
    fn rejects_bad_defaults() {
        for body in [
            "version = 2",
            "version = 1\n[defaults]\neffect = \"teapot\"",
            "version = 1\n[defaults]\nfps = -1",
            "version = 1\n[defaults]\nsize = \"wide\"",
            "version = 1\n[tour]\nitem_duration = 0",
        ] {
            let err = GalleryConfig::from_toml_str(body).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{body}: {err}");
        }
    }

    #[test]
    fn out_of_range_durations_are_parse_errors() {
        for body in [
            "version = 1\n[tour]\nitem_duration = 1e300\n",
            "version = 1\n[tour]\nitem_duration = -2.5\n",
            "version = 1\n[tour]\n[[tour.overrides]]\neffect = \"galaxy\"\nduration = 1e300\n",
        ] {
            let err = GalleryConfig::from_toml_str(body).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)), "{body}: {err}");
        }
        let config =
            GalleryConfig::from_toml_str("version = 1\n[tour]\nitem_duration = 2.5\n").unwrap();
        assert_eq!(
            config.tour.unwrap().item_duration,
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn empty_tour_visits_whole_catalog() {
        let config = GalleryConfig::from_toml_str("version = 1\n[tour]\n").unwrap();
        let tour = config.tour.unwrap();
        assert_eq!(tour.mode, TourMode::Continuous);
        assert_eq!(tour.item_duration, Duration::from_secs(30));
        assert_eq!(tour.effect_kinds().unwrap(), EffectKind::ALL.to_vec());
    }

    #[test]
    fn parses_sizes_and_antialias() {
        assert_eq!(parse_size("800X600"), Ok((800, 600)));
        assert!(parse_size("0x600").is_err());
        assert!(parse_size("800").is_err());
        assert_eq!(parse_antialias("8"), Ok(AntialiasSetting::Samples8));
        assert!(parse_antialias("3").is_err());
    }
}
