//! Control descriptors shared by the dock, the command line and preset files.
//!
//! Every effect describes its tunables as a list of [`Control`]s carrying the
//! current value. Writes go through [`resolve`], which checks the value
//! against the descriptor (type, range, step, options) before the effect
//! assigns it, so all three input paths share the same validation.

use std::fmt;

use crate::catalog::EffectKind;
use crate::color::{NamedColor, Rgb};
use crate::error::EffectError;

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Slider {
        min: f32,
        max: f32,
        step: Option<f32>,
        /// Digits after the decimal point when displayed.
        decimals: usize,
    },
    Toggle,
    Picker {
        options: &'static [&'static str],
    },
    Color,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    Float(f32),
    Bool(bool),
    Choice(String),
    Color(Rgb),
}

impl ControlValue {
    pub fn as_float(&self) -> Option<f32> {
        match self {
            ControlValue::Float(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<f32> for ControlValue {
    fn from(value: f32) -> Self {
        ControlValue::Float(value)
    }
}

impl From<bool> for ControlValue {
    fn from(value: bool) -> Self {
        ControlValue::Bool(value)
    }
}

impl From<&str> for ControlValue {
    fn from(value: &str) -> Self {
        ControlValue::Choice(value.to_string())
    }
}

impl From<Rgb> for ControlValue {
    fn from(value: Rgb) -> Self {
        ControlValue::Color(value)
    }
}

/// One tunable parameter together with its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: ControlKind,
    pub value: ControlValue,
}

impl Control {
    pub fn slider(id: &'static str, label: &'static str, min: f32, max: f32, value: f32) -> Self {
        Self {
            id,
            label,
            kind: ControlKind::Slider {
                min,
                max,
                step: None,
                decimals: 1,
            },
            value: ControlValue::Float(value),
        }
    }

    pub fn toggle(id: &'static str, label: &'static str, value: bool) -> Self {
        Self {
            id,
            label,
            kind: ControlKind::Toggle,
            value: ControlValue::Bool(value),
        }
    }

    pub fn picker(
        id: &'static str,
        label: &'static str,
        options: &'static [&'static str],
        current: &str,
    ) -> Self {
        Self {
            id,
            label,
            kind: ControlKind::Picker { options },
            value: ControlValue::Choice(current.to_string()),
        }
    }

    pub fn color(id: &'static str, label: &'static str, value: Rgb) -> Self {
        Self {
            id,
            label,
            kind: ControlKind::Color,
            value: ControlValue::Color(value),
        }
    }

    /// Snaps slider values to multiples of `step` measured from the minimum.
    pub fn with_step(mut self, value: f32) -> Self {
        if let ControlKind::Slider { step, .. } = &mut self.kind {
            *step = Some(value);
        }
        self
    }

    pub fn with_decimals(mut self, value: usize) -> Self {
        if let ControlKind::Slider { decimals, .. } = &mut self.kind {
            *decimals = value;
        }
        self
    }

    /// Validates `value` against this descriptor and returns the value the
    /// effect should store (clamped, snapped, canonicalised).
    pub fn coerce(&self, effect: EffectKind, value: ControlValue) -> Result<ControlValue, EffectError> {
        let invalid = |reason: String| EffectError::InvalidValue {
            effect,
            id: self.id.to_string(),
            reason,
        };

        match (&self.kind, value) {
            (ControlKind::Slider { min, max, step, .. }, ControlValue::Float(raw)) => {
                if !raw.is_finite() {
                    return Err(invalid(format!("{raw} is not a finite number")));
                }
                Ok(ControlValue::Float(snap(raw, *min, *max, *step)))
            }
            (ControlKind::Toggle, ControlValue::Bool(flag)) => Ok(ControlValue::Bool(flag)),
            (ControlKind::Picker { options }, ControlValue::Choice(choice)) => options
                .iter()
                .find(|option| option.eq_ignore_ascii_case(choice.trim()))
                .map(|option| ControlValue::Choice((*option).to_string()))
                .ok_or_else(|| {
                    invalid(format!(
                        "'{choice}' is not one of {}",
                        options.join(", ")
                    ))
                }),
            (ControlKind::Color, ControlValue::Color(rgb)) => Ok(ControlValue::Color(Rgb::new(
                rgb.r.clamp(0.0, 1.0),
                rgb.g.clamp(0.0, 1.0),
                rgb.b.clamp(0.0, 1.0),
            ))),
            (ControlKind::Color, ControlValue::Choice(raw)) => Rgb::parse(&raw)
                .map(ControlValue::Color)
                .map_err(invalid),
            (kind, other) => Err(invalid(format!(
                "expected {}, got {other}",
                kind_name(kind)
            ))),
        }
    }

    /// Parses textual input (command line, preset files) for this control.
    pub fn parse(&self, effect: EffectKind, raw: &str) -> Result<ControlValue, EffectError> {
        let invalid = |reason: String| EffectError::InvalidValue {
            effect,
            id: self.id.to_string(),
            reason,
        };
        let trimmed = raw.trim();
        let value = match &self.kind {
            ControlKind::Slider { .. } => trimmed
                .parse::<f32>()
                .map(ControlValue::Float)
                .map_err(|_| invalid(format!("'{trimmed}' is not a number")))?,
            ControlKind::Toggle => parse_flag(trimmed)
                .map(ControlValue::Bool)
                .ok_or_else(|| invalid(format!("'{trimmed}' is not on/off")))?,
            ControlKind::Picker { .. } => ControlValue::Choice(trimmed.to_string()),
            ControlKind::Color => Rgb::parse(trimmed).map(ControlValue::Color).map_err(invalid)?,
        };
        self.coerce(effect, value)
    }

    /// Moves the value one notch in `direction` (negative = down).
    ///
    /// Sliders move by their step, or a hundredth of the range without one.
    /// Pickers and colors cycle through their options; toggles flip.
    pub fn nudge(&self, direction: i32) -> ControlValue {
        match (&self.kind, &self.value) {
            (ControlKind::Slider { min, max, step, .. }, ControlValue::Float(current)) => {
                let increment = step.unwrap_or((max - min) / 100.0);
                let next = current + increment * direction.signum() as f32;
                ControlValue::Float(snap(next, *min, *max, *step))
            }
            (ControlKind::Toggle, ControlValue::Bool(flag)) => ControlValue::Bool(!flag),
            (ControlKind::Picker { options }, ControlValue::Choice(current)) => {
                let index = options
                    .iter()
                    .position(|option| option.eq_ignore_ascii_case(current))
                    .unwrap_or(0);
                let next = cycle(index, options.len(), direction);
                ControlValue::Choice(options[next].to_string())
            }
            (ControlKind::Color, ControlValue::Color(current)) => {
                let palette = NamedColor::ALL;
                let index = palette
                    .iter()
                    .position(|named| named.rgb() == *current)
                    .unwrap_or(0);
                let next = if palette[index].rgb() == *current {
                    cycle(index, palette.len(), direction)
                } else {
                    0
                };
                ControlValue::Color(palette[next].rgb())
            }
            (_, value) => value.clone(),
        }
    }

    /// Human readable current value, formatted the way the dock shows it.
    pub fn display_value(&self) -> String {
        match (&self.kind, &self.value) {
            (ControlKind::Slider { decimals, .. }, ControlValue::Float(value)) => {
                format!("{value:.prec$}", prec = *decimals)
            }
            (_, value) => value.to_string(),
        }
    }

    /// Short description of the accepted input, e.g. `0.20..2.00` or `on|off`.
    pub fn describe_range(&self) -> String {
        match &self.kind {
            ControlKind::Slider {
                min,
                max,
                step,
                decimals,
            } => match step {
                Some(step) => format!(
                    "{min:.prec$}..{max:.prec$} step {step}",
                    prec = *decimals
                ),
                None => format!("{min:.prec$}..{max:.prec$}", prec = *decimals),
            },
            ControlKind::Toggle => "on|off".to_string(),
            ControlKind::Picker { options } => options.join("|"),
            ControlKind::Color => "#RRGGBB or color name".to_string(),
        }
    }
}

impl fmt::Display for ControlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlValue::Float(value) => write!(f, "{value}"),
            ControlValue::Bool(true) => f.write_str("on"),
            ControlValue::Bool(false) => f.write_str("off"),
            ControlValue::Choice(value) => f.write_str(value),
            ControlValue::Color(rgb) => write!(f, "{rgb}"),
        }
    }
}

/// Finds control `id` among `controls` and validates `value` against it.
pub fn resolve(
    effect: EffectKind,
    controls: &[Control],
    id: &str,
    value: ControlValue,
) -> Result<ControlValue, EffectError> {
    find(effect, controls, id)?.coerce(effect, value)
}

/// Finds control `id` among `controls` and parses `raw` for it.
pub fn resolve_str(
    effect: EffectKind,
    controls: &[Control],
    id: &str,
    raw: &str,
) -> Result<ControlValue, EffectError> {
    find(effect, controls, id)?.parse(effect, raw)
}

fn find<'a>(effect: EffectKind, controls: &'a [Control], id: &str) -> Result<&'a Control, EffectError> {
    controls
        .iter()
        .find(|control| control.id.eq_ignore_ascii_case(id.trim()))
        .ok_or_else(|| EffectError::UnknownControl {
            effect,
            id: id.to_string(),
        })
}

fn snap(value: f32, min: f32, max: f32, step: Option<f32>) -> f32 {
    let snapped = match step {
        Some(step) if step > 0.0 => min + ((value - min) / step).round() * step,
        _ => value,
    };
    snapped.clamp(min, max)
}

fn cycle(index: usize, len: usize, direction: i32) -> usize {
    if len == 0 {
        return 0;
    }
    if direction < 0 {
        (index + len - 1) % len
    } else {
        (index + 1) % len
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn kind_name(kind: &ControlKind) -> &'static str {
    match kind {
        ControlKind::Slider { .. } => "a number",
        ControlKind::Toggle => "on or off",
        ControlKind::Picker { .. } => "one of the listed options",
        ControlKind::Color => "a color",
    }
}
