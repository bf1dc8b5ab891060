use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Linear RGB triple with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Converts hue (degrees), saturation and brightness into RGB.
    pub fn from_hsb(hue_degrees: f32, saturation: f32, brightness: f32) -> Self {
        let s = saturation.clamp(0.0, 1.0);
        let v = brightness.clamp(0.0, 1.0);
        if s <= f32::EPSILON {
            return Self::new(v, v, v);
        }

        let h = hue_degrees.rem_euclid(360.0) / 60.0;
        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        match sector as u32 {
            0 => Self::new(v, t, p),
            1 => Self::new(q, v, p),
            2 => Self::new(p, v, t),
            3 => Self::new(p, q, v),
            4 => Self::new(t, p, v),
            _ => Self::new(v, p, q),
        }
    }

    /// Parses `#RRGGBB`, `RRGGBB`, `#RGB`, or a named color.
    pub fn parse(value: &str) -> Result<Self, String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("color must not be empty".into());
        }
        if let Some(named) = NamedColor::from_name(trimmed) {
            return Ok(named.rgb());
        }

        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(format!("invalid color '{trimmed}'; expected #RRGGBB"));
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|ch| [ch, ch]).collect(),
            6 => hex.to_string(),
            _ => return Err(format!("invalid color '{trimmed}'; expected #RRGGBB")),
        };
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&expanded[range], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| format!("invalid color '{trimmed}'; expected #RRGGBB"))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(self) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02X}{:02X}{:02X}", byte(self.r), byte(self.g), byte(self.b))
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Packs the color into a vec4 slot with an explicit fourth component.
    pub fn extend(self, w: f32) -> [f32; 4] {
        [self.r, self.g, self.b, w]
    }

    pub fn is_white(self) -> bool {
        self == Self::WHITE
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Platform system colors used by the gallery presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedColor {
    White,
    Red,
    Orange,
    Yellow,
    Green,
    Mint,
    Teal,
    Cyan,
    Blue,
    Indigo,
    Purple,
    Pink,
    Brown,
}

impl NamedColor {
    pub const ALL: [NamedColor; 13] = [
        NamedColor::White,
        NamedColor::Red,
        NamedColor::Orange,
        NamedColor::Yellow,
        NamedColor::Green,
        NamedColor::Mint,
        NamedColor::Teal,
        NamedColor::Cyan,
        NamedColor::Blue,
        NamedColor::Indigo,
        NamedColor::Purple,
        NamedColor::Pink,
        NamedColor::Brown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NamedColor::White => "white",
            NamedColor::Red => "red",
            NamedColor::Orange => "orange",
            NamedColor::Yellow => "yellow",
            NamedColor::Green => "green",
            NamedColor::Mint => "mint",
            NamedColor::Teal => "teal",
            NamedColor::Cyan => "cyan",
            NamedColor::Blue => "blue",
            NamedColor::Indigo => "indigo",
            NamedColor::Purple => "purple",
            NamedColor::Pink => "pink",
            NamedColor::Brown => "brown",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|color| color.name() == normalized)
    }

    pub fn rgb(self) -> Rgb {
        match self {
            NamedColor::White => Rgb::WHITE,
            NamedColor::Red => Rgb::new(1.0, 0.231, 0.188),
            NamedColor::Orange => Rgb::new(1.0, 0.584, 0.0),
            NamedColor::Yellow => Rgb::new(1.0, 0.8, 0.0),
            NamedColor::Green => Rgb::new(0.204, 0.780, 0.349),
            NamedColor::Mint => Rgb::new(0.0, 0.780, 0.745),
            NamedColor::Teal => Rgb::new(0.188, 0.690, 0.780),
            NamedColor::Cyan => Rgb::new(0.196, 0.678, 0.902),
            NamedColor::Blue => Rgb::new(0.0, 0.478, 1.0),
            NamedColor::Indigo => Rgb::new(0.345, 0.337, 0.839),
            NamedColor::Purple => Rgb::new(0.686, 0.322, 0.871),
            NamedColor::Pink => Rgb::new(1.0, 0.176, 0.333),
            NamedColor::Brown => Rgb::new(0.635, 0.518, 0.369),
        }
    }
}
