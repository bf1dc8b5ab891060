use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every effect the gallery ships, in gallery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Aurora,
    Orb,
    Silk,
    Dither,
    Beams,
    Galaxy,
    Prism,
    Plasma,
    Particles,
}

impl EffectKind {
    pub const ALL: [EffectKind; 9] = [
        EffectKind::Aurora,
        EffectKind::Orb,
        EffectKind::Silk,
        EffectKind::Dither,
        EffectKind::Beams,
        EffectKind::Galaxy,
        EffectKind::Prism,
        EffectKind::Plasma,
        EffectKind::Particles,
    ];

    /// Lowercase identifier used on the command line and in config files.
    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Aurora => "aurora",
            EffectKind::Orb => "orb",
            EffectKind::Silk => "silk",
            EffectKind::Dither => "dither",
            EffectKind::Beams => "beams",
            EffectKind::Galaxy => "galaxy",
            EffectKind::Prism => "prism",
            EffectKind::Plasma => "plasma",
            EffectKind::Particles => "particles",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            EffectKind::Aurora => "Aurora",
            EffectKind::Orb => "Orb",
            EffectKind::Silk => "Silk",
            EffectKind::Dither => "Dither",
            EffectKind::Beams => "Beams",
            EffectKind::Galaxy => "Galaxy",
            EffectKind::Prism => "Prism",
            EffectKind::Plasma => "Plasma",
            EffectKind::Particles => "Particles",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            EffectKind::Aurora => "Northern lights simulation",
            EffectKind::Orb => "3D sphere rendering",
            EffectKind::Silk => "Silk fabric physics",
            EffectKind::Dither => "Wave dithering effect",
            EffectKind::Beams => "Light beam dynamics",
            EffectKind::Galaxy => "Particle galaxy system",
            EffectKind::Prism => "Prism light dispersion",
            EffectKind::Plasma => "Plasma wave generation",
            EffectKind::Particles => "3D particle engine",
        }
    }

    /// Symbol name shown next to the card title.
    pub fn icon(self) -> &'static str {
        match self {
            EffectKind::Aurora => "sparkles",
            EffectKind::Orb => "circle.hexagongrid",
            EffectKind::Silk => "waveform.path",
            EffectKind::Dither => "square.grid.4x3.fill",
            EffectKind::Beams => "light.beacon.max.fill",
            EffectKind::Galaxy => "star.circle.fill",
            EffectKind::Prism => "pyramid.fill",
            EffectKind::Plasma => "waveform",
            EffectKind::Particles => "sparkle",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|kind| *kind == self)
            .unwrap_or_default()
    }

    /// Next effect in gallery order, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous effect in gallery order, wrapping around.
    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|kind| kind.name()).collect();
                format!(
                    "unknown effect '{}'; expected one of {}",
                    s.trim(),
                    known.join(", ")
                )
            })
    }
}

/// A numbered gallery card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    /// One-based position within the filtered listing.
    pub number: usize,
    pub kind: EffectKind,
}

/// Filters the catalog by a case-insensitive substring match on title or
/// description. An empty or whitespace-only query returns every effect.
pub fn search(query: &str) -> Vec<Card> {
    let needle = query.trim().to_lowercase();
    EffectKind::ALL
        .into_iter()
        .filter(|kind| {
            needle.is_empty()
                || kind.title().to_lowercase().contains(&needle)
                || kind.description().to_lowercase().contains(&needle)
        })
        .enumerate()
        .map(|(index, kind)| Card {
            number: index + 1,
            kind,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_lists_everything_in_order() {
        let cards = search("  ");
        assert_eq!(cards.len(), 9);
        assert_eq!(cards[0].kind, EffectKind::Aurora);
        assert_eq!(cards[0].number, 1);
        assert_eq!(cards[8].kind, EffectKind::Particles);
        assert_eq!(cards[8].number, 9);
    }

    #[test]
    fn search_matches_descriptions_case_insensitively() {
        let cards = search("PARTICLE");
        let kinds: Vec<_> = cards.iter().map(|card| card.kind).collect();
        assert_eq!(kinds, vec![EffectKind::Galaxy, EffectKind::Particles]);
        assert_eq!(cards[1].number, 2);
    }

    #[test]
    fn search_without_match_is_empty() {
        assert!(search("teapot").is_empty());
    }

    #[test]
    fn parses_names_and_wraps_navigation() {
        assert_eq!("Prism".parse::<EffectKind>().unwrap(), EffectKind::Prism);
        assert!("teapot".parse::<EffectKind>().is_err());
        assert_eq!(EffectKind::Particles.next(), EffectKind::Aurora);
        assert_eq!(EffectKind::Aurora.previous(), EffectKind::Particles);
    }
}
