use std::time::{Duration, Instant};

use effects::EffectKind;
use presets::TourConfig;
pub use presets::TourMode;
use rand::prelude::*;

#[derive(Debug, thiserror::Error)]
pub enum TourError {
    #[error("tour has no effects to show")]
    Empty,
    #[error("tour references unknown effect: {0}")]
    UnknownEffect(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourItem {
    pub kind: EffectKind,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourChange {
    pub item: TourItem,
    pub started_at: Instant,
}

/// Auto-advancing slideshow over a list of effects.
#[derive(Debug)]
pub struct Tour {
    mode: TourMode,
    items: Vec<TourItem>,
    order: Vec<usize>,
    cursor: usize,
    last_started: Instant,
    rng: StdRng,
}

impl Tour {
    pub fn from_config(config: &TourConfig, seed: u64, now: Instant) -> Result<Self, TourError> {
        let kinds = config
            .effect_kinds()
            .map_err(|err| TourError::UnknownEffect(err.to_string()))?;
        let items = kinds
            .into_iter()
            .map(|kind| TourItem {
                kind,
                duration: config.duration_for(kind),
            })
            .collect();
        Self::new(items, config.mode, seed, now)
    }

    pub fn new(
        items: Vec<TourItem>,
        mode: TourMode,
        seed: u64,
        now: Instant,
    ) -> Result<Self, TourError> {
        if items.is_empty() {
            return Err(TourError::Empty);
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let order = build_order(items.len(), mode, &mut rng);
        tracing::debug!(items = items.len(), ?mode, "tour started");
        Ok(Self {
            mode,
            items,
            order,
            cursor: 0,
            last_started: now,
            rng,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current(&self) -> TourItem {
        self.items[self.order[self.cursor]]
    }

    /// Time left before the current item advances on its own.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.current()
            .duration
            .saturating_sub(now.saturating_duration_since(self.last_started))
    }

    /// Advances when the current item's duration has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<TourChange> {
        if self.items.len() <= 1 {
            return None;
        }
        if now.saturating_duration_since(self.last_started) < self.current().duration {
            return None;
        }
        Some(self.step_forward(now))
    }

    pub fn skip(&mut self, now: Instant) -> Option<TourChange> {
        if self.items.len() <= 1 {
            return None;
        }
        Some(self.step_forward(now))
    }

    /// Steps back within the current pass, wrapping to its last item.
    pub fn back(&mut self, now: Instant) -> Option<TourChange> {
        if self.items.len() <= 1 {
            return None;
        }
        self.cursor = match self.cursor {
            0 => self.order.len() - 1,
            cursor => cursor - 1,
        };
        Some(self.started(now))
    }

    fn step_forward(&mut self, now: Instant) -> TourChange {
        self.cursor += 1;
        if self.cursor >= self.order.len() {
            self.order = build_order(self.items.len(), self.mode, &mut self.rng);
            self.cursor = 0;
        }
        self.started(now)
    }

    fn started(&mut self, now: Instant) -> TourChange {
        self.last_started = now;
        let item = self.current();
        tracing::debug!(effect = %item.kind, duration = ?item.duration, "tour advanced");
        TourChange {
            item,
            started_at: now,
        }
    }
}

fn build_order(len: usize, mode: TourMode, rng: &mut StdRng) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    match mode {
        TourMode::Continuous => {}
        TourMode::Shuffle => order.shuffle(rng),
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use presets::GalleryConfig;

    fn tour_config(body: &str) -> TourConfig {
        let config = GalleryConfig::from_toml_str(body).unwrap();
        config.tour.expect("tour table")
    }

    #[test]
    fn advances_continuous_tour() {
        let config = tour_config(
            r#"
version = 1

[tour]
item_duration = 1
effects = ["aurora", "orb"]
"#,
        );
        let mut now = Instant::now();
        let mut tour = Tour::from_config(&config, 1, now).unwrap();
        assert_eq!(tour.current().kind, EffectKind::Aurora);
        assert!(tour.tick(now + Duration::from_millis(500)).is_none());

        now += Duration::from_secs(1);
        let change = tour.tick(now).expect("advance");
        assert_eq!(change.item.kind, EffectKind::Orb);
        assert_eq!(change.started_at, now);

        now += Duration::from_secs(1);
        assert_eq!(tour.tick(now).unwrap().item.kind, EffectKind::Aurora);
    }

    #[test]
    fn shuffle_visits_every_effect_once_per_pass() {
        let config = tour_config(
            r#"
version = 1

[tour]
mode = "shuffle"
effects = ["aurora", "orb", "silk", "dither"]
"#,
        );
        let now = Instant::now();
        let mut tour = Tour::from_config(&config, 42, now).unwrap();
        for _ in 0..3 {
            let mut seen = vec![tour.current().kind];
            for _ in 0..3 {
                seen.push(tour.skip(now).unwrap().item.kind);
            }
            seen.sort();
            assert_eq!(
                seen,
                vec![
                    EffectKind::Aurora,
                    EffectKind::Orb,
                    EffectKind::Silk,
                    EffectKind::Dither
                ]
            );
            tour.skip(now);
        }
    }

    #[test]
    fn overrides_change_item_duration() {
        let config = tour_config(
            r#"
version = 1

[tour]
item_duration = "10s"
effects = ["galaxy", "plasma"]

[[tour.overrides]]
effect = "plasma"
duration = "2s"
"#,
        );
        let now = Instant::now();
        let mut tour = Tour::from_config(&config, 7, now).unwrap();
        assert_eq!(tour.current().duration, Duration::from_secs(10));
        assert_eq!(tour.remaining(now + Duration::from_secs(4)), Duration::from_secs(6));
        let change = tour.skip(now).unwrap();
        assert_eq!(change.item.duration, Duration::from_secs(2));
    }

    #[test]
    fn single_effect_never_advances() {
        let now = Instant::now();
        let item = TourItem {
            kind: EffectKind::Prism,
            duration: Duration::from_secs(1),
        };
        let mut tour = Tour::new(vec![item], TourMode::Shuffle, 3, now).unwrap();
        assert!(tour.tick(now + Duration::from_secs(60)).is_none());
        assert!(tour.skip(now).is_none());
        assert!(tour.back(now).is_none());
        assert_eq!(tour.current(), item);
    }

    #[test]
    fn back_wraps_to_end_of_pass() {
        let config = tour_config("version = 1\n[tour]\n");
        let now = Instant::now();
        let mut tour = Tour::from_config(&config, 0, now).unwrap();
        assert_eq!(tour.len(), EffectKind::ALL.len());
        assert_eq!(tour.back(now).unwrap().item.kind, EffectKind::Particles);
        assert_eq!(tour.skip(now).unwrap().item.kind, EffectKind::Aurora);
    }

    #[test]
    fn empty_tour_is_rejected() {
        let err = Tour::new(Vec::new(), TourMode::Continuous, 0, Instant::now()).err();
        assert!(matches!(err, Some(TourError::Empty)));
    }
}
