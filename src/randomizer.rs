//! Bag randomizer with independent DOT injection.

use crate::config::{ConfigError, GameConfig};
use crate::piece::Piece;
use crate::shapes::ShapeKind;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Deals every enabled shape once per bag, in shuffled order; DOT bypasses the bag.
#[derive(Debug, Clone)]
pub struct Randomizer {
    kinds: Vec<ShapeKind>,
    bag: VecDeque<ShapeKind>,
    special_probability: f64,
    cols: usize,
    refills: u64,
    rng: StdRng,
}

impl Randomizer {
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        Self::from_rng(config, StdRng::from_entropy())
    }

    /// Reproducible within one process; used by tests and `--seed`.
    pub fn with_seed(config: &GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::from_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn from_rng(config: &GameConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let kinds = config.shapes.bag_kinds();
        let mut r = Self {
            bag: VecDeque::with_capacity(kinds.len()),
            kinds,
            special_probability: if config.special_enabled() {
                config.special_probability
            } else {
                0.0
            },
            cols: config.cols,
            refills: 0,
            rng,
        };
        r.refill();
        Ok(r)
    }

    fn refill(&mut self) {
        let mut all = self.kinds.clone();
        // Fisher–Yates shuffle
        all.shuffle(&mut self.rng);
        self.bag.extend(all);
        self.refills += 1;
    }

    /// Next shape key: DOT with the configured probability, otherwise the front of the bag.
    pub fn next_kind(&mut self) -> ShapeKind {
        if self.special_probability > 0.0 && self.rng.r#gen::<f64>() < self.special_probability {
            return ShapeKind::SPECIAL;
        }
        if self.bag.is_empty() {
            self.refill();
        }
        match self.bag.pop_front() {
            Some(kind) => kind,
            // kinds is never empty after validation
            None => ShapeKind::SPECIAL,
        }
    }

    pub fn next_piece(&mut self) -> Piece {
        let kind = self.next_kind();
        self.create_piece(kind)
    }

    pub fn create_piece(&self, kind: ShapeKind) -> Piece {
        Piece::spawn(kind, self.cols)
    }

    /// Keys still waiting in the current bag, in deal order.
    pub fn remaining(&self) -> &VecDeque<ShapeKind> {
        &self.bag
    }

    /// Enabled bag keys in catalog order.
    pub fn enabled(&self) -> &[ShapeKind] {
        &self.kinds
    }

    /// How many times the bag has been filled (including the initial fill).
    pub fn refills(&self) -> u64 {
        self.refills
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeSet;
    use std::collections::{HashMap, HashSet};

    fn seeded(extra: bool, p: f64, seed: u64) -> Randomizer {
        Randomizer::with_seed(&GameConfig::new(extra, p), seed).unwrap()
    }

    #[test]
    fn test_each_bag_deals_every_shape_once() {
        let mut r = seeded(false, 0.0, 7);
        for _ in 0..50 {
            let cycle: Vec<_> = (0..7).map(|_| r.next_kind()).collect();
            let unique: HashSet<_> = cycle.iter().copied().collect();
            assert_eq!(unique.len(), 7, "{cycle:?}");
        }
    }

    #[test]
    fn test_extended_bag_has_thirteen_kinds() {
        let mut r = seeded(true, 0.0, 3);
        assert_eq!(r.enabled().len(), 13);
        let cycle: HashSet<_> = (0..13).map(|_| r.next_kind()).collect();
        assert_eq!(cycle.len(), 13);
        assert!(!cycle.contains(&ShapeKind::Dot));
    }

    #[test]
    fn test_zero_probability_never_deals_dot() {
        let mut r = seeded(true, 0.0, 11);
        assert!((0..5000).all(|_| r.next_kind() != ShapeKind::Dot));
    }

    #[test]
    fn test_full_probability_always_deals_dot_and_keeps_bag() {
        let mut r = seeded(true, 1.0, 11);
        let before = r.remaining().clone();
        for _ in 0..1000 {
            assert_eq!(r.next_piece().kind, ShapeKind::Dot);
        }
        assert_eq!(r.remaining(), &before);
        assert_eq!(r.refills(), 1);
    }

    #[test]
    fn test_standard_set_never_deals_dot() {
        let mut r = Randomizer::with_seed(&GameConfig::default(), 5).unwrap();
        assert!((0..5000).all(|_| r.next_kind() != ShapeKind::Dot));
        let mut r = seeded(false, 1.0, 5);
        assert!((0..5000).all(|_| r.next_kind() != ShapeKind::Dot));
    }

    #[test]
    fn test_custom_set_listing_dot_allows_injection() {
        let config = GameConfig {
            shapes: ShapeSet::Custom(vec![ShapeKind::T, ShapeKind::Dot]),
            special_probability: 1.0,
            ..GameConfig::default()
        };
        let mut r = Randomizer::with_seed(&config, 5).unwrap();
        assert_eq!(r.enabled(), [ShapeKind::T]);
        assert_eq!(r.next_kind(), ShapeKind::Dot);
    }

    #[test]
    fn test_shuffle_is_roughly_uniform() {
        // 3 kinds -> 6 permutations; each should show up near 1/6 of the time.
        let config = GameConfig {
            shapes: ShapeSet::Custom(vec![ShapeKind::I, ShapeKind::O, ShapeKind::T]),
            special_probability: 0.0,
            ..GameConfig::default()
        };
        let mut r = Randomizer::with_seed(&config, 2024).unwrap();
        let cycles = 12_000;
        let mut counts: HashMap<Vec<ShapeKind>, u32> = HashMap::new();
        for _ in 0..cycles {
            let perm: Vec<_> = (0..3).map(|_| r.next_kind()).collect();
            *counts.entry(perm).or_default() += 1;
        }
        assert_eq!(counts.len(), 6);
        let expected = cycles as f64 / 6.0;
        for (perm, n) in counts {
            let dev = (n as f64 - expected).abs() / expected;
            assert!(dev < 0.1, "{perm:?} drawn {n} times");
        }
    }

    #[test]
    fn test_special_rate_matches_probability() {
        let mut r = seeded(true, 0.25, 99);
        let draws = 20_000;
        let dots = (0..draws).filter(|_| r.next_kind() == ShapeKind::Dot).count();
        let rate = dots as f64 / draws as f64;
        assert!((rate - 0.25).abs() < 0.02, "rate {rate}");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GameConfig::new(false, 2.0);
        assert!(Randomizer::with_seed(&config, 1).is_err());
    }
}
