//! Session configuration: enabled shapes, special-piece probability, grid size and drop timing.

use crate::shapes::ShapeKind;
use thiserror::Error;

/// Default playfield size (rows × columns).
pub const DEFAULT_ROWS: usize = 20;
pub const DEFAULT_COLS: usize = 10;

/// Largest playfield accepted, so it can be laid out in terminal coordinates.
pub const MAX_ROWS: usize = 200;
pub const MAX_COLS: usize = 200;

/// Default DOT injection probability per draw.
pub const DEFAULT_SPECIAL_PROBABILITY: f64 = 0.05;

/// Drop interval at level 1.
pub const DEFAULT_BASE_DROP_MS: u32 = 800;
/// Interval reduction per level gained.
pub const DEFAULT_DROP_STEP_MS: u32 = 60;
/// Interval never goes below this.
pub const DEFAULT_MIN_DROP_MS: u32 = 100;

/// Which shapes the bag deals. DOT never goes in the bag; when the set allows it, it is
/// injected by probability.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShapeSet {
    /// I, J, L, O, S, T, Z.
    #[default]
    Standard,
    /// Standard plus U, P, W, V, X, Y, and the DOT.
    Extended,
    /// Explicit list (duplicates are collapsed). Listing DOT allows injection, it never
    /// enters the bag.
    Custom(Vec<ShapeKind>),
}

impl ShapeSet {
    /// Bag contents in catalog order, without duplicates and without the special piece.
    pub fn bag_kinds(&self) -> Vec<ShapeKind> {
        match self {
            Self::Standard => ShapeKind::STANDARD.to_vec(),
            Self::Extended => ShapeKind::STANDARD
                .iter()
                .chain(ShapeKind::EXTENDED.iter())
                .copied()
                .collect(),
            Self::Custom(kinds) => {
                let mut out: Vec<ShapeKind> = kinds.iter().copied().filter(|k| !k.is_special()).collect();
                out.sort();
                out.dedup();
                out
            }
        }
    }

    /// Whether the DOT may be dealt at all.
    pub fn includes_special(&self) -> bool {
        match self {
            Self::Standard => false,
            Self::Extended => true,
            Self::Custom(kinds) => kinds.iter().any(|k| k.is_special()),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("no shapes enabled for the bag")]
    EmptyShapeSet,
    #[error("special piece probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),
    #[error("playfield {rows}x{cols} is too small (need at least {min_rows}x{min_cols})")]
    GridTooSmall {
        rows: usize,
        cols: usize,
        min_rows: usize,
        min_cols: usize,
    },
    #[error("playfield {rows}x{cols} is too large (at most {max_rows}x{max_cols})")]
    GridTooLarge {
        rows: usize,
        cols: usize,
        max_rows: usize,
        max_cols: usize,
    },
    #[error("drop timing invalid: base {base_ms} ms must be >= minimum {min_ms} ms > 0")]
    InvalidDropTiming { base_ms: u32, min_ms: u32 },
}

/// Construction-time configuration for a `Session`.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub shapes: ShapeSet,
    /// Per-draw probability of injecting the DOT piece when the shape set includes it.
    pub special_probability: f64,
    pub rows: usize,
    pub cols: usize,
    pub base_drop_ms: u32,
    pub drop_step_ms: u32,
    pub min_drop_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            shapes: ShapeSet::Standard,
            special_probability: DEFAULT_SPECIAL_PROBABILITY,
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            base_drop_ms: DEFAULT_BASE_DROP_MS,
            drop_step_ms: DEFAULT_DROP_STEP_MS,
            min_drop_ms: DEFAULT_MIN_DROP_MS,
        }
    }
}

impl GameConfig {
    /// Standard or extended shapes with the given DOT probability; everything else default.
    pub fn new(extra_shapes: bool, special_probability: f64) -> Self {
        Self {
            shapes: if extra_shapes {
                ShapeSet::Extended
            } else {
                ShapeSet::Standard
            },
            special_probability,
            ..Self::default()
        }
    }

    /// DOT is dealt only when the shape set includes it and its probability is positive.
    #[inline]
    pub fn special_enabled(&self) -> bool {
        self.shapes.includes_special() && self.special_probability > 0.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shapes.bag_kinds().is_empty() {
            return Err(ConfigError::EmptyShapeSet);
        }
        if !(0.0..=1.0).contains(&self.special_probability) {
            return Err(ConfigError::InvalidProbability(self.special_probability));
        }
        let min_cols = self
            .shapes
            .bag_kinds()
            .iter()
            .map(|k| k.matrix().size())
            .max()
            .unwrap_or(1);
        let min_rows = 2;
        if self.rows < min_rows || self.cols < min_cols {
            return Err(ConfigError::GridTooSmall {
                rows: self.rows,
                cols: self.cols,
                min_rows,
                min_cols,
            });
        }
        if self.rows > MAX_ROWS || self.cols > MAX_COLS {
            return Err(ConfigError::GridTooLarge {
                rows: self.rows,
                cols: self.cols,
                max_rows: MAX_ROWS,
                max_cols: MAX_COLS,
            });
        }
        if self.min_drop_ms == 0 || self.base_drop_ms < self.min_drop_ms {
            return Err(ConfigError::InvalidDropTiming {
                base_ms: self.base_drop_ms,
                min_ms: self.min_drop_ms,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
        assert_eq!(GameConfig::new(true, 1.0).validate(), Ok(()));
    }

    #[test]
    fn test_empty_custom_set_fails_fast() {
        let config = GameConfig {
            shapes: ShapeSet::Custom(vec![ShapeKind::Dot]),
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyShapeSet));
    }

    #[test]
    fn test_probability_out_of_range() {
        assert_eq!(
            GameConfig::new(false, 1.5).validate(),
            Err(ConfigError::InvalidProbability(1.5))
        );
        assert!(GameConfig::new(false, -0.1).validate().is_err());
        assert!(GameConfig::new(false, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_grid_must_fit_widest_shape() {
        let config = GameConfig {
            cols: 3,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::GridTooSmall { min_cols: 4, .. })));
    }

    #[test]
    fn test_grid_size_is_capped() {
        let config = GameConfig {
            cols: 40_000,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::GridTooLarge { cols: 40_000, .. })));
        let config = GameConfig {
            rows: MAX_ROWS,
            cols: MAX_COLS,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_dot_needs_a_set_that_includes_it() {
        assert!(!GameConfig::default().special_enabled());
        assert!(!GameConfig::new(false, 1.0).special_enabled());
        assert!(GameConfig::new(true, 0.05).special_enabled());
        assert!(!GameConfig::new(true, 0.0).special_enabled());
        let custom = GameConfig {
            shapes: ShapeSet::Custom(vec![ShapeKind::O, ShapeKind::Dot]),
            ..GameConfig::default()
        };
        assert!(custom.special_enabled());
    }

    #[test]
    fn test_custom_set_dedups_and_drops_dot() {
        let set = ShapeSet::Custom(vec![ShapeKind::O, ShapeKind::Dot, ShapeKind::O, ShapeKind::I]);
        assert_eq!(set.bag_kinds(), vec![ShapeKind::I, ShapeKind::O]);
        assert_eq!(ShapeSet::Extended.bag_kinds().len(), 13);
    }
}
