//! Falling-block puzzle engine.
//!
//! The shape catalog and bag randomizer feed pieces (including a sinking single-cell DOT) into
//! a playfield grid; `Session` drives the game and reports every change to its observers.

pub mod config;
pub mod grid;
pub mod highscores;
pub mod piece;
pub mod randomizer;
pub mod session;
pub mod shapes;

pub use config::{ConfigError, GameConfig, ShapeSet};
pub use grid::{Cell, Grid};
pub use piece::Piece;
pub use randomizer::Randomizer;
pub use session::{Observer, Phase, Session, Update, UpdateEvent, View};
pub use shapes::{Matrix, ShapeKind, rotate};
