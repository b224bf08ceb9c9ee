//! Active piece instances and the factory that places them at the spawn point.

use crate::shapes::{Matrix, ShapeKind};

/// A falling (or queued) piece: its own matrix copy plus grid offset.
/// `y` may be negative while the piece is still entering from above the visible top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: ShapeKind,
    pub matrix: Matrix,
    pub x: i32,
    pub y: i32,
}

/// Row new pieces spawn on: one above the visible top.
pub const SPAWN_ROW: i32 = -1;

impl Piece {
    /// New piece of `kind`, centred horizontally in a grid `cols` wide, at `SPAWN_ROW`.
    pub fn spawn(kind: ShapeKind, cols: usize) -> Self {
        let matrix = kind.matrix();
        let width = matrix.size() as i32;
        Self {
            kind,
            x: cols as i32 / 2 - (width + 1) / 2,
            y: SPAWN_ROW,
            matrix,
        }
    }

    /// Absolute `(x, y)` of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.matrix
            .filled_cells()
            .map(|(r, c)| (self.x + c as i32, self.y + r as i32))
    }
}
