//! Playfield: locked cells, collision, merge and line clear.

use crate::shapes::{Matrix, ShapeKind};
use std::collections::VecDeque;

/// One grid cell: empty, or the kind of piece that locked there (for colour lookup).
pub type Cell = Option<ShapeKind>;

/// Fixed-size playfield. y=0 is top; rows are stored [0..rows].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    /// cells[y][x]. cells[0] is the top row.
    cells: VecDeque<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: (0..rows).map(|_| vec![None; cols]).collect(),
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.cells.get(y).and_then(|row| row.get(x)).copied().flatten()
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = cell;
        }
    }

    /// Rows top to bottom.
    pub fn row_iter(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(Vec::as_slice)
    }

    pub fn reset(&mut self) {
        for row in &mut self.cells {
            row.fill(None);
        }
    }

    /// True if `matrix` placed with its top-left at `(x, y)` leaves the walls/floor or overlaps a
    /// locked cell. Cells above the top (negative rows) only check the side walls.
    pub fn collides(&self, matrix: &Matrix, x: i32, y: i32) -> bool {
        for (r, c) in matrix.filled_cells() {
            let gx = x + c as i32;
            let gy = y + r as i32;
            if gx < 0 || gx >= self.cols as i32 || gy >= self.rows as i32 {
                return true;
            }
            if gy >= 0 && self.get(gx as usize, gy as usize).is_some() {
                return true;
            }
        }
        false
    }

    /// Write `kind` into every set cell of `matrix` at `(x, y)`; cells above the top are dropped.
    pub fn merge(&mut self, matrix: &Matrix, x: i32, y: i32, kind: ShapeKind) {
        for (r, c) in matrix.filled_cells() {
            let gx = x + c as i32;
            let gy = y + r as i32;
            if gx >= 0 && gy >= 0 {
                self.set(gx as usize, gy as usize, Some(kind));
            }
        }
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.cells
            .get(y)
            .is_some_and(|row| row.iter().all(Option::is_some))
    }

    /// Lowest empty row in column `x`, scanning from the floor up.
    pub fn lowest_empty_in_column(&self, x: usize) -> Option<usize> {
        if x >= self.cols {
            return None;
        }
        (0..self.rows).rev().find(|&y| self.get(x, y).is_none())
    }

    /// Remove every full row, inserting empty rows at the top. Returns the number removed.
    pub fn clear_full_rows(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = self.rows;
        while y > 0 {
            let row = y - 1;
            if self.is_row_full(row) {
                self.cells.remove(row);
                self.cells.push_front(vec![None; self.cols]);
                cleared += 1;
                // Same index again: the row above has shifted into it.
                continue;
            }
            y -= 1;
        }
        cleared
    }

    /// Number of occupied cells.
    pub fn filled(&self) -> usize {
        self.row_iter()
            .map(|row| row.iter().filter(|c| c.is_some()).count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row_except(grid: &mut Grid, y: usize, hole: Option<usize>) {
        for x in 0..grid.cols() {
            if Some(x) != hole {
                grid.set(x, y, Some(ShapeKind::Z));
            }
        }
    }

    #[test]
    fn test_walls_and_floor_collide() {
        let grid = Grid::new(20, 10);
        let o = ShapeKind::O.matrix();
        assert!(!grid.collides(&o, 0, 0));
        assert!(!grid.collides(&o, 8, 18));
        assert!(grid.collides(&o, -1, 5));
        assert!(grid.collides(&o, 9, 5));
        assert!(grid.collides(&o, 4, 19));
    }

    #[test]
    fn test_empty_padding_rows_do_not_collide() {
        // The I matrix has its cells on row 1; rows 0, 2, 3 are padding.
        let grid = Grid::new(20, 10);
        let i = ShapeKind::I.matrix();
        assert!(!grid.collides(&i, 0, 18));
        assert!(grid.collides(&i, 0, 19));
        assert!(!grid.collides(&i, 6, 0));
        assert!(grid.collides(&i, 7, 0));
    }

    #[test]
    fn test_negative_rows_only_check_side_walls() {
        let mut grid = Grid::new(20, 10);
        fill_row_except(&mut grid, 0, None);
        let v = ShapeKind::V.matrix();
        // Entirely above the top: no collision with the filled row 0.
        assert!(!grid.collides(&v, 3, -3));
        assert!(grid.collides(&v, 3, -2));
        assert!(grid.collides(&v, -1, -3));
    }

    #[test]
    fn test_occupied_cell_collides() {
        let mut grid = Grid::new(20, 10);
        grid.set(5, 10, Some(ShapeKind::T));
        let o = ShapeKind::O.matrix();
        assert!(grid.collides(&o, 4, 9));
        assert!(!grid.collides(&o, 6, 9));
    }

    #[test]
    fn test_merge_drops_cells_above_top() {
        let mut grid = Grid::new(20, 10);
        let o = ShapeKind::O.matrix();
        grid.merge(&o, 4, -1, ShapeKind::O);
        assert_eq!(grid.filled(), 2);
        assert_eq!(grid.get(4, 0), Some(ShapeKind::O));
        assert_eq!(grid.get(5, 0), Some(ShapeKind::O));
    }

    #[test]
    fn test_clear_with_no_full_rows_is_noop() {
        let mut grid = Grid::new(20, 10);
        fill_row_except(&mut grid, 19, Some(3));
        grid.set(0, 12, Some(ShapeKind::L));
        let before = grid.clone();
        assert_eq!(grid.clear_full_rows(), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_clear_adjacent_rows_rechecks_same_index() {
        let mut grid = Grid::new(20, 10);
        fill_row_except(&mut grid, 19, None);
        fill_row_except(&mut grid, 18, None);
        fill_row_except(&mut grid, 17, Some(0));
        grid.set(1, 16, Some(ShapeKind::I));
        assert_eq!(grid.clear_full_rows(), 2);
        assert!(grid.get(0, 19).is_none());
        assert_eq!(grid.get(1, 19), Some(ShapeKind::Z));
        assert_eq!(grid.get(1, 18), Some(ShapeKind::I));
        assert_eq!(grid.filled(), 10);
    }

    #[test]
    fn test_clear_preserves_order_around_gap() {
        let mut grid = Grid::new(6, 4);
        grid.set(0, 2, Some(ShapeKind::S));
        fill_row_except(&mut grid, 3, None);
        grid.set(1, 4, Some(ShapeKind::T));
        fill_row_except(&mut grid, 5, None);
        assert_eq!(grid.clear_full_rows(), 2);
        assert_eq!(grid.get(0, 4), Some(ShapeKind::S));
        assert_eq!(grid.get(1, 5), Some(ShapeKind::T));
        assert_eq!(grid.filled(), 2);
    }

    #[test]
    fn test_more_than_four_rows_can_clear() {
        let mut grid = Grid::new(20, 10);
        for y in 14..20 {
            fill_row_except(&mut grid, y, None);
        }
        assert_eq!(grid.clear_full_rows(), 6);
        assert_eq!(grid.filled(), 0);
    }

    #[test]
    fn test_lowest_empty_in_column() {
        let mut grid = Grid::new(5, 3);
        assert_eq!(grid.lowest_empty_in_column(1), Some(4));
        grid.set(1, 4, Some(ShapeKind::O));
        grid.set(1, 2, Some(ShapeKind::O));
        assert_eq!(grid.lowest_empty_in_column(1), Some(3));
        for y in 0..5 {
            grid.set(2, y, Some(ShapeKind::O));
        }
        assert_eq!(grid.lowest_empty_in_column(2), None);
        assert_eq!(grid.lowest_empty_in_column(7), None);
    }
}
