//! Shape catalog: piece kinds, their base matrices and colours, and matrix rotation.

use std::fmt;

/// Piece kinds: the seven tetrominoes, the extended polyominoes and the single-cell DOT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
    U,
    P,
    W,
    V,
    X,
    Y,
    Dot,
}

impl ShapeKind {
    pub const STANDARD: [Self; 7] = [Self::I, Self::J, Self::L, Self::O, Self::S, Self::T, Self::Z];

    /// Extra polyominoes enabled by `ShapeSet::Extended` (DOT is injected separately).
    pub const EXTENDED: [Self; 6] = [Self::U, Self::P, Self::W, Self::V, Self::X, Self::Y];

    pub const ALL: [Self; 14] = [
        Self::I,
        Self::J,
        Self::L,
        Self::O,
        Self::S,
        Self::T,
        Self::Z,
        Self::U,
        Self::P,
        Self::W,
        Self::V,
        Self::X,
        Self::Y,
        Self::Dot,
    ];

    /// The single-cell piece that sinks through gaps and never sits in the bag.
    pub const SPECIAL: Self = Self::Dot;

    #[inline]
    pub fn is_special(self) -> bool {
        self == Self::SPECIAL
    }

    /// Base rotation matrix, row-major, square.
    pub fn template(self) -> &'static [&'static [u8]] {
        match self {
            Self::I => &[&[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]],
            Self::J => &[&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]],
            Self::L => &[&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]],
            Self::O => &[&[1, 1], &[1, 1]],
            Self::S => &[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]],
            Self::T => &[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]],
            Self::Z => &[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]],
            Self::U => &[&[1, 0, 1], &[1, 1, 1], &[0, 0, 0]],
            Self::P => &[&[1, 1, 0], &[1, 1, 1], &[0, 0, 0]],
            Self::W => &[&[1, 0, 0], &[1, 1, 0], &[0, 1, 1]],
            Self::V => &[&[1, 0, 0], &[1, 0, 0], &[1, 1, 0]],
            Self::X => &[&[0, 1, 0], &[1, 1, 1], &[0, 1, 0]],
            Self::Y => &[&[0, 1, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]],
            Self::Dot => &[&[1]],
        }
    }

    /// Fresh copy of the base matrix; the template itself is never handed out mutably.
    pub fn matrix(self) -> Matrix {
        Matrix::from_rows(self.template())
    }

    /// Display colour as `#RRGGBB`.
    pub fn color_hex(self) -> &'static str {
        match self {
            Self::I => "#00E5FF",
            Self::J => "#3F51B5",
            Self::L => "#FFB74D",
            Self::O => "#FFD54F",
            Self::S => "#00E676",
            Self::T => "#BA68C8",
            Self::Z => "#FF5252",
            Self::U => "#4DD0E1",
            Self::P => "#8BC34A",
            Self::W => "#FF8A65",
            Self::V => "#FFD180",
            Self::X => "#263238",
            Self::Y => "#B39DDB",
            Self::Dot => "#FFFFFF",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::I => "I",
            Self::J => "J",
            Self::L => "L",
            Self::O => "O",
            Self::S => "S",
            Self::T => "T",
            Self::Z => "Z",
            Self::U => "U",
            Self::P => "P",
            Self::W => "W",
            Self::V => "V",
            Self::X => "X",
            Self::Y => "Y",
            Self::Dot => "DOT",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Square 0/1 matrix, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matrix {
    size: usize,
    cells: Vec<bool>,
}

impl Matrix {
    /// Build from square rows of 0/1. Non-zero counts as set.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Self {
        let size = rows.len();
        let mut cells = vec![false; size * size];
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.as_ref().iter().enumerate().take(size) {
                cells[r * size + c] = v != 0;
            }
        }
        Self { size, cells }
    }

    /// Side length N of the N×N matrix.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[row * self.size + col]
    }

    /// `(row, col)` of every set cell, top row first.
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(move |(i, _)| (i / n, i % n))
    }

    /// Rows as 0/1 vectors (for rendering and tests).
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        (0..self.size)
            .map(|r| (0..self.size).map(|c| u8::from(self.get(r, c))).collect())
            .collect()
    }

    pub fn rotated(&self) -> Self {
        rotate(self)
    }
}

/// Rotate an N×N matrix 90° clockwise: `result[c][N-1-r] = source[r][c]`.
pub fn rotate(source: &Matrix) -> Matrix {
    let n = source.size;
    let mut cells = vec![false; n * n];
    for r in 0..n {
        for c in 0..n {
            cells[c * n + (n - 1 - r)] = source.cells[r * n + c];
        }
    }
    Matrix { size: n, cells }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_t_clockwise() {
        let t = ShapeKind::T.matrix().rotated();
        assert_eq!(t.to_rows(), vec![vec![0, 1, 0], vec![0, 1, 1], vec![0, 1, 0]]);
    }

    #[test]
    fn test_rotate_four_times_is_identity() {
        for kind in ShapeKind::ALL {
            let m = kind.matrix();
            let back = m.rotated().rotated().rotated().rotated();
            assert_eq!(back, m, "{kind}");
        }
        let odd = Matrix::from_rows(&[[1u8, 1, 0, 1, 0], [0, 0, 1, 0, 0], [1, 0, 0, 0, 1], [0, 1, 1, 0, 0], [0, 0, 0, 1, 1]]);
        assert_eq!(odd.rotated().rotated().rotated().rotated(), odd);
    }

    #[test]
    fn test_rotate_dot_is_noop() {
        let dot = ShapeKind::Dot.matrix();
        assert_eq!(dot.rotated(), dot);
        assert_eq!(dot.size(), 1);
    }

    #[test]
    fn test_matrix_is_a_copy_of_the_template() {
        let mut a = ShapeKind::L.matrix();
        a = a.rotated();
        let b = ShapeKind::L.matrix();
        assert_ne!(a, b);
        assert_eq!(b, Matrix::from_rows(ShapeKind::L.template()));
    }

    #[test]
    fn test_catalog_is_square() {
        for kind in ShapeKind::ALL {
            let rows = kind.template();
            assert!(rows.iter().all(|r| r.len() == rows.len()), "{kind}");
            assert!(kind.matrix().filled_cells().count() > 0);
        }
    }
}
