//! Dense linear algebra over GF(2).
//!
//! Rows are bit-packed into `u64` words, so a row operation is a word-wise
//! XOR. Only what the gflow search needs is implemented: building a matrix,
//! Gauss–Jordan elimination over a set of columns, and solving several
//! right-hand sides against one elimination.

use std::fmt;

const WORD_BITS: usize = 64;

/// A dense matrix over GF(2).
#[derive(Clone, PartialEq, Eq)]
pub struct MatGf2 {
    rows: usize,
    cols: usize,
    /// Words per row.
    stride: usize,
    data: Vec<u64>,
}

impl MatGf2 {
    /// Create a zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        let stride = cols.div_ceil(WORD_BITS);
        Self {
            rows,
            cols,
            stride,
            data: vec![0; rows * stride],
        }
    }

    /// Create a matrix from rows of booleans. All rows must have `cols` entries.
    pub fn from_rows(cols: usize, rows: &[Vec<bool>]) -> Self {
        let mut mat = Self::zeros(rows.len(), cols);
        for (r, row) in rows.iter().enumerate() {
            for (c, &bit) in row.iter().enumerate().take(cols) {
                mat.set(r, c, bit);
            }
        }
        mat
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Read an entry.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        debug_assert!(row < self.rows && col < self.cols);
        (self.data[row * self.stride + col / WORD_BITS] >> (col % WORD_BITS)) & 1 == 1
    }

    /// Write an entry.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        debug_assert!(row < self.rows && col < self.cols);
        let word = &mut self.data[row * self.stride + col / WORD_BITS];
        let mask = 1u64 << (col % WORD_BITS);
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Flip an entry.
    #[inline]
    pub fn toggle(&mut self, row: usize, col: usize) {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.stride + col / WORD_BITS] ^= 1u64 << (col % WORD_BITS);
    }

    /// Swap two rows.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for w in 0..self.stride {
            self.data.swap(a * self.stride + w, b * self.stride + w);
        }
    }

    /// Add (XOR) row `src` into row `dst`.
    pub fn add_row(&mut self, src: usize, dst: usize) {
        debug_assert_ne!(src, dst);
        for w in 0..self.stride {
            let v = self.data[src * self.stride + w];
            self.data[dst * self.stride + w] ^= v;
        }
    }

    /// Check if a row is all zeros.
    pub fn row_is_zero(&self, row: usize) -> bool {
        self.data[row * self.stride..(row + 1) * self.stride]
            .iter()
            .all(|&w| w == 0)
    }

    /// Rank of the matrix.
    pub fn rank(&self) -> usize {
        let mut work = self.clone();
        work.eliminate(self.cols).len()
    }

    /// Reduce the first `lead_cols` columns to reduced row echelon form.
    ///
    /// Row operations are applied to the whole row, so any columns past
    /// `lead_cols` (augmented right-hand sides) are carried along. Pivots are
    /// chosen column by column from left to right, taking the first row at or
    /// below the current rank. Returns the pivot column of each leading row.
    pub fn eliminate(&mut self, lead_cols: usize) -> Vec<usize> {
        let mut pivots = Vec::new();
        for col in 0..lead_cols.min(self.cols) {
            let rank = pivots.len();
            if rank == self.rows {
                break;
            }
            let Some(pivot_row) = (rank..self.rows).find(|&r| self.get(r, col)) else {
                continue;
            };
            self.swap_rows(rank, pivot_row);
            for r in 0..self.rows {
                if r != rank && self.get(r, col) {
                    self.add_row(rank, r);
                }
            }
            pivots.push(col);
        }
        pivots
    }
}

/// Solve `A x = b` for several right-hand sides with one elimination.
///
/// `rhs` holds one column per right-hand side and must have as many rows as
/// `a`. For each right-hand side the result is `Some(x)` with the free
/// variables set to zero, or `None` if the system is inconsistent.
pub fn solve_many(a: &MatGf2, rhs: &MatGf2) -> Vec<Option<Vec<bool>>> {
    debug_assert_eq!(a.rows(), rhs.rows());
    let n = a.cols();
    let mut aug = MatGf2::zeros(a.rows(), n + rhs.cols());
    for r in 0..a.rows() {
        for c in 0..n {
            if a.get(r, c) {
                aug.set(r, c, true);
            }
        }
        for k in 0..rhs.cols() {
            if rhs.get(r, k) {
                aug.set(r, n + k, true);
            }
        }
    }

    let pivots = aug.eliminate(n);
    let rank = pivots.len();

    (0..rhs.cols())
        .map(|k| {
            if (rank..aug.rows()).any(|r| aug.get(r, n + k)) {
                return None;
            }
            let mut x = vec![false; n];
            for (row, &col) in pivots.iter().enumerate() {
                x[col] = aug.get(row, n + k);
            }
            Some(x)
        })
        .collect()
}

impl fmt::Debug for MatGf2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MatGf2 {}x{}", self.rows, self.cols)?;
        for r in 0..self.rows {
            let line: String = (0..self.cols)
                .map(|c| if self.get(r, c) { '1' } else { '0' })
                .collect();
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}
