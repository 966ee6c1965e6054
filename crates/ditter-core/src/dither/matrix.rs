//! Threshold matrices for ordered dithering.
//!
//! A matrix holds integer ranks. Built-in matrices (Bayer, clustered dot,
//! halftone screens) are permutations of `0..size*size` and normalize to
//! `(rank + 0.5) / (size*size)`. User-authored matrices may hold any
//! non-negative ranks; they are divided by `max(size*size, max_rank + 1)`
//! so the result always stays in `[0, 1)`.

use thiserror::Error;

/// Largest accepted matrix side.
pub const MAX_MATRIX_SIZE: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error("threshold matrix is empty")]
    Empty,

    #[error("threshold matrix must be square, got {rows} rows with a {cols}-wide row")]
    NotSquare { rows: usize, cols: usize },

    #[error("threshold matrix side {size} exceeds 64")]
    TooLarge { size: usize },
}

/// A square grid of threshold ranks, tiled over the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdMatrix {
    size: u32,
    values: Vec<u32>,
}

impl ThresholdMatrix {
    /// Build a matrix from rows of ranks.
    pub fn from_rows(rows: &[Vec<u32>]) -> Result<Self, MatrixError> {
        let size = rows.len();
        if size == 0 {
            return Err(MatrixError::Empty);
        }
        if size > MAX_MATRIX_SIZE {
            return Err(MatrixError::TooLarge { size });
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != size) {
            return Err(MatrixError::NotSquare {
                rows: size,
                cols: bad.len(),
            });
        }
        Ok(Self {
            size: size as u32,
            values: rows.iter().flatten().copied().collect(),
        })
    }

    /// Recursive Bayer matrix of side `2^order` (`order` clamped to 1..=4).
    ///
    /// ```text
    /// M(2n) = | 4M     4M + 2 |
    ///         | 4M + 3 4M + 1 |
    /// ```
    pub fn bayer(order: u32) -> Self {
        let order = order.clamp(1, 4);
        let mut size = 1usize;
        let mut values = vec![0u32];
        for _ in 0..order {
            let next = size * 2;
            let mut grown = vec![0u32; next * next];
            for y in 0..size {
                for x in 0..size {
                    let v = 4 * values[y * size + x];
                    grown[y * next + x] = v;
                    grown[y * next + x + size] = v + 2;
                    grown[(y + size) * next + x] = v + 3;
                    grown[(y + size) * next + x + size] = v + 1;
                }
            }
            size = next;
            values = grown;
        }
        Self {
            size: size as u32,
            values,
        }
    }

    /// Rank the cells of a `size` grid by a spot function.
    ///
    /// `spot(u, v)` is evaluated at each cell center with `u, v` in
    /// `(-1, 1)`. Higher spot values get higher ranks, so they turn dark
    /// first as the input darkens. Ties keep row-major order.
    pub fn from_spot(size: u32, spot: impl Fn(f32, f32) -> f32) -> Self {
        let n = size.max(1) as usize;
        let mut cells: Vec<(usize, f32)> = (0..n * n)
            .map(|i| {
                let u = ((i % n) as f32 + 0.5) / n as f32 * 2.0 - 1.0;
                let v = ((i / n) as f32 + 0.5) / n as f32 * 2.0 - 1.0;
                (i, spot(u, v))
            })
            .collect();
        cells.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut values = vec![0u32; n * n];
        for (rank, (i, _)) in cells.into_iter().enumerate() {
            values[i] = rank as u32;
        }
        Self {
            size: n as u32,
            values,
        }
    }

    /// Round dot growing from the cell center.
    pub fn dot(size: u32) -> Self {
        Self::from_spot(size, |u, v| -(u * u + v * v))
    }

    /// Diamond (45° square) dot.
    pub fn diamond(size: u32) -> Self {
        Self::from_spot(size, |u, v| -(u.abs() + v.abs()))
    }

    /// Horizontal lines thickening from the cell's center row.
    pub fn line(size: u32) -> Self {
        Self::from_spot(size, |u, v| -v.abs() - u.abs() * 0.01)
    }

    /// Plus-shaped cross.
    pub fn cross(size: u32) -> Self {
        Self::from_spot(size, |u, v| -u.abs().min(v.abs()) - (u * u + v * v) * 0.01)
    }

    /// Elongated elliptical dot.
    pub fn ellipse(size: u32) -> Self {
        Self::from_spot(size, |u, v| -(u * u * 0.5 + v * v * 1.5))
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Thresholds in `[0, 1)`, row-major.
    pub fn normalized(&self) -> Vec<f32> {
        let cells = self.size * self.size;
        let max = self.values.iter().copied().max().unwrap_or(0);
        let denom = cells.max(max.saturating_add(1)) as f32;
        self.values
            .iter()
            .map(|&v| (v as f32 + 0.5) / denom)
            .collect()
    }

    /// True when the ranks are exactly `0..size*size` in some order.
    pub fn is_permutation(&self) -> bool {
        let mut seen = vec![false; self.values.len()];
        for &v in &self.values {
            match seen.get_mut(v as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }
}
