//! Error diffusion kernel definitions.
//!
//! Built-in kernels are static tables ([`KernelTable`]); user-authored
//! kernels come from a weight grid with an explicit origin cell
//! ([`DiffusionKernel::from_grid`]). Both end up as a validated
//! [`DiffusionKernel`] before any pixel is touched.

use thiserror::Error;

/// Rejection reasons for a diffusion kernel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("kernel divisor must be non-zero")]
    ZeroDivisor,

    #[error("kernel has a tap at its own origin")]
    OriginTap,

    #[error("tap ({dx}, {dy}) points at an already-quantized pixel")]
    NonCausal { dx: i32, dy: i32 },

    #[error("kernel weights sum to {sum}, more than divisor {divisor}")]
    WeightsExceedDivisor { sum: u32, divisor: u32 },

    #[error("kernel weights overflow a 32-bit sum")]
    WeightOverflow,

    #[error("kernel grid is empty or ragged")]
    RaggedGrid,

    #[error("origin ({x}, {y}) lies outside the {width}x{height} grid")]
    OriginOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// One error diffusion target relative to the pixel being quantized.
///
/// `dx` is mirrored on right-to-left rows during serpentine scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tap {
    pub dx: i32,
    pub dy: i32,
    pub weight: u32,
}

impl Tap {
    /// Whether the tap lands on a pixel the scan has not reached yet.
    #[inline]
    pub fn is_causal(&self) -> bool {
        self.dy > 0 || (self.dy == 0 && self.dx > 0)
    }
}

/// A validated error diffusion kernel.
///
/// # Error Propagation
///
/// Each tap receives `error * strength * weight / divisor`. When the weights
/// sum to less than the divisor the remainder is lost; Atkinson relies on
/// this (6/8) for its higher contrast. Taps that fall outside the image are
/// dropped the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffusionKernel {
    taps: Vec<Tap>,
    divisor: u32,
    /// Origin cell in the authored grid, `(0, 0)` for built-in tables.
    origin: (u32, u32),
}

impl DiffusionKernel {
    /// Build a kernel from explicit taps.
    ///
    /// # Errors
    ///
    /// Fails when the divisor is zero, a tap sits at the origin or behind
    /// it in scan order, or the weights sum past the divisor.
    pub fn new(taps: Vec<Tap>, divisor: u32) -> Result<Self, KernelError> {
        let kernel = Self {
            taps,
            divisor,
            origin: (0, 0),
        };
        kernel.validate()?;
        Ok(kernel)
    }

    /// Build a kernel from a row-major weight grid.
    ///
    /// `origin` is the `(x, y)` cell of the pixel being quantized. Zero
    /// cells produce no tap. The divisor defaults to the sum of the
    /// non-origin weights; an all-zero grid becomes an empty kernel, which
    /// the engine runs as a plain threshold pass.
    pub fn from_grid(
        weights: &[Vec<u32>],
        origin: (usize, usize),
        divisor: Option<u32>,
    ) -> Result<Self, KernelError> {
        let height = weights.len();
        let width = weights.first().map_or(0, Vec::len);
        if width == 0 || weights.iter().any(|row| row.len() != width) {
            return Err(KernelError::RaggedGrid);
        }
        let (ox, oy) = origin;
        if ox >= width || oy >= height {
            return Err(KernelError::OriginOutOfBounds {
                x: ox,
                y: oy,
                width,
                height,
            });
        }

        let mut taps = Vec::new();
        for (y, row) in weights.iter().enumerate() {
            for (x, &weight) in row.iter().enumerate() {
                if weight == 0 {
                    continue;
                }
                taps.push(Tap {
                    dx: x as i32 - ox as i32,
                    dy: y as i32 - oy as i32,
                    weight,
                });
            }
        }

        let sum = checked_weight_sum(taps.iter().map(|t| t.weight))?;
        let divisor = match divisor {
            Some(d) => d,
            // All-zero grid: nothing to divide, keep the kernel valid.
            None if sum == 0 => 1,
            None => sum,
        };

        let kernel = Self {
            taps,
            divisor,
            origin: (ox as u32, oy as u32),
        };
        kernel.validate()?;
        Ok(kernel)
    }

    /// Check the causality and weight invariants.
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.divisor == 0 {
            return Err(KernelError::ZeroDivisor);
        }
        for tap in &self.taps {
            if tap.dx == 0 && tap.dy == 0 {
                return Err(KernelError::OriginTap);
            }
            if !tap.is_causal() {
                return Err(KernelError::NonCausal {
                    dx: tap.dx,
                    dy: tap.dy,
                });
            }
        }
        let sum = checked_weight_sum(self.taps.iter().map(|t| t.weight))?;
        if sum > self.divisor {
            return Err(KernelError::WeightsExceedDivisor {
                sum,
                divisor: self.divisor,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn taps(&self) -> &[Tap] {
        &self.taps
    }

    #[inline]
    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    #[inline]
    pub fn origin(&self) -> (u32, u32) {
        self.origin
    }

    /// Total tap weight. Cannot overflow on a validated kernel.
    pub fn weight_sum(&self) -> u32 {
        self.taps.iter().fold(0u32, |acc, t| acc.saturating_add(t.weight))
    }

    /// No taps at all: quantize without diffusing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

fn checked_weight_sum(mut weights: impl Iterator<Item = u32>) -> Result<u32, KernelError> {
    weights.try_fold(0u32, |acc, w| acc.checked_add(w).ok_or(KernelError::WeightOverflow))
}

/// A built-in kernel as a static `(dx, dy, weight)` table.
///
/// # Buffer Sizing
///
/// `max_dy` is how many rows ahead the kernel reaches.
#[derive(Debug, Clone, Copy)]
pub struct KernelTable {
    pub entries: &'static [(i32, i32, u32)],
    pub divisor: u32,
    pub max_dy: usize,
}

impl KernelTable {
    pub fn weight_sum(&self) -> u32 {
        self.entries.iter().map(|&(_, _, w)| w).sum()
    }

    /// Turn the table into a validated kernel.
    pub fn to_kernel(&self) -> Result<DiffusionKernel, KernelError> {
        let taps = self
            .entries
            .iter()
            .map(|&(dx, dy, weight)| Tap { dx, dy, weight })
            .collect();
        DiffusionKernel::new(taps, self.divisor)
    }
}

/// Floyd-Steinberg, 100% propagation (16/16).
///
/// ```text
///        X   7
///    3   5   1
/// ```
pub const FLOYD_STEINBERG: KernelTable = KernelTable {
    entries: &[(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)],
    divisor: 16,
    max_dy: 1,
};

/// "False" Floyd-Steinberg, a three-tap shortcut (8/8).
///
/// ```text
///    X   3
///    3   2
/// ```
pub const FALSE_FLOYD_STEINBERG: KernelTable = KernelTable {
    entries: &[(1, 0, 3), (0, 1, 3), (1, 1, 2)],
    divisor: 8,
    max_dy: 1,
};

/// Jarvis-Judice-Ninke, 12 neighbors over 3 rows (48/48).
///
/// ```text
///            X   7   5
///    3   5   7   5   3
///    1   3   5   3   1
/// ```
pub const JARVIS_JUDICE_NINKE: KernelTable = KernelTable {
    entries: &[
        (1, 0, 7),
        (2, 0, 5),
        (-2, 1, 3),
        (-1, 1, 5),
        (0, 1, 7),
        (1, 1, 5),
        (2, 1, 3),
        (-2, 2, 1),
        (-1, 2, 3),
        (0, 2, 5),
        (1, 2, 3),
        (2, 2, 1),
    ],
    divisor: 48,
    max_dy: 2,
};

/// Stucki: JJN layout with heavier center weights (42/42).
///
/// ```text
///            X   8   4
///    2   4   8   4   2
///    1   2   4   2   1
/// ```
pub const STUCKI: KernelTable = KernelTable {
    entries: &[
        (1, 0, 8),
        (2, 0, 4),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 8),
        (1, 1, 4),
        (2, 1, 2),
        (-2, 2, 1),
        (-1, 2, 2),
        (0, 2, 4),
        (1, 2, 2),
        (2, 2, 1),
    ],
    divisor: 42,
    max_dy: 2,
};

/// Burkes: two-row Stucki (32/32).
///
/// ```text
///            X   8   4
///    2   4   8   4   2
/// ```
pub const BURKES: KernelTable = KernelTable {
    entries: &[
        (1, 0, 8),
        (2, 0, 4),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 8),
        (1, 1, 4),
        (2, 1, 2),
    ],
    divisor: 32,
    max_dy: 1,
};

/// Sierra (Sierra-3), 10 neighbors (32/32).
///
/// ```text
///            X   5   3
///    2   4   5   4   2
///        2   3   2
/// ```
pub const SIERRA: KernelTable = KernelTable {
    entries: &[
        (1, 0, 5),
        (2, 0, 3),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 5),
        (1, 1, 4),
        (2, 1, 2),
        (-1, 2, 2),
        (0, 2, 3),
        (1, 2, 2),
    ],
    divisor: 32,
    max_dy: 2,
};

/// Sierra two-row (16/16).
///
/// ```text
///            X   4   3
///    1   2   3   2   1
/// ```
pub const SIERRA_TWO_ROW: KernelTable = KernelTable {
    entries: &[
        (1, 0, 4),
        (2, 0, 3),
        (-2, 1, 1),
        (-1, 1, 2),
        (0, 1, 3),
        (1, 1, 2),
        (2, 1, 1),
    ],
    divisor: 16,
    max_dy: 1,
};

/// Sierra Lite (4/4).
///
/// ```text
///    X   2
///    1   1
/// ```
pub const SIERRA_LITE: KernelTable = KernelTable {
    entries: &[(1, 0, 2), (-1, 1, 1), (0, 1, 1)],
    divisor: 4,
    max_dy: 1,
};

/// Atkinson, 75% propagation (6/8).
///
/// The lost quarter of the error gives the characteristic high-contrast
/// look with blown highlights and deep shadows.
///
/// ```text
///        X   1   1
///    1   1   1
///        1
/// ```
pub const ATKINSON: KernelTable = KernelTable {
    entries: &[
        (1, 0, 1),
        (2, 0, 1),
        (-1, 1, 1),
        (0, 1, 1),
        (1, 1, 1),
        (0, 2, 1),
    ],
    divisor: 8,
    max_dy: 2,
};

/// Stevenson-Arce, a sparse hexagonal-grid kernel (200/200).
///
/// ```text
///                        X       32
///    12      26      30      16
///        12      26      12
///     5      12      12       5
/// ```
pub const STEVENSON_ARCE: KernelTable = KernelTable {
    entries: &[
        (2, 0, 32),
        (-3, 1, 12),
        (-1, 1, 26),
        (1, 1, 30),
        (3, 1, 16),
        (-2, 2, 12),
        (0, 2, 26),
        (2, 2, 12),
        (-3, 3, 5),
        (-1, 3, 12),
        (1, 3, 12),
        (3, 3, 5),
    ],
    divisor: 200,
    max_dy: 3,
};

/// Shiau-Fan (8/8).
///
/// ```text
///            X   4
///    1   1   2
/// ```
pub const SHIAU_FAN: KernelTable = KernelTable {
    entries: &[(1, 0, 4), (-2, 1, 1), (-1, 1, 1), (0, 1, 2)],
    divisor: 8,
    max_dy: 1,
};

/// Shiau-Fan 2, wider lower row (16/16).
///
/// ```text
///                X   8
///    1   1   2   4
/// ```
pub const SHIAU_FAN_2: KernelTable = KernelTable {
    entries: &[(1, 0, 8), (-3, 1, 1), (-2, 1, 1), (-1, 1, 2), (0, 1, 4)],
    divisor: 16,
    max_dy: 1,
};
