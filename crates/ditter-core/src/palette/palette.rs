//! Palette struct with nearest-color matching.

use super::error::PaletteError;
use crate::color::Rgb;

/// Largest palette the quantizer accepts (indices fit in a `u8`).
pub const MAX_PALETTE_LEN: usize = 256;

/// An ordered list of RGB colors used for quantization.
///
/// Order only matters for display (swatch order) and for tie-breaking:
/// when two entries are equally close to a pixel the one with the lower
/// index wins.
///
/// The darkest and brightest entries are precomputed because binary
/// thresholding picks between exactly those two.
///
/// # Example
///
/// ```
/// use ditter_core::{Palette, Rgb};
///
/// let palette = Palette::new(vec![Rgb::BLACK, Rgb::WHITE]).unwrap();
/// assert_eq!(palette.nearest([200.0, 200.0, 200.0]), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
    darkest: usize,
    brightest: usize,
}

impl Palette {
    /// Create a palette from an ordered list of colors.
    ///
    /// # Errors
    ///
    /// - [`PaletteError::Empty`] for an empty list
    /// - [`PaletteError::TooLarge`] for more than 256 entries
    pub fn new(colors: Vec<Rgb>) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::Empty);
        }
        if colors.len() > MAX_PALETTE_LEN {
            return Err(PaletteError::TooLarge { len: colors.len() });
        }

        // First occurrence wins on equal luma, matching nearest-color ties.
        let mut darkest = 0;
        let mut brightest = 0;
        for (i, c) in colors.iter().enumerate() {
            if c.luma() < colors[darkest].luma() {
                darkest = i;
            }
            if c.luma() > colors[brightest].luma() {
                brightest = i;
            }
        }

        Ok(Self {
            colors,
            darkest,
            brightest,
        })
    }

    /// Create a palette from hex strings such as `"#ff0000"` or `"f00"`.
    pub fn from_hex<S: AsRef<str>>(hex: &[S]) -> Result<Self, PaletteError> {
        let colors = hex
            .iter()
            .enumerate()
            .map(|(index, s)| {
                s.as_ref()
                    .parse::<Rgb>()
                    .map_err(|source| PaletteError::ParseColor { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    /// `n` evenly spaced grey levels from black to white.
    ///
    /// `n` is clamped to `2..=256`.
    pub fn grayscale(n: usize) -> Self {
        let n = n.clamp(2, MAX_PALETTE_LEN);
        let colors = (0..n)
            .map(|i| {
                let v = (i as f32 * 255.0 / (n - 1) as f32).round() as u8;
                Rgb::new(v, v, v)
            })
            .collect();
        Self {
            colors,
            darkest: 0,
            brightest: n - 1,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always `false`: empty palettes are rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[inline]
    pub fn color(&self, idx: usize) -> Rgb {
        self.colors[idx]
    }

    #[inline]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Index of the entry with the lowest luma.
    #[inline]
    pub fn darkest(&self) -> usize {
        self.darkest
    }

    /// Index of the entry with the highest luma.
    #[inline]
    pub fn brightest(&self) -> usize {
        self.brightest
    }

    /// Find the nearest palette entry to a color in 0..255 space.
    ///
    /// Squared Euclidean RGB distance; the first entry with the minimal
    /// distance wins. Linear scan is fine for the common palette sizes
    /// (2-32 entries) and stays exact for larger ones.
    #[inline]
    pub fn nearest(&self, color: [f32; 3]) -> usize {
        let mut best_idx = 0;
        let mut best_dist = f32::MAX;

        for (i, c) in self.colors.iter().enumerate() {
            let dist = c.distance_squared(color);
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
            }
        }

        best_idx
    }

    /// Quantize a color to the nearest palette entry.
    #[inline]
    pub fn quantize(&self, color: [f32; 3]) -> Rgb {
        self.colors[self.nearest(color)]
    }

    /// Whether every entry is a neutral grey.
    pub fn is_greyscale(&self) -> bool {
        self.colors.iter().all(|c| c.r == c.g && c.g == c.b)
    }
}
