//! Final color quantization: nearest palette entry or per-channel levels.

use crate::palette::Palette;

/// How a working-precision color becomes an output color.
#[derive(Debug, Clone, PartialEq)]
pub enum Quantizer {
    /// Nearest entry of a palette.
    Palette(Palette),
    /// `n` evenly spaced levels per channel (`n >= 2`).
    Levels(u16),
}

impl Quantizer {
    /// Quantize a color in 0..255 space.
    #[inline]
    pub fn quantize(&self, color: [f32; 3]) -> [u8; 3] {
        match self {
            Quantizer::Palette(p) => p.quantize(color).to_array(),
            Quantizer::Levels(n) => {
                let (to_level, from_level) = Self::level_factors(*n);
                color.map(|c| {
                    let level = (c.clamp(0.0, 255.0) * to_level).round();
                    (level * from_level).round() as u8
                })
            }
        }
    }

    /// Multipliers taking a 0..255 channel to a level index and back.
    ///
    /// Products only, so a GPU given the same two factors rounds the same.
    pub fn level_factors(levels: u16) -> (f32, f32) {
        let steps = levels.max(2) as f32 - 1.0;
        (steps / 255.0, 255.0 / steps)
    }

    /// Number of distinct output values per pixel (palette size or levels).
    pub fn output_levels(&self) -> usize {
        match self {
            Quantizer::Palette(p) => p.len(),
            Quantizer::Levels(n) => (*n).max(2) as usize,
        }
    }

    /// Normalized distance between neighboring output levels.
    ///
    /// A single-entry palette has no neighbor; its step is 1.
    pub fn step(&self) -> f32 {
        let n = self.output_levels();
        if n < 2 {
            1.0
        } else {
            1.0 / (n - 1) as f32
        }
    }

    /// `(dark, light)` colors for binary thresholding.
    pub fn binary_pair(&self) -> ([u8; 3], [u8; 3]) {
        match self {
            Quantizer::Palette(p) => (
                p.color(p.darkest()).to_array(),
                p.color(p.brightest()).to_array(),
            ),
            Quantizer::Levels(_) => ([0; 3], [255; 3]),
        }
    }
}
