//! Ordered, pattern and modulation dithering.
//!
//! Each pixel is compared against a threshold from a [`ThresholdField`]
//! and quantized on its own, with no dependency on neighbors' output.
//! Sources that need to look at the whole image first (Otsu, adaptive
//! mean, stippling) are resolved into a per-image field by a CPU pre-pass.

use super::matrix::ThresholdMatrix;
use super::options::DitherOptions;
use super::procedural::{hash, Procedural};
use super::quantizer::Quantizer;
use crate::color::luma;

/// Whether thresholding picks between two colors or perturbs and quantizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdMode {
    /// Binary for a palette of at most two colors, spread otherwise.
    /// Level quantization always spreads, so each channel keeps its own
    /// levels.
    #[default]
    Auto,
    /// Always binary, whatever the palette size.
    Binary,
}

impl ThresholdMode {
    /// Whether pixels pick between the quantizer's darkest and brightest
    /// colors by luma instead of being quantized per channel.
    pub fn is_binary(self, quantizer: &Quantizer) -> bool {
        match self {
            ThresholdMode::Binary => true,
            ThresholdMode::Auto => {
                matches!(quantizer, Quantizer::Palette(p) if p.len() <= 2)
            }
        }
    }
}

/// Where per-pixel thresholds come from, before any image is seen.
#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdSource {
    /// Tiled rank matrix.
    Matrix(ThresholdMatrix),
    /// Closed-form function of position.
    Procedural(Procedural),
    /// The same threshold everywhere.
    Constant(f32),
    /// Global threshold maximizing between-class luma variance.
    Otsu,
    /// Local mean luma in a `(2r+1)²` window, minus `offset`.
    Adaptive { radius: u32, offset: f32 },
    /// Hash-seeded dots with a minimum spacing, placed in scan order.
    Stipple { density: f32, spacing: u32 },
}

impl ThresholdSource {
    /// Needs a pass over the whole image before thresholding can start.
    pub fn is_per_image(&self) -> bool {
        matches!(
            self,
            ThresholdSource::Otsu | ThresholdSource::Adaptive { .. } | ThresholdSource::Stipple { .. }
        )
    }

    /// Turn the source into a field for one image.
    pub fn resolve(
        &self,
        image: &[[f32; 3]],
        width: usize,
        height: usize,
        seed: u32,
    ) -> ThresholdField {
        match self {
            ThresholdSource::Matrix(m) => ThresholdField::Tiled {
                size: m.size() as usize,
                values: m.normalized(),
            },
            ThresholdSource::Procedural(p) => ThresholdField::Procedural(*p),
            ThresholdSource::Constant(t) => ThresholdField::Constant(*t),
            ThresholdSource::Otsu => {
                let t = otsu_threshold(&luma_plane(image));
                tracing::debug!(threshold = t, "otsu threshold");
                ThresholdField::Constant(t)
            }
            ThresholdSource::Adaptive { radius, offset } => ThresholdField::PerImage(
                adaptive_field(&luma_plane(image), width, height, *radius as usize, *offset),
            ),
            ThresholdSource::Stipple { density, spacing } => ThresholdField::PerImage(stipple_field(
                &luma_plane(image),
                width,
                height,
                *density,
                *spacing as usize,
                seed,
            )),
        }
    }
}

/// Per-pixel thresholds ready for one image.
#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdField {
    Tiled { size: usize, values: Vec<f32> },
    Procedural(Procedural),
    Constant(f32),
    /// One value per pixel, row-major. Values may fall outside `[0, 1)`
    /// to force a pixel light (`< 0`) or dark (`>= 1`).
    PerImage(Vec<f32>),
}

impl ThresholdField {
    #[inline]
    pub fn at(&self, x: usize, y: usize, width: usize, height: usize) -> f32 {
        match self {
            ThresholdField::Tiled { size, values } => values[(y % size) * size + (x % size)],
            ThresholdField::Procedural(p) => p.eval(x as u32, y as u32, width as u32, height as u32),
            ThresholdField::Constant(t) => *t,
            ThresholdField::PerImage(values) => values[y * width + x],
        }
    }

    /// Evaluate every pixel's threshold into a [`ThresholdField::PerImage`].
    pub fn to_per_pixel(&self, width: usize, height: usize) -> ThresholdField {
        if let ThresholdField::PerImage(values) = self {
            return ThresholdField::PerImage(values.clone());
        }
        let mut values = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                values.push(self.at(x, y, width, height));
            }
        }
        ThresholdField::PerImage(values)
    }
}

/// Threshold every pixel of `image` (0..255 channels, row-major).
///
/// Binary mode: a pixel becomes the quantizer's light color iff its
/// normalized luma is greater than `t + threshold_bias`, otherwise the dark
/// color. Spread mode: each channel is shifted by
/// `(t - 0.5) * spread * step` before quantization.
pub fn threshold(
    image: &[[f32; 3]],
    width: usize,
    height: usize,
    field: &ThresholdField,
    quantizer: &Quantizer,
    mode: ThresholdMode,
    options: &DitherOptions,
) -> Vec<[u8; 3]> {
    let binary = mode.is_binary(quantizer);
    let (dark, light) = quantizer.binary_pair();
    let offset_scale = options.spread * quantizer.step() * 255.0;

    let mut output = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let pixel = image[y * width + x];
            let t = field.at(x, y, width, height);
            if binary {
                let l = luma(pixel) / 255.0;
                output.push(if l > t + options.threshold_bias {
                    light
                } else {
                    dark
                });
            } else {
                let offset = (t - 0.5) * offset_scale;
                output.push(quantizer.quantize(pixel.map(|c| c + offset)));
            }
        }
    }
    output
}

fn luma_plane(image: &[[f32; 3]]) -> Vec<f32> {
    image.iter().map(|&p| luma(p) / 255.0).collect()
}

/// Otsu's method on a 256-bin luma histogram, as a normalized threshold.
pub(crate) fn otsu_threshold(luma: &[f32]) -> f32 {
    let mut hist = [0u64; 256];
    for &l in luma {
        hist[(l.clamp(0.0, 1.0) * 255.0).round() as usize] += 1;
    }
    let total = luma.len() as f64;
    if total == 0.0 {
        return 0.5;
    }
    let sum_all: f64 = hist.iter().enumerate().map(|(i, &c)| i as f64 * c as f64).sum();

    let mut best_k = 127usize;
    let mut best_var = -1.0f64;
    let mut w0 = 0.0f64;
    let mut sum0 = 0.0f64;
    for (k, &count) in hist.iter().enumerate() {
        w0 += count as f64;
        sum0 += k as f64 * count as f64;
        let w1 = total - w0;
        if w0 == 0.0 || w1 == 0.0 {
            continue;
        }
        let m0 = sum0 / w0;
        let m1 = (sum_all - sum0) / w1;
        let var = w0 * w1 * (m0 - m1) * (m0 - m1);
        if var > best_var {
            best_var = var;
            best_k = k;
        }
    }
    // Bins 0..=k are dark.
    (best_k as f32 + 0.5) / 255.0
}

/// Local box mean via a summed-area table, minus `offset`.
fn adaptive_field(luma: &[f32], width: usize, height: usize, radius: usize, offset: f32) -> Vec<f32> {
    let stride = width + 1;
    let mut sat = vec![0.0f64; stride * (height + 1)];
    for y in 0..height {
        let mut row = 0.0f64;
        for x in 0..width {
            row += luma[y * width + x] as f64;
            sat[(y + 1) * stride + x + 1] = sat[y * stride + x + 1] + row;
        }
    }

    let mut field = Vec::with_capacity(width * height);
    for y in 0..height {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius + 1).min(height);
        for x in 0..width {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius + 1).min(width);
            let sum = sat[y1 * stride + x1] - sat[y0 * stride + x1] - sat[y1 * stride + x0]
                + sat[y0 * stride + x0];
            let area = ((y1 - y0) * (x1 - x0)) as f64;
            field.push((sum / area) as f32 - offset);
        }
    }
    field
}

/// Dots where a hash candidate survives rejection against earlier dots.
///
/// A pixel is a candidate when `hash < (1 - luma) * density`; it becomes a
/// dot only if no accepted dot lies within `spacing` (Chebyshev distance)
/// among pixels already visited. Dots get threshold 1 (always dark), the
/// rest -1 (always light).
fn stipple_field(
    luma: &[f32],
    width: usize,
    height: usize,
    density: f32,
    spacing: usize,
    seed: u32,
) -> Vec<f32> {
    let mut dots = vec![false; width * height];
    for y in 0..height {
        for x in 0..width {
            let darkness = 1.0 - luma[y * width + x];
            if hash(x as u32, y as u32, seed) >= darkness * density {
                continue;
            }
            let blocked = (y.saturating_sub(spacing)..=y).any(|ny| {
                let x_end = if ny == y { x } else { (x + spacing + 1).min(width) };
                (x.saturating_sub(spacing)..x_end).any(|nx| dots[ny * width + nx])
            });
            if !blocked {
                dots[y * width + x] = true;
            }
        }
    }
    dots.into_iter().map(|d| if d { 1.0 } else { -1.0 }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Palette;

    fn bw() -> Quantizer {
        Quantizer::Palette(Palette::grayscale(2))
    }

    fn bayer4() -> ThresholdField {
        ThresholdSource::Matrix(ThresholdMatrix::bayer(2)).resolve(&[], 0, 0, 0)
    }

    #[test]
    fn test_bayer_mid_grey_is_half_white() {
        let image = vec![[128.0; 3]; 16];
        let out = threshold(&image, 4, 4, &bayer4(), &bw(), ThresholdMode::Auto, &DitherOptions::new());
        let white = out.iter().filter(|p| **p == [255; 3]).count();
        assert_eq!(white, 8, "128/255 sits above exactly 8 of 16 Bayer thresholds");
    }

    #[test]
    fn test_binary_is_idempotent() {
        let image: Vec<[f32; 3]> = (0..64).map(|i| [(i * 4) as f32; 3]).collect();
        let field = bayer4();
        let opts = DitherOptions::new();
        let once = threshold(&image, 8, 8, &field, &bw(), ThresholdMode::Auto, &opts);
        let again_in: Vec<[f32; 3]> = once.iter().map(|p| p.map(f32::from)).collect();
        let twice = threshold(&again_in, 8, 8, &field, &bw(), ThresholdMode::Auto, &opts);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_bias_darkens() {
        let image = vec![[128.0; 3]; 16];
        let opts = DitherOptions::new().threshold_bias(0.25);
        let out = threshold(&image, 4, 4, &bayer4(), &bw(), ThresholdMode::Auto, &opts);
        let white = out.iter().filter(|p| **p == [255; 3]).count();
        assert!(white < 8, "positive bias should darken, got {white} white");
    }

    #[test]
    fn test_spread_mode_with_levels() {
        // With spread 0 the threshold has no effect: plain level quantization.
        let image = vec![[100.0; 3]; 16];
        let opts = DitherOptions::new().spread(0.0);
        let out = threshold(&image, 4, 4, &bayer4(), &Quantizer::Levels(4), ThresholdMode::Auto, &opts);
        assert!(out.iter().all(|p| *p == [85; 3]));

        // With full spread a value between levels splits across the two.
        let out = threshold(
            &image,
            4,
            4,
            &bayer4(),
            &Quantizer::Levels(4),
            ThresholdMode::Auto,
            &DitherOptions::new(),
        );
        assert!(out.iter().any(|p| *p == [85; 3]));
        assert!(out.iter().any(|p| *p == [170; 3]));
    }

    #[test]
    fn test_two_levels_keep_color() {
        let image = vec![[255.0, 0.0, 0.0]; 16];
        let out = threshold(
            &image,
            4,
            4,
            &bayer4(),
            &Quantizer::Levels(2),
            ThresholdMode::Auto,
            &DitherOptions::new(),
        );
        assert!(out.iter().all(|p| *p == [255, 0, 0]), "got {out:?}");
    }

    #[test]
    fn test_auto_mode_binary_only_for_two_color_palettes() {
        assert!(ThresholdMode::Auto.is_binary(&bw()));
        assert!(!ThresholdMode::Auto.is_binary(&Quantizer::Levels(2)));
        assert!(!ThresholdMode::Auto.is_binary(&Quantizer::Palette(Palette::grayscale(4))));
        assert!(ThresholdMode::Binary.is_binary(&Quantizer::Levels(8)));
    }

    #[test]
    fn test_forced_binary_with_large_palette() {
        let image = vec![[128.0; 3]; 16];
        let q = Quantizer::Palette(Palette::grayscale(16));
        let out = threshold(&image, 4, 4, &bayer4(), &q, ThresholdMode::Binary, &DitherOptions::new());
        assert!(out.iter().all(|p| *p == [0; 3] || *p == [255; 3]));
    }

    #[test]
    fn test_per_pixel_field_matches_lookup() {
        let field = ThresholdField::Procedural(Procedural::Spiral { period: 5.0 });
        let ThresholdField::PerImage(values) = field.to_per_pixel(7, 3) else {
            panic!("expected a per-pixel field");
        };
        assert_eq!(values.len(), 21);
        for y in 0..3 {
            for x in 0..7 {
                assert_eq!(values[y * 7 + x], field.at(x, y, 7, 3));
            }
        }
    }

    #[test]
    fn test_otsu_splits_bimodal_histogram() {
        let mut luma = vec![0.1f32; 100];
        luma.extend(vec![0.9f32; 100]);
        let t = otsu_threshold(&luma);
        assert!(t > 0.1 && t < 0.9, "threshold {t} should separate the modes");
    }

    #[test]
    fn test_adaptive_field_follows_local_mean() {
        let luma = vec![0.5f32; 25];
        let field = adaptive_field(&luma, 5, 5, 2, 0.1);
        assert!(field.iter().all(|&t| (t - 0.4).abs() < 1e-6));
    }

    #[test]
    fn test_stipple_respects_spacing() {
        let luma = vec![0.0f32; 32 * 32];
        let field = stipple_field(&luma, 32, 32, 1.0, 2, 5);
        let dots: Vec<(usize, usize)> = (0..32 * 32)
            .filter(|&i| field[i] > 0.0)
            .map(|i| (i % 32, i / 32))
            .collect();
        assert!(!dots.is_empty());
        for (i, a) in dots.iter().enumerate() {
            for b in &dots[i + 1..] {
                let d = a.0.abs_diff(b.0).max(a.1.abs_diff(b.1));
                assert!(d > 2, "dots {a:?} and {b:?} are too close");
            }
        }
    }

    #[test]
    fn test_stipple_leaves_white_empty() {
        let luma = vec![1.0f32; 64];
        let field = stipple_field(&luma, 8, 8, 1.0, 1, 5);
        assert!(field.iter().all(|&t| t < 0.0));
    }
}
