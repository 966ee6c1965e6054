//! Error diffusion.
//!
//! The scan is sequential: each pixel's decision depends on error pushed
//! forward from every pixel before it. Error accumulates in a full-image
//! `f32` buffer rather than a rolling window of rows, so kernels of any
//! reach work unchanged. Values are rounded exactly once, when quantized.

use super::kernel::DiffusionKernel;
use super::options::DitherOptions;
use super::quantizer::Quantizer;

/// Full-image accumulator for diffused error, one RGB triple per pixel.
#[derive(Debug)]
pub struct ErrorBuffer {
    errors: Vec<[f32; 3]>,
    width: usize,
    height: usize,
}

impl ErrorBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            errors: vec![[0.0; 3]; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> [f32; 3] {
        self.errors[y * self.width + x]
    }

    /// Add error at a signed position; anything outside the image is dropped.
    #[inline]
    pub fn add(&mut self, x: i64, y: i64, error: [f32; 3]) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let cell = &mut self.errors[y as usize * self.width + x as usize];
        for c in 0..3 {
            cell[c] += error[c];
        }
    }
}

/// Dither `image` (0..255 channels, row-major) with an error diffusion kernel.
///
/// Odd rows run right-to-left with `dx` mirrored when
/// [`DitherOptions::serpentine`] is set. Each tap receives
/// `error * strength * weight / divisor`.
pub fn diffuse(
    image: &[[f32; 3]],
    width: usize,
    height: usize,
    kernel: &DiffusionKernel,
    quantizer: &Quantizer,
    options: &DitherOptions,
) -> Vec<[u8; 3]> {
    let mut output = vec![[0u8; 3]; width * height];
    let mut errors = ErrorBuffer::new(width, height);
    let scale = options.strength / kernel.divisor() as f32;

    for y in 0..height {
        let reverse = options.serpentine && y % 2 == 1;

        for i in 0..width {
            let x = if reverse { width - 1 - i } else { i };
            let idx = y * width + x;

            let carried = errors.get(x, y);
            let value = [
                image[idx][0] + carried[0],
                image[idx][1] + carried[1],
                image[idx][2] + carried[2],
            ];
            let quantized = quantizer.quantize(value);
            output[idx] = quantized;

            let error = [
                (value[0] - quantized[0] as f32) * scale,
                (value[1] - quantized[1] as f32) * scale,
                (value[2] - quantized[2] as f32) * scale,
            ];
            if error == [0.0; 3] {
                continue;
            }

            for tap in kernel.taps() {
                let dx = if reverse { -tap.dx } else { tap.dx };
                let w = tap.weight as f32;
                errors.add(
                    x as i64 + dx as i64,
                    y as i64 + tap.dy as i64,
                    [error[0] * w, error[1] * w, error[2] * w],
                );
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dither::kernel::{Tap, ATKINSON, FLOYD_STEINBERG};
    use crate::palette::Palette;

    fn bw() -> Quantizer {
        Quantizer::Palette(Palette::grayscale(2))
    }

    fn grey(v: f32, n: usize) -> Vec<[f32; 3]> {
        vec![[v; 3]; n]
    }

    fn light_fraction(out: &[[u8; 3]]) -> f32 {
        out.iter().filter(|p| p[0] == 255).count() as f32 / out.len() as f32
    }

    #[test]
    fn test_mid_grey_gives_half_coverage() {
        let kernel = FLOYD_STEINBERG.to_kernel().unwrap();
        let out = diffuse(&grey(127.5, 64 * 64), 64, 64, &kernel, &bw(), &DitherOptions::new());
        let frac = light_fraction(&out);
        assert!(
            (frac - 0.5).abs() < 0.02,
            "expected ~50% white, got {:.1}%",
            frac * 100.0
        );
    }

    #[test]
    fn test_output_only_contains_palette_colors() {
        let kernel = FLOYD_STEINBERG.to_kernel().unwrap();
        let image: Vec<[f32; 3]> = (0..32 * 32).map(|i| [(i % 256) as f32; 3]).collect();
        let out = diffuse(&image, 32, 32, &kernel, &bw(), &DitherOptions::new());
        assert!(out.iter().all(|p| *p == [0; 3] || *p == [255; 3]));
    }

    #[test]
    fn test_atkinson_loses_error_in_light_greys() {
        // With 25% of the error discarded, light grey saturates to white
        // more often than under a full-propagation kernel.
        let fs = FLOYD_STEINBERG.to_kernel().unwrap();
        let atk = ATKINSON.to_kernel().unwrap();
        let image = grey(220.0, 48 * 48);
        let opts = DitherOptions::new();
        let fs_white = light_fraction(&diffuse(&image, 48, 48, &fs, &bw(), &opts));
        let atk_white = light_fraction(&diffuse(&image, 48, 48, &atk, &bw(), &opts));
        assert!(
            atk_white > fs_white,
            "Atkinson ({atk_white}) should be brighter than FS ({fs_white})"
        );
    }

    #[test]
    fn test_zero_strength_is_plain_quantization() {
        let kernel = FLOYD_STEINBERG.to_kernel().unwrap();
        let image = grey(100.0, 16);
        let out = diffuse(
            &image,
            4,
            4,
            &kernel,
            &bw(),
            &DitherOptions::new().strength(0.0),
        );
        assert!(out.iter().all(|p| *p == [0; 3]));
    }

    #[test]
    fn test_single_pixel_drops_all_error() {
        let kernel = FLOYD_STEINBERG.to_kernel().unwrap();
        let out = diffuse(&grey(200.0, 1), 1, 1, &kernel, &bw(), &DitherOptions::new());
        assert_eq!(out, vec![[255; 3]]);
    }

    #[test]
    fn test_long_reach_taps_use_full_buffer() {
        // A kernel reaching three rows down must not panic on short images.
        let taps = vec![Tap {
            dx: 0,
            dy: 3,
            weight: 1,
        }];
        let kernel = DiffusionKernel::new(taps, 1).unwrap();
        let out = diffuse(&grey(100.0, 8), 2, 4, &kernel, &bw(), &DitherOptions::new());
        // Row 0 goes black and pushes +100 onto row 3, lifting it to white.
        assert_eq!(out[0], [0; 3]);
        assert_eq!(out[6], [255; 3]);
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn test_levels_quantizer_limits_values() {
        let kernel = FLOYD_STEINBERG.to_kernel().unwrap();
        let image: Vec<[f32; 3]> = (0..256).map(|i| [i as f32, 255.0 - i as f32, 60.0]).collect();
        let out = diffuse(
            &image,
            16,
            16,
            &kernel,
            &Quantizer::Levels(3),
            &DitherOptions::new(),
        );
        for p in out {
            for c in p {
                assert!(matches!(c, 0 | 128 | 255), "unexpected level {c}");
            }
        }
    }
}
