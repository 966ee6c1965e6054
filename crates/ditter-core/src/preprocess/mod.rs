//! Adjustment stage around the dither step.
//!
//! Before dithering ([`prepare`]):
//!
//! 1. **Scale down** by nearest-neighbor block sampling (`scale`)
//! 2. **Tone curve** via a 256-entry lookup table (contrast, midtones,
//!    highlights, invert)
//! 3. **Blur** with a separable box filter (`blur` radius)
//! 4. **Depth** unsharp mask: `in + (in - blurred) * depth`, clamped
//!
//! After dithering ([`finish`]):
//!
//! 5. **Blend** crossfade between the adjusted image and the dithered one
//! 6. **Scale up** to the source size, reattaching the source alpha
//!
//! The same [`WorkingImage`] feeds every backend, so CPU and GPU results
//! for one plan differ only in the dither step itself.

mod filters;
mod options;
mod scale;
mod tone;

pub use filters::{box_blur, unsharp};
pub use options::Adjustments;
pub use scale::{downscale, scaled_dims, upscale};
pub use tone::ToneCurve;

use crate::buffer::PixelBuffer;

/// Radius of the blur the depth mask subtracts.
const DEPTH_RADIUS: usize = 2;

/// The adjusted, not yet dithered image in working precision (0..255).
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<[f32; 3]>,
}

/// Run steps 1-4 on a source buffer.
pub fn prepare(source: &PixelBuffer, adj: &Adjustments) -> WorkingImage {
    let (src_w, src_h) = (source.width() as usize, source.height() as usize);
    let block = adj.scale.max(1) as usize;
    let (width, height) = scaled_dims(src_w, src_h, block);

    let rgb: Vec<[u8; 3]> = source.pixels().map(|p| [p[0], p[1], p[2]]).collect();
    let small = downscale(&rgb, src_w, src_h, block);

    let mut pixels: Vec<[f32; 3]> = if adj.has_tone_curve() {
        let curve = ToneCurve::new(adj);
        small.iter().map(|p| p.map(|c| curve.apply(c))).collect()
    } else {
        small.iter().map(|p| p.map(f32::from)).collect()
    };

    if adj.blur > 0 {
        pixels = box_blur(&pixels, width, height, adj.blur as usize);
    }
    if adj.depth > 0.0 {
        let blurred = box_blur(&pixels, width, height, DEPTH_RADIUS);
        pixels = unsharp(&pixels, &blurred, adj.depth);
    }

    WorkingImage {
        width,
        height,
        pixels,
    }
}

/// Run steps 5-6: blend, upscale, and restore the source alpha.
pub fn finish(
    source: &PixelBuffer,
    work: &WorkingImage,
    dithered: Vec<[u8; 3]>,
    adj: &Adjustments,
) -> PixelBuffer {
    let blended = if adj.blend > 0.0 {
        let t = adj.blend;
        dithered
            .iter()
            .zip(&work.pixels)
            .map(|(d, a)| {
                [
                    (d[0] as f32 * (1.0 - t) + a[0] * t).round().clamp(0.0, 255.0) as u8,
                    (d[1] as f32 * (1.0 - t) + a[1] * t).round().clamp(0.0, 255.0) as u8,
                    (d[2] as f32 * (1.0 - t) + a[2] * t).round().clamp(0.0, 255.0) as u8,
                ]
            })
            .collect()
    } else {
        dithered
    };

    let (w, h) = (source.width() as usize, source.height() as usize);
    let full = upscale(&blended, w, h, adj.scale.max(1) as usize);
    PixelBuffer::from_rgb_alpha(source.width(), source.height(), &full, &source.alpha())
}
