//! Test images and parameters.

use ditter_core::{AlgorithmSelector, Category, PixelBuffer, ProcessingParams};
use std::time::Duration;

/// How long a test waits for a completion before failing.
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(10);

/// Horizontal grey ramp with a diagonal alpha pattern.
pub fn gradient(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        let v = ((x * 255) / width.max(2).saturating_sub(1)) as u8;
        let alpha = if (x + y) % 5 == 0 { 128 } else { 255 };
        [v, v, v, alpha]
    })
}

pub fn grey(width: u32, height: u32, v: u8) -> PixelBuffer {
    PixelBuffer::filled(width, height, [v, v, v, 255])
}

/// Bayer 4x4: GPU-eligible, so a test accelerator sees it.
pub fn ordered_params() -> ProcessingParams {
    ProcessingParams::new(AlgorithmSelector::builtin(Category::Ordered, "bayer-4x4"))
}

/// Floyd-Steinberg: always on the CPU.
pub fn diffusion_params() -> ProcessingParams {
    ProcessingParams::default()
}
