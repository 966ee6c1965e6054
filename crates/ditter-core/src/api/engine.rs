//! Running a [`Plan`] over a [`PixelBuffer`].
//!
//! [`process`] is the always-available CPU path. [`process_with`] runs the
//! dither step on any [`DitherBackend`], with the adjustment stage on the
//! CPU either way, so two backends given the same plan see identical input.

use super::error::EngineError;
use super::plan::{Plan, Stage};
use crate::buffer::PixelBuffer;
use crate::dither::{diffuse, threshold};
use crate::preprocess::{finish, prepare, WorkingImage};

/// Something that can run the dither step of a plan.
///
/// Implementations receive the adjusted image and return one quantized RGB
/// triple per pixel, row-major.
pub trait DitherBackend {
    /// Short name for logs and error messages.
    fn name(&self) -> &'static str;

    fn dither(&self, image: &WorkingImage, plan: &Plan) -> Result<Vec<[u8; 3]>, EngineError>;
}

/// Reference implementation of every strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl DitherBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn dither(&self, image: &WorkingImage, plan: &Plan) -> Result<Vec<[u8; 3]>, EngineError> {
        Ok(dither_cpu(image, plan))
    }
}

/// The dither step on the CPU.
pub fn dither_cpu(image: &WorkingImage, plan: &Plan) -> Vec<[u8; 3]> {
    let (w, h) = (image.width, image.height);
    let options = plan.options();
    match plan.stage() {
        Stage::Diffuse(kernel) => diffuse(&image.pixels, w, h, kernel, plan.quantizer(), options),
        Stage::Threshold { source, mode } => {
            let field = source.resolve(&image.pixels, w, h, options.seed);
            threshold(&image.pixels, w, h, &field, plan.quantizer(), mode, options)
        }
    }
}

/// Process `source` on the CPU. Always returns a new buffer with the
/// source's dimensions and alpha.
pub fn process(source: &PixelBuffer, plan: &Plan) -> PixelBuffer {
    if source.is_empty() {
        return source.clone();
    }
    let work = prepare(source, plan.adjustments());
    let dithered = dither_cpu(&work, plan);
    finish(source, &work, dithered, plan.adjustments())
}

/// Process `source`, running the dither step on `backend`.
pub fn process_with(
    source: &PixelBuffer,
    plan: &Plan,
    backend: &dyn DitherBackend,
) -> Result<PixelBuffer, EngineError> {
    if source.is_empty() {
        return Ok(source.clone());
    }
    let work = prepare(source, plan.adjustments());
    let dithered = backend.dither(&work, plan)?;
    if dithered.len() != work.pixels.len() {
        return Err(EngineError::Backend {
            backend: backend.name(),
            message: format!(
                "returned {} pixels for a {}x{} image",
                dithered.len(),
                work.width,
                work.height
            ),
        });
    }
    tracing::trace!(backend = backend.name(), pixels = dithered.len(), "dither step done");
    Ok(finish(source, &work, dithered, plan.adjustments()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dither::Quantizer;
    use crate::preprocess::Adjustments;
    use crate::registry::{lookup, Category};

    fn plan(category: Category, id: &str) -> Plan {
        let entry = lookup(category, id).unwrap();
        Plan::new(entry.strategy.clone(), Quantizer::Levels(2))
    }

    struct Broken;

    impl DitherBackend for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn dither(&self, _: &WorkingImage, _: &Plan) -> Result<Vec<[u8; 3]>, EngineError> {
            Ok(vec![[0; 3]])
        }
    }

    #[test]
    fn test_output_keeps_dimensions_and_alpha() {
        let source = PixelBuffer::from_fn(7, 5, |x, y| [(x * 30) as u8, (y * 50) as u8, 90, 17]);
        let plan = plan(Category::ErrorDiffusion, "floyd-steinberg")
            .with_adjustments(Adjustments::new().scale(2));
        let out = process(&source, &plan);
        assert_eq!((out.width(), out.height()), (7, 5));
        assert!(out.pixels().all(|p| p[3] == 17));
    }

    #[test]
    fn test_zero_area_returns_empty() {
        let source = PixelBuffer::new(0, 3, Vec::new()).unwrap();
        let out = process(&source, &plan(Category::Ordered, "bayer-4x4"));
        assert!(out.is_empty());
        assert_eq!(out.height(), 3);
    }

    #[test]
    fn test_process_with_cpu_matches_process() {
        let source = PixelBuffer::from_fn(16, 16, |x, y| [(x * 16) as u8, (y * 16) as u8, 128, 255]);
        let plan = plan(Category::Modulation, "rings");
        assert_eq!(
            process_with(&source, &plan, &CpuBackend).unwrap(),
            process(&source, &plan)
        );
    }

    #[test]
    fn test_short_backend_output_is_an_error() {
        let source = PixelBuffer::filled(4, 4, [10, 10, 10, 255]);
        let err = process_with(&source, &plan(Category::Ordered, "bayer-2x2"), &Broken).unwrap_err();
        assert_eq!(
            err.to_string(),
            "broken backend failed: returned 1 pixels for a 4x4 image"
        );
    }
}
