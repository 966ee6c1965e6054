#![allow(clippy::needless_range_loop, clippy::module_inception)]

//! ditter-core: dithering algorithms, palettes and the CPU engine
//!
//! Turns RGBA8 rasters into palette-quantized ones with error diffusion,
//! ordered/threshold, pattern and modulation dithering, including
//! user-authored diffusion kernels and threshold matrices.
//!
//! # Quick Start
//!
//! ```
//! use ditter_core::{process, Category, AlgorithmSelector, PixelBuffer, Plan, ProcessingParams};
//!
//! let params = ProcessingParams::new(AlgorithmSelector::builtin(Category::Ordered, "bayer-4x4"));
//! let plan = Plan::from_params(&params).unwrap();
//!
//! let source = PixelBuffer::filled(8, 8, [128, 128, 128, 255]);
//! let out = process(&source, &plan);
//!
//! assert_eq!((out.width(), out.height()), (8, 8));
//! assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
//! ```
//!
//! # Pipeline
//!
//! ```text
//! PixelBuffer (RGBA8)
//!     |
//!     v
//! prepare       scale down, tone LUT, blur, depth      (always CPU)
//!     |
//!     v
//! dither step   diffusion | threshold field            (CPU or GPU backend)
//!     |
//!     v
//! finish        blend, scale up, source alpha          (always CPU)
//!     |
//!     v
//! PixelBuffer (RGBA8, source dimensions)
//! ```
//!
//! # Strategies
//!
//! Every built-in algorithm in [`registry`] resolves to one [`Strategy`]:
//!
//! - **Error diffusion**: sequential scan with a [`DiffusionKernel`];
//!   serpentine rows mirror the kernel. Weight mass that falls off the
//!   image, or that a kernel leaves out of its divisor (Atkinson keeps 6/8),
//!   is dropped.
//! - **Ordered**: per-pixel threshold from a tiled [`ThresholdMatrix`], a
//!   [`Procedural`] field, or a per-image field (Otsu, adaptive, stipple).
//! - **Custom kernel** and **custom threshold**: the same two shapes with
//!   user data. An all-zero kernel thresholds at 0.5.
//!
//! Seeded randomness always comes from [`hash`], a pure function of
//! `(x, y, seed)`, so scan order and parallelism never change output.

pub mod api;
pub mod buffer;
pub mod color;
pub mod dither;
pub mod palette;
pub mod preprocess;
pub mod registry;


pub use api::{
    dither_cpu, process, process_with, AlgorithmSelector, ConfigError, CpuBackend, DitherBackend,
    EngineError, Extras, PaletteSpec, Plan, ProcessingParams, Stage,
};
pub use buffer::{BufferError, PixelBuffer};
pub use color::Rgb;
pub use dither::{
    hash, DiffusionKernel, DitherOptions, KernelError, MatrixError, Procedural, Quantizer,
    ThresholdField, ThresholdMatrix, ThresholdMode, ThresholdSource,
};
pub use palette::{builtin_palette, Palette, PaletteError, ParseColorError, BUILTIN_PALETTES};
pub use preprocess::{Adjustments, WorkingImage};
pub use registry::{AlgorithmEntry, Category, Strategy};
