//! Public API: parameters, validated plans, and the processing entry points.
//!
//! [`ProcessingParams`] is what callers send. [`Plan`] is its validated form.
//! [`process`] and [`process_with`] run a plan over a [`PixelBuffer`](crate::PixelBuffer).

mod engine;
mod error;
mod params;
mod plan;

pub use engine::{dither_cpu, process, process_with, CpuBackend, DitherBackend};
pub use error::{ConfigError, EngineError};
pub use params::{AlgorithmSelector, Extras, PaletteSpec, ProcessingParams};
pub use plan::{Plan, Stage};
