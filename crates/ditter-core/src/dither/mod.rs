//! Dithering algorithms.
//!
//! Two families with very different execution shapes:
//!
//! - **Error diffusion** ([`diffuse`]): a sequential scan that pushes each
//!   pixel's quantization error onto unvisited neighbors through a
//!   [`DiffusionKernel`]. CPU-only.
//! - **Thresholding** ([`threshold`]): ordered, halftone, pattern, noise
//!   and modulation dithering. Every pixel is compared against a
//!   [`ThresholdField`] on its own, which makes it safe to run on a GPU.
//!
//! Both end in a [`Quantizer`]: nearest palette color or per-channel levels.

mod blue_noise;
mod diffusion;
mod kernel;
mod matrix;
mod options;
mod ordered;
mod procedural;
mod quantizer;

pub use blue_noise::{blue_noise_matrix, BLUE_NOISE_SIZE};
pub use diffusion::{diffuse, ErrorBuffer};
pub use kernel::*;
pub use matrix::{MatrixError, ThresholdMatrix, MAX_MATRIX_SIZE};
pub use options::DitherOptions;
pub use ordered::{threshold, ThresholdField, ThresholdMode, ThresholdSource};
pub use procedural::{hash, hash_u32, Procedural, BELOW_ONE};
pub use quantizer::Quantizer;
