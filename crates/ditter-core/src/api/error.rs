//! Error types for the public API.
//!
//! [`ConfigError`] covers everything that can be wrong with a request and
//! is raised while building a [`Plan`](super::Plan), before any pixel work.
//! [`EngineError`] is a failure inside a dither backend at run time.

use thiserror::Error;

use crate::dither::{KernelError, MatrixError};
use crate::palette::PaletteError;
use crate::registry::Category;

/// Rejected processing parameters.
///
/// # Example
///
/// ```
/// use ditter_core::{ConfigError, Plan, ProcessingParams};
///
/// let params: ProcessingParams = serde_yaml::from_str("palette: []").unwrap();
/// assert!(matches!(Plan::from_params(&params), Err(ConfigError::Palette(_))));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown algorithm {id:?} in category {category}")]
    UnknownAlgorithm { category: Category, id: String },

    #[error("palette error: {0}")]
    Palette(#[from] PaletteError),

    #[error("invalid diffusion kernel: {0}")]
    Kernel(#[from] KernelError),

    #[error("invalid threshold matrix: {0}")]
    Matrix(#[from] MatrixError),

    #[error("levels must be between 2 and 256, got {0}")]
    Levels(u32),
}

/// A dither backend failed while running a valid plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("{backend} backend failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },

    #[error("{backend} backend cannot run {strategy} plans")]
    Unsupported {
        backend: &'static str,
        strategy: &'static str,
    },
}
