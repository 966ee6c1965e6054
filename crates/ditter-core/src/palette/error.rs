//! Error types for palette operations

use std::num::ParseIntError;

use thiserror::Error;

/// Error type for parsing hex color strings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseColorError {
    /// Hex string must have 3 or 6 digits after stripping '#'
    #[error("invalid hex color length in {0:?} (expected 3 or 6 digits)")]
    InvalidLength(String),
    #[error("invalid hex character: {0}")]
    InvalidHex(#[from] ParseIntError),
}

/// Error type for palette validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaletteError {
    #[error("palette cannot be empty")]
    Empty,

    #[error("palette has {len} colors, at most 256 are supported")]
    TooLarge { len: usize },

    #[error("unknown palette: {0}")]
    Unknown(String),

    #[error("invalid color at index {index}: {source}")]
    ParseColor {
        index: usize,
        #[source]
        source: ParseColorError,
    },
}
