use ditter_core::{BufferError, ConfigError, EngineError};
use thiserror::Error;

/// A job was rejected before it was queued.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Invalid parameters: {0}")]
    Config(#[from] ConfigError),

    #[error("Coordinator has shut down")]
    Closed,
}

/// An accepted job did not produce an image.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Job panicked: {0}")]
    Panicked(String),

    #[error("Job task failed: {0}")]
    Join(String),
}

/// Reading or writing an image file.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("PNG decode error: {0}")]
    PngDecode(#[from] png::DecodingError),

    #[error("PNG encode error: {0}")]
    PngEncode(#[from] png::EncodingError),

    #[error("Unsupported PNG format: {color:?} at {depth:?}")]
    UnsupportedFormat {
        color: png::ColorType,
        depth: png::BitDepth,
    },

    #[error("Invalid image data: {0}")]
    Buffer(#[from] BufferError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
