//! Color primitives.

mod rgb;

pub use rgb::{luma, Rgb, LUMA_WEIGHTS};
