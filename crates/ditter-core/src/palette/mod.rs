//! Palette definition and nearest-color matching.

mod builtin;
mod error;
#[allow(clippy::module_inception)]
mod palette;

pub use builtin::{builtin_palette, BuiltinPalette, BUILTIN_PALETTES};
pub use error::{PaletteError, ParseColorError};
pub use palette::{Palette, MAX_PALETTE_LEN};
