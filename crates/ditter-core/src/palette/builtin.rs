//! Named built-in palettes.

use super::{Palette, PaletteError};
use crate::color::Rgb;

/// A named palette shipped with the library.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinPalette {
    pub name: &'static str,
    /// Grouping shown by front-ends (`default`, `retro`, `themed`).
    pub category: &'static str,
    colors: BuiltinColors,
}

#[derive(Debug, Clone, Copy)]
enum BuiltinColors {
    Grey(usize),
    Fixed(&'static [Rgb]),
}

impl BuiltinPalette {
    pub fn palette(&self) -> Palette {
        match self.colors {
            BuiltinColors::Grey(n) => Palette::grayscale(n),
            // Every fixed table is non-empty and short.
            BuiltinColors::Fixed(colors) => match Palette::new(colors.to_vec()) {
                Ok(p) => p,
                Err(_) => Palette::grayscale(2),
            },
        }
    }
}

const GAMEBOY: &[Rgb] = &[
    Rgb::new(0x0f, 0x38, 0x0f),
    Rgb::new(0x30, 0x62, 0x30),
    Rgb::new(0x8b, 0xac, 0x0f),
    Rgb::new(0x9b, 0xbc, 0x0f),
];

const CGA: &[Rgb] = &[
    Rgb::new(0x00, 0x00, 0x00),
    Rgb::new(0x55, 0xff, 0xff),
    Rgb::new(0xff, 0x55, 0xff),
    Rgb::new(0xff, 0xff, 0xff),
];

const PICO_8: &[Rgb] = &[
    Rgb::new(0x00, 0x00, 0x00),
    Rgb::new(0x1d, 0x2b, 0x53),
    Rgb::new(0x7e, 0x25, 0x53),
    Rgb::new(0x00, 0x87, 0x51),
    Rgb::new(0xab, 0x52, 0x36),
    Rgb::new(0x5f, 0x57, 0x4f),
    Rgb::new(0xc2, 0xc3, 0xc7),
    Rgb::new(0xff, 0xf1, 0xe8),
    Rgb::new(0xff, 0x00, 0x4d),
    Rgb::new(0xff, 0xa3, 0x00),
    Rgb::new(0xff, 0xec, 0x27),
    Rgb::new(0x00, 0xe4, 0x36),
    Rgb::new(0x29, 0xad, 0xff),
    Rgb::new(0x83, 0x76, 0x9c),
    Rgb::new(0xff, 0x77, 0xa8),
    Rgb::new(0xff, 0xcc, 0xaa),
];

const SEPIA: &[Rgb] = &[
    Rgb::new(0x2b, 0x1d, 0x0e),
    Rgb::new(0x5e, 0x43, 0x26),
    Rgb::new(0x94, 0x70, 0x4a),
    Rgb::new(0xc9, 0xa7, 0x7c),
    Rgb::new(0xf4, 0xe4, 0xc1),
];

const CYBERPUNK: &[Rgb] = &[
    Rgb::new(0x0d, 0x02, 0x21),
    Rgb::new(0x26, 0x14, 0x47),
    Rgb::new(0xff, 0x00, 0x7f),
    Rgb::new(0x00, 0xf0, 0xff),
    Rgb::new(0xf9, 0xf0, 0x02),
    Rgb::new(0xff, 0xff, 0xff),
];

/// All built-in palettes in display order.
pub static BUILTIN_PALETTES: &[BuiltinPalette] = &[
    BuiltinPalette {
        name: "bw",
        category: "default",
        colors: BuiltinColors::Grey(2),
    },
    BuiltinPalette {
        name: "grayscale-4",
        category: "default",
        colors: BuiltinColors::Grey(4),
    },
    BuiltinPalette {
        name: "grayscale-8",
        category: "default",
        colors: BuiltinColors::Grey(8),
    },
    BuiltinPalette {
        name: "grayscale-16",
        category: "default",
        colors: BuiltinColors::Grey(16),
    },
    BuiltinPalette {
        name: "gameboy",
        category: "retro",
        colors: BuiltinColors::Fixed(GAMEBOY),
    },
    BuiltinPalette {
        name: "cga",
        category: "retro",
        colors: BuiltinColors::Fixed(CGA),
    },
    BuiltinPalette {
        name: "pico-8",
        category: "retro",
        colors: BuiltinColors::Fixed(PICO_8),
    },
    BuiltinPalette {
        name: "sepia",
        category: "themed",
        colors: BuiltinColors::Fixed(SEPIA),
    },
    BuiltinPalette {
        name: "cyberpunk",
        category: "themed",
        colors: BuiltinColors::Fixed(CYBERPUNK),
    },
];

/// Look up a built-in palette by name (case-insensitive).
pub fn builtin_palette(name: &str) -> Result<Palette, PaletteError> {
    BUILTIN_PALETTES
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .map(BuiltinPalette::palette)
        .ok_or_else(|| PaletteError::Unknown(name.to_string()))
}
