//! Built-in algorithm table.
//!
//! `(category, id)` string pairs are resolved here, once, into a typed
//! [`Strategy`]. The table is built on first access and never mutated.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::dither::{
    blue_noise_matrix, DiffusionKernel, KernelTable, Procedural, ThresholdMatrix, ThresholdMode,
    ThresholdSource, ATKINSON, BURKES, FALSE_FLOYD_STEINBERG, FLOYD_STEINBERG,
    JARVIS_JUDICE_NINKE, SHIAU_FAN, SHIAU_FAN_2, SIERRA, SIERRA_LITE, SIERRA_TWO_ROW,
    STEVENSON_ARCE, STUCKI,
};

/// Algorithm family, as shown in a category picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    ErrorDiffusion,
    Ordered,
    Halftone,
    Pattern,
    Modulation,
    Noise,
    Threshold,
    Artistic,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::ErrorDiffusion,
        Category::Ordered,
        Category::Halftone,
        Category::Pattern,
        Category::Modulation,
        Category::Noise,
        Category::Threshold,
        Category::Artistic,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Category::ErrorDiffusion => "error-diffusion",
            Category::Ordered => "ordered",
            Category::Halftone => "halftone",
            Category::Pattern => "pattern",
            Category::Modulation => "modulation",
            Category::Noise => "noise",
            Category::Threshold => "threshold",
            Category::Artistic => "artistic",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| s.to_string())
    }
}

/// One of the four processing strategies, with its typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Built-in error diffusion kernel.
    ErrorDiffusion(DiffusionKernel),
    /// Built-in ordered, halftone, pattern, noise, threshold or modulation source.
    Ordered {
        source: ThresholdSource,
        mode: ThresholdMode,
    },
    /// User-authored diffusion kernel; an empty one means plain thresholding.
    CustomKernel(DiffusionKernel),
    /// User-authored threshold matrix.
    CustomThreshold(ThresholdMatrix),
}

impl Strategy {
    /// Whether the strategy is per-pixel independent and can run on a GPU.
    ///
    /// Error diffusion is sequential. Per-image sources (Otsu, adaptive,
    /// stipple) need a whole-image pre-pass.
    pub fn gpu_eligible(&self) -> bool {
        match self {
            Strategy::ErrorDiffusion(_) | Strategy::CustomKernel(_) => false,
            Strategy::Ordered { source, .. } => !source.is_per_image(),
            Strategy::CustomThreshold(_) => true,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::ErrorDiffusion(_) => "error-diffusion",
            Strategy::Ordered { .. } => "ordered",
            Strategy::CustomKernel(_) => "custom-kernel",
            Strategy::CustomThreshold(_) => "custom-threshold",
        }
    }
}

/// A registry row.
#[derive(Debug, Clone)]
pub struct AlgorithmEntry {
    pub category: Category,
    pub id: &'static str,
    pub name: &'static str,
    pub strategy: Strategy,
}

impl AlgorithmEntry {
    pub fn gpu_eligible(&self) -> bool {
        self.strategy.gpu_eligible()
    }
}

static REGISTRY: OnceLock<Vec<AlgorithmEntry>> = OnceLock::new();

/// Every built-in algorithm, grouped by category in display order.
pub fn algorithms() -> &'static [AlgorithmEntry] {
    REGISTRY.get_or_init(build)
}

/// Algorithms in one category.
pub fn algorithms_in(category: Category) -> impl Iterator<Item = &'static AlgorithmEntry> {
    algorithms().iter().filter(move |e| e.category == category)
}

/// Find an algorithm by category and id (id match is case-insensitive).
pub fn lookup(category: Category, id: &str) -> Option<&'static AlgorithmEntry> {
    algorithms()
        .iter()
        .find(|e| e.category == category && e.id.eq_ignore_ascii_case(id))
}

fn build() -> Vec<AlgorithmEntry> {
    let mut table = Vec::new();

    let kernels: [(&'static str, &'static str, KernelTable); 12] = [
        ("floyd-steinberg", "Floyd-Steinberg", FLOYD_STEINBERG),
        ("false-floyd-steinberg", "False Floyd-Steinberg", FALSE_FLOYD_STEINBERG),
        ("jarvis-judice-ninke", "Jarvis-Judice-Ninke", JARVIS_JUDICE_NINKE),
        ("stucki", "Stucki", STUCKI),
        ("burkes", "Burkes", BURKES),
        ("sierra", "Sierra", SIERRA),
        ("sierra-two-row", "Sierra Two-Row", SIERRA_TWO_ROW),
        ("sierra-lite", "Sierra Lite", SIERRA_LITE),
        ("atkinson", "Atkinson", ATKINSON),
        ("stevenson-arce", "Stevenson-Arce", STEVENSON_ARCE),
        ("shiau-fan", "Shiau-Fan", SHIAU_FAN),
        ("shiau-fan-2", "Shiau-Fan 2", SHIAU_FAN_2),
    ];
    for (id, name, table_entry) in kernels {
        match table_entry.to_kernel() {
            Ok(kernel) => table.push(AlgorithmEntry {
                category: Category::ErrorDiffusion,
                id,
                name,
                strategy: Strategy::ErrorDiffusion(kernel),
            }),
            Err(e) => tracing::error!(id, %e, "skipping invalid built-in kernel"),
        }
    }

    let mut ordered = |category, id, name, source, mode| {
        table.push(AlgorithmEntry {
            category,
            id,
            name,
            strategy: Strategy::Ordered { source, mode },
        })
    };
    let auto = ThresholdMode::Auto;
    let binary = ThresholdMode::Binary;
    let matrix = ThresholdSource::Matrix;
    let procedural = ThresholdSource::Procedural;

    use Category::*;
    ordered(Ordered, "bayer-2x2", "Bayer 2x2", matrix(ThresholdMatrix::bayer(1)), auto);
    ordered(Ordered, "bayer-4x4", "Bayer 4x4", matrix(ThresholdMatrix::bayer(2)), auto);
    ordered(Ordered, "bayer-8x8", "Bayer 8x8", matrix(ThresholdMatrix::bayer(3)), auto);
    ordered(Ordered, "bayer-16x16", "Bayer 16x16", matrix(ThresholdMatrix::bayer(4)), auto);
    ordered(Ordered, "cluster-dot-4x4", "Clustered Dot 4x4", matrix(ThresholdMatrix::dot(4)), auto);
    ordered(Ordered, "cluster-dot-8x8", "Clustered Dot 8x8", matrix(ThresholdMatrix::dot(8)), auto);

    ordered(Halftone, "dot-halftone", "Dot", matrix(ThresholdMatrix::dot(8)), binary);
    ordered(Halftone, "line-halftone", "Line", matrix(ThresholdMatrix::line(8)), binary);
    ordered(Halftone, "diamond-halftone", "Diamond", matrix(ThresholdMatrix::diamond(8)), binary);
    ordered(Halftone, "cross-halftone", "Cross", matrix(ThresholdMatrix::cross(8)), binary);
    ordered(Halftone, "ellipse-halftone", "Ellipse", matrix(ThresholdMatrix::ellipse(8)), binary);

    ordered(Pattern, "crosshatch", "Crosshatch", procedural(Procedural::Crosshatch { period: 8 }), auto);
    ordered(Pattern, "diagonal-lines", "Diagonal Lines", procedural(Procedural::Lines { period: 6 }), auto);

    ordered(
        Modulation,
        "sine-wave",
        "Sine Wave",
        procedural(Procedural::SineWave {
            period: 8.0,
            angle: 45.0,
        }),
        auto,
    );
    ordered(Modulation, "rings", "Rings", procedural(Procedural::Rings { period: 8.0 }), auto);
    ordered(Modulation, "sectors", "Sectors", procedural(Procedural::Sectors { count: 24 }), auto);
    ordered(Modulation, "spiral", "Spiral", procedural(Procedural::Spiral { period: 10.0 }), auto);

    ordered(Noise, "white-noise", "White Noise", procedural(Procedural::WhiteNoise { seed: 0 }), auto);
    ordered(Noise, "blue-noise", "Blue Noise", matrix(blue_noise_matrix().clone()), auto);
    ordered(
        Noise,
        "value-noise",
        "Value Noise",
        procedural(Procedural::ValueNoise {
            scale: 8.0,
            seed: 0,
        }),
        auto,
    );

    ordered(Threshold, "fixed", "Fixed 50%", ThresholdSource::Constant(0.5), binary);
    ordered(Threshold, "otsu", "Otsu", ThresholdSource::Otsu, binary);
    ordered(
        Threshold,
        "adaptive",
        "Adaptive Mean",
        ThresholdSource::Adaptive {
            radius: 7,
            offset: 0.02,
        },
        binary,
    );

    ordered(
        Artistic,
        "stipple",
        "Stipple",
        ThresholdSource::Stipple {
            density: 0.6,
            spacing: 1,
        },
        binary,
    );
    ordered(
        Artistic,
        "sketch",
        "Sketch",
        procedural(Procedural::Sketch { period: 8, seed: 0 }),
        binary,
    );

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_algorithms() {
        for c in Category::ALL {
            assert!(algorithms_in(c).next().is_some(), "{c} is empty");
        }
    }

    #[test]
    fn test_ids_unique_within_category() {
        for c in Category::ALL {
            let mut ids: Vec<_> = algorithms_in(c).map(|e| e.id).collect();
            let n = ids.len();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), n, "duplicate id in {c}");
        }
    }

    #[test]
    fn test_lookup() {
        let fs = lookup(Category::ErrorDiffusion, "Floyd-Steinberg").unwrap();
        assert_eq!(fs.name, "Floyd-Steinberg");
        assert!(lookup(Category::Ordered, "floyd-steinberg").is_none());
        assert!(lookup(Category::Ordered, "bayer-4x4").is_some());
    }

    #[test]
    fn test_gpu_eligibility() {
        assert!(!lookup(Category::ErrorDiffusion, "atkinson").unwrap().gpu_eligible());
        assert!(lookup(Category::Ordered, "bayer-8x8").unwrap().gpu_eligible());
        assert!(lookup(Category::Modulation, "spiral").unwrap().gpu_eligible());
        assert!(lookup(Category::Noise, "blue-noise").unwrap().gpu_eligible());
        assert!(!lookup(Category::Threshold, "otsu").unwrap().gpu_eligible());
        assert!(!lookup(Category::Artistic, "stipple").unwrap().gpu_eligible());
    }

    #[test]
    fn test_category_parse_and_serde() {
        assert_eq!("Halftone".parse::<Category>(), Ok(Category::Halftone));
        assert!("glitch".parse::<Category>().is_err());
        let c: Category = serde_yaml::from_str("error-diffusion").unwrap();
        assert_eq!(c, Category::ErrorDiffusion);
    }
}
