//! Serializable processing parameters.
//!
//! This is the shape front-ends and params files speak. It is validated and
//! turned into a [`Plan`](super::Plan) before a job is accepted.
//!
//! ```yaml
//! algorithm:
//!   type: builtin
//!   category: ordered
//!   id: bayer-4x4
//! palette: gameboy
//! adjustments:
//!   contrast: 1.2
//!   scale: 2
//! extras:
//!   spread: 0.8
//! ```

use serde::{Deserialize, Serialize};

use crate::preprocess::Adjustments;
use crate::registry::Category;

/// Which algorithm to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AlgorithmSelector {
    /// An entry of the built-in registry.
    Builtin { category: Category, id: String },

    /// A diffusion kernel authored as a weight grid.
    CustomKernel {
        weights: Vec<Vec<u32>>,
        /// `[x, y]` cell of the pixel being quantized.
        origin: [usize; 2],
        #[serde(default, skip_serializing_if = "Option::is_none")]
        divisor: Option<u32>,
    },

    /// A square grid of threshold ranks.
    CustomThreshold { matrix: Vec<Vec<u32>> },
}

impl AlgorithmSelector {
    pub fn builtin(category: Category, id: impl Into<String>) -> Self {
        AlgorithmSelector::Builtin {
            category,
            id: id.into(),
        }
    }
}

impl Default for AlgorithmSelector {
    fn default() -> Self {
        AlgorithmSelector::builtin(Category::ErrorDiffusion, "floyd-steinberg")
    }
}

/// A palette by built-in name or as a list of hex colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaletteSpec {
    Named(String),
    Colors(Vec<String>),
}

/// Algorithm-specific knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Extras {
    pub serpentine: bool,
    pub strength: f32,
    pub spread: f32,
    pub seed: u32,
}

impl Default for Extras {
    fn default() -> Self {
        Self {
            serpentine: true,
            strength: 1.0,
            spread: 1.0,
            seed: 0,
        }
    }
}

/// Everything a job needs besides the source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingParams {
    pub algorithm: AlgorithmSelector,

    /// Without a palette, output is quantized per channel to `levels`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<PaletteSpec>,

    /// Levels per channel when no palette is given (2..=256).
    pub levels: u32,

    pub adjustments: Adjustments,
    pub extras: Extras,
}

impl Default for ProcessingParams {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmSelector::default(),
            palette: None,
            levels: 2,
            adjustments: Adjustments::default(),
            extras: Extras::default(),
        }
    }
}

impl ProcessingParams {
    pub fn new(algorithm: AlgorithmSelector) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    pub fn palette(mut self, palette: PaletteSpec) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn levels(mut self, levels: u32) -> Self {
        self.levels = levels;
        self
    }

    pub fn adjustments(mut self, adjustments: Adjustments) -> Self {
        self.adjustments = adjustments;
        self
    }

    pub fn extras(mut self, extras: Extras) -> Self {
        self.extras = extras;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_yaml() {
        let yaml = r##"
algorithm:
  type: builtin
  category: ordered
  id: bayer-4x4
palette: gameboy
adjustments:
  contrast: 1.2
  scale: 2
extras:
  spread: 0.8
"##;
        let params: ProcessingParams = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            params.algorithm,
            AlgorithmSelector::builtin(Category::Ordered, "bayer-4x4")
        );
        assert_eq!(params.palette, Some(PaletteSpec::Named("gameboy".into())));
        assert_eq!(params.adjustments.scale, 2);
        assert_eq!(params.extras.spread, 0.8);
        assert!(params.extras.serpentine, "unset extras keep defaults");
        assert_eq!(params.levels, 2);
    }

    #[test]
    fn test_empty_document_is_default() {
        let params: ProcessingParams = serde_yaml::from_str("{}").unwrap();
        assert_eq!(params, ProcessingParams::new(AlgorithmSelector::default()));
    }

    #[test]
    fn test_custom_kernel_yaml() {
        let yaml = r##"
algorithm:
  type: custom-kernel
  weights: [[0, 0, 7], [3, 5, 1]]
  origin: [1, 0]
palette: ["#000", "#fff"]
"##;
        let params: ProcessingParams = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            params.algorithm,
            AlgorithmSelector::CustomKernel {
                weights: vec![vec![0, 0, 7], vec![3, 5, 1]],
                origin: [1, 0],
                divisor: None,
            }
        );
        assert_eq!(
            params.palette,
            Some(PaletteSpec::Colors(vec!["#000".into(), "#fff".into()]))
        );
    }

    #[test]
    fn test_json_custom_threshold() {
        let json = r#"{"algorithm":{"type":"custom-threshold","matrix":[[0,2],[3,1]]},"levels":4}"#;
        let params: ProcessingParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.levels, 4);
        assert!(matches!(
            params.algorithm,
            AlgorithmSelector::CustomThreshold { .. }
        ));
    }
}
