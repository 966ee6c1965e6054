//! Validated, immutable form of [`ProcessingParams`].

use super::error::ConfigError;
use super::params::{AlgorithmSelector, PaletteSpec, ProcessingParams};
use crate::dither::{
    DiffusionKernel, DitherOptions, Quantizer, ThresholdMatrix, ThresholdMode, ThresholdSource,
};
use crate::palette::{builtin_palette, Palette};
use crate::preprocess::Adjustments;
use crate::registry::{self, Strategy};

/// What the dither step does for a plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage<'a> {
    /// Sequential error diffusion with this kernel.
    Diffuse(&'a DiffusionKernel),
    /// Per-pixel thresholding against this source.
    Threshold {
        source: ThresholdSource,
        mode: ThresholdMode,
    },
}

/// Everything needed to process an image, checked up front.
///
/// Building a plan is the fail-fast configuration check: malformed kernels,
/// bad matrices, unknown algorithms and empty palettes are rejected here,
/// so a job never fails halfway through a scan for configuration reasons.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    strategy: Strategy,
    quantizer: Quantizer,
    adjustments: Adjustments,
    options: DitherOptions,
}

impl Plan {
    /// Plan with default adjustments and options.
    pub fn new(strategy: Strategy, quantizer: Quantizer) -> Self {
        Self {
            strategy,
            quantizer,
            adjustments: Adjustments::default(),
            options: DitherOptions::default(),
        }
    }

    pub fn with_adjustments(mut self, adjustments: Adjustments) -> Self {
        self.adjustments = adjustments.sanitized();
        self.options = self.options.threshold_bias(self.adjustments.threshold_bias);
        self
    }

    pub fn with_options(mut self, options: DitherOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate parameters and resolve every string id.
    pub fn from_params(params: &ProcessingParams) -> Result<Self, ConfigError> {
        let strategy = resolve_strategy(&params.algorithm, params.extras.seed)?;
        let quantizer = match &params.palette {
            Some(spec) => Quantizer::Palette(resolve_palette(spec)?),
            None => {
                if !(2..=256).contains(&params.levels) {
                    return Err(ConfigError::Levels(params.levels));
                }
                Quantizer::Levels(params.levels as u16)
            }
        };
        let adjustments = params.adjustments.sanitized();
        let extras = params.extras;
        let options = DitherOptions::new()
            .serpentine(extras.serpentine)
            .strength(extras.strength)
            .spread(extras.spread)
            .threshold_bias(adjustments.threshold_bias)
            .seed(extras.seed);

        tracing::debug!(
            strategy = strategy.label(),
            levels = quantizer.output_levels(),
            "plan built"
        );

        Ok(Self {
            strategy,
            quantizer,
            adjustments,
            options,
        })
    }

    #[inline]
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    #[inline]
    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    #[inline]
    pub fn adjustments(&self) -> &Adjustments {
        &self.adjustments
    }

    #[inline]
    pub fn options(&self) -> &DitherOptions {
        &self.options
    }

    /// Whether a GPU backend may run this plan.
    pub fn gpu_eligible(&self) -> bool {
        self.strategy.gpu_eligible()
    }

    /// The dither step, with an all-zero custom kernel degraded to a
    /// binary threshold at 0.5.
    pub fn stage(&self) -> Stage<'_> {
        match &self.strategy {
            Strategy::ErrorDiffusion(kernel) => Stage::Diffuse(kernel),
            Strategy::CustomKernel(kernel) if !kernel.is_empty() => Stage::Diffuse(kernel),
            Strategy::CustomKernel(_) => Stage::Threshold {
                source: ThresholdSource::Constant(0.5),
                mode: ThresholdMode::Binary,
            },
            Strategy::Ordered { source, mode } => Stage::Threshold {
                source: source.clone(),
                mode: *mode,
            },
            Strategy::CustomThreshold(matrix) => Stage::Threshold {
                source: ThresholdSource::Matrix(matrix.clone()),
                mode: ThresholdMode::Auto,
            },
        }
    }
}

impl TryFrom<&ProcessingParams> for Plan {
    type Error = ConfigError;

    fn try_from(params: &ProcessingParams) -> Result<Self, Self::Error> {
        Plan::from_params(params)
    }
}

fn resolve_strategy(selector: &AlgorithmSelector, seed: u32) -> Result<Strategy, ConfigError> {
    match selector {
        AlgorithmSelector::Builtin { category, id } => {
            let entry = registry::lookup(*category, id).ok_or_else(|| ConfigError::UnknownAlgorithm {
                category: *category,
                id: id.clone(),
            })?;
            Ok(match &entry.strategy {
                Strategy::Ordered {
                    source: ThresholdSource::Procedural(p),
                    mode,
                } => Strategy::Ordered {
                    source: ThresholdSource::Procedural(p.with_seed(seed)),
                    mode: *mode,
                },
                other => other.clone(),
            })
        }
        AlgorithmSelector::CustomKernel {
            weights,
            origin,
            divisor,
        } => {
            let kernel = DiffusionKernel::from_grid(weights, (origin[0], origin[1]), *divisor)?;
            Ok(Strategy::CustomKernel(kernel))
        }
        AlgorithmSelector::CustomThreshold { matrix } => {
            Ok(Strategy::CustomThreshold(ThresholdMatrix::from_rows(matrix)?))
        }
    }
}

fn resolve_palette(spec: &PaletteSpec) -> Result<Palette, ConfigError> {
    Ok(match spec {
        PaletteSpec::Named(name) => builtin_palette(name)?,
        PaletteSpec::Colors(hex) => Palette::from_hex(hex)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dither::{KernelError, Procedural};
    use crate::palette::PaletteError;
    use crate::registry::Category;

    fn builtin(category: Category, id: &str) -> ProcessingParams {
        ProcessingParams::new(AlgorithmSelector::builtin(category, id))
    }

    #[test]
    fn test_default_params_build() {
        let plan = Plan::from_params(&ProcessingParams::default()).unwrap();
        assert!(matches!(plan.stage(), Stage::Diffuse(_)));
        assert_eq!(plan.quantizer(), &Quantizer::Levels(2));
        assert!(!plan.gpu_eligible());
    }

    #[test]
    fn test_unknown_algorithm() {
        let err = Plan::from_params(&builtin(Category::Ordered, "bayer-3x3")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownAlgorithm {
                category: Category::Ordered,
                id: "bayer-3x3".into()
            }
        );
    }

    #[test]
    fn test_empty_palette_fails_fast() {
        let params = builtin(Category::Ordered, "bayer-4x4").palette(PaletteSpec::Colors(vec![]));
        assert_eq!(
            Plan::from_params(&params),
            Err(ConfigError::Palette(PaletteError::Empty))
        );
    }

    #[test]
    fn test_levels_range() {
        assert_eq!(
            Plan::from_params(&ProcessingParams::default().levels(1)),
            Err(ConfigError::Levels(1))
        );
        assert_eq!(
            Plan::from_params(&ProcessingParams::default().levels(300)),
            Err(ConfigError::Levels(300))
        );
        let plan = Plan::from_params(&ProcessingParams::default().levels(256)).unwrap();
        assert_eq!(plan.quantizer().output_levels(), 256);
    }

    #[test]
    fn test_non_causal_custom_kernel_rejected() {
        let params = ProcessingParams::new(AlgorithmSelector::CustomKernel {
            weights: vec![vec![1, 0, 7], vec![3, 5, 1]],
            origin: [1, 0],
            divisor: None,
        });
        assert_eq!(
            Plan::from_params(&params),
            Err(ConfigError::Kernel(KernelError::NonCausal { dx: -1, dy: 0 }))
        );
    }

    #[test]
    fn test_overflowing_custom_kernel_rejected() {
        let params = ProcessingParams::new(AlgorithmSelector::CustomKernel {
            weights: vec![vec![0, u32::MAX], vec![1, 1]],
            origin: [0, 0],
            divisor: None,
        });
        assert_eq!(
            Plan::from_params(&params),
            Err(ConfigError::Kernel(KernelError::WeightOverflow))
        );
    }

    #[test]
    fn test_all_zero_kernel_becomes_threshold_stage() {
        let params = ProcessingParams::new(AlgorithmSelector::CustomKernel {
            weights: vec![vec![0; 3]; 2],
            origin: [1, 0],
            divisor: None,
        });
        let plan = Plan::from_params(&params).unwrap();
        assert_eq!(
            plan.stage(),
            Stage::Threshold {
                source: ThresholdSource::Constant(0.5),
                mode: ThresholdMode::Binary
            }
        );
    }

    #[test]
    fn test_custom_threshold_is_gpu_eligible() {
        let params = ProcessingParams::new(AlgorithmSelector::CustomThreshold {
            matrix: vec![vec![0, 2], vec![3, 1]],
        });
        assert!(Plan::from_params(&params).unwrap().gpu_eligible());
    }

    #[test]
    fn test_seed_reaches_procedural_source() {
        let mut params = builtin(Category::Noise, "white-noise");
        params.extras.seed = 77;
        let plan = Plan::from_params(&params).unwrap();
        assert_eq!(
            plan.stage(),
            Stage::Threshold {
                source: ThresholdSource::Procedural(Procedural::WhiteNoise { seed: 77 }),
                mode: ThresholdMode::Auto
            }
        );
    }

    #[test]
    fn test_threshold_bias_flows_into_options() {
        let mut params = builtin(Category::Threshold, "fixed");
        params.adjustments.threshold_bias = 0.2;
        let plan = Plan::from_params(&params).unwrap();
        assert_eq!(plan.options().threshold_bias, 0.2);
    }
}
