//! Dithering options and configuration.

/// Per-job knobs shared by every dithering strategy.
///
/// Strategies ignore what does not apply to them: ordered dithering has no
/// scan direction, error diffusion has no spread.
///
/// # Defaults
///
/// - Serpentine scanning: enabled
/// - Strength: 1.0 (diffuse the full error)
/// - Spread: 1.0 (threshold perturbs by one quantization step)
/// - Threshold bias: 0.0
/// - Seed: 0
///
/// # Example
///
/// ```
/// use ditter_core::DitherOptions;
///
/// let options = DitherOptions::new()
///     .serpentine(false)
///     .strength(0.8);
/// assert!(!options.serpentine);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DitherOptions {
    /// Scan odd rows right-to-left with the kernel mirrored.
    pub serpentine: bool,

    /// Fraction of the quantization error that is diffused, `0.0..=1.0`.
    pub strength: f32,

    /// Multiplier on the threshold perturbation in spread mode.
    pub spread: f32,

    /// Added to the threshold in binary mode; positive values darken.
    pub threshold_bias: f32,

    /// Seed for hash-driven noise and stippling.
    pub seed: u32,
}

impl Default for DitherOptions {
    fn default() -> Self {
        Self {
            serpentine: true,
            strength: 1.0,
            spread: 1.0,
            threshold_bias: 0.0,
            seed: 0,
        }
    }
}

impl DitherOptions {
    /// Same as `DitherOptions::default()`.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn serpentine(mut self, enabled: bool) -> Self {
        self.serpentine = enabled;
        self
    }

    /// Set the diffusion strength (clamped to `0.0..=1.0`).
    #[inline]
    pub fn strength(mut self, strength: f32) -> Self {
        self.strength = strength.clamp(0.0, 1.0);
        self
    }

    /// Set the spread multiplier (clamped to `0.0..=4.0`).
    #[inline]
    pub fn spread(mut self, spread: f32) -> Self {
        self.spread = spread.clamp(0.0, 4.0);
        self
    }

    /// Set the binary threshold bias (clamped to `-1.0..=1.0`).
    #[inline]
    pub fn threshold_bias(mut self, bias: f32) -> Self {
        self.threshold_bias = bias.clamp(-1.0, 1.0);
        self
    }

    #[inline]
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let opts = DitherOptions::default();
        assert!(opts.serpentine, "serpentine should default to true");
        assert_eq!(opts.strength, 1.0, "strength should default to full");
        assert_eq!(opts.spread, 1.0);
        assert_eq!(opts.threshold_bias, 0.0);
        assert_eq!(opts.seed, 0);
    }

    #[test]
    fn test_new_equals_default() {
        assert_eq!(DitherOptions::new(), DitherOptions::default());
    }

    #[test]
    fn test_builder_clamps() {
        let opts = DitherOptions::new()
            .strength(1.7)
            .spread(-2.0)
            .threshold_bias(3.0);
        assert_eq!(opts.strength, 1.0);
        assert_eq!(opts.spread, 0.0);
        assert_eq!(opts.threshold_bias, 1.0);
    }

    #[test]
    fn test_builder_chaining() {
        let opts = DitherOptions::new()
            .serpentine(false)
            .strength(0.5)
            .spread(2.0)
            .seed(99);

        assert!(!opts.serpentine);
        assert_eq!(opts.strength, 0.5);
        assert_eq!(opts.spread, 2.0);
        assert_eq!(opts.seed, 99);
        // Untouched values keep their defaults
        assert_eq!(opts.threshold_bias, 0.0);
    }
}
