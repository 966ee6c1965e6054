//! Adjustment knobs applied around the dither step.

use serde::{Deserialize, Serialize};

/// Tone and geometry adjustments.
///
/// Every field has a neutral default, so an all-default value is a no-op
/// and a params file only names the knobs it changes.
///
/// # Example
///
/// ```
/// use ditter_core::Adjustments;
///
/// let adj = Adjustments::new().scale(2).contrast(1.2).invert(true);
/// assert_eq!(adj.scale, 2);
/// assert!(!adj.is_identity());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Adjustments {
    /// Pixel block size: dither at `1/scale` resolution, then scale back up.
    pub scale: u32,

    /// Box blur radius in pixels (0 = off).
    pub blur: u32,

    /// Crossfade toward the adjusted, undithered image (0 = pure dither).
    pub blend: f32,

    /// Contrast multiplier around mid-grey (1 = unchanged).
    pub contrast: f32,

    /// Midtone gamma (>1 lifts midtones, <1 darkens them).
    pub midtones: f32,

    /// Gain applied to the upper half of the tone range (1 = unchanged).
    pub highlights: f32,

    /// Added to the threshold in binary mode.
    pub threshold_bias: f32,

    /// Unsharp-mask amount (0 = off).
    pub depth: f32,

    pub invert: bool,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            scale: 1,
            blur: 0,
            blend: 0.0,
            contrast: 1.0,
            midtones: 1.0,
            highlights: 1.0,
            threshold_bias: 0.0,
            depth: 0.0,
            invert: false,
        }
    }
}

impl Adjustments {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn scale(mut self, block: u32) -> Self {
        self.scale = block;
        self
    }

    #[inline]
    pub fn blur(mut self, radius: u32) -> Self {
        self.blur = radius;
        self
    }

    #[inline]
    pub fn blend(mut self, amount: f32) -> Self {
        self.blend = amount;
        self
    }

    #[inline]
    pub fn contrast(mut self, factor: f32) -> Self {
        self.contrast = factor;
        self
    }

    #[inline]
    pub fn midtones(mut self, gamma: f32) -> Self {
        self.midtones = gamma;
        self
    }

    #[inline]
    pub fn highlights(mut self, gain: f32) -> Self {
        self.highlights = gain;
        self
    }

    #[inline]
    pub fn threshold_bias(mut self, bias: f32) -> Self {
        self.threshold_bias = bias;
        self
    }

    #[inline]
    pub fn depth(mut self, amount: f32) -> Self {
        self.depth = amount;
        self
    }

    #[inline]
    pub fn invert(mut self, enabled: bool) -> Self {
        self.invert = enabled;
        self
    }

    /// Clamp every knob into its supported range.
    pub fn sanitized(self) -> Self {
        Self {
            scale: self.scale.clamp(1, 64),
            blur: self.blur.min(32),
            blend: finite_or(self.blend, 0.0).clamp(0.0, 1.0),
            contrast: finite_or(self.contrast, 1.0).clamp(0.0, 4.0),
            midtones: finite_or(self.midtones, 1.0).clamp(0.1, 10.0),
            highlights: finite_or(self.highlights, 1.0).clamp(0.0, 4.0),
            threshold_bias: finite_or(self.threshold_bias, 0.0).clamp(-1.0, 1.0),
            depth: finite_or(self.depth, 0.0).clamp(0.0, 8.0),
            invert: self.invert,
        }
    }

    /// Whether the tone curve changes any value.
    pub fn has_tone_curve(&self) -> bool {
        self.contrast != 1.0 || self.midtones != 1.0 || self.highlights != 1.0 || self.invert
    }

    /// No adjustment would change the image.
    pub fn is_identity(&self) -> bool {
        self.scale <= 1 && self.blur == 0 && self.blend == 0.0 && self.depth == 0.0 && !self.has_tone_curve()
    }
}

fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        assert!(Adjustments::default().is_identity());
    }

    #[test]
    fn test_sanitized_clamps() {
        let adj = Adjustments::new()
            .scale(0)
            .blend(3.0)
            .midtones(0.0)
            .contrast(f32::NAN)
            .sanitized();
        assert_eq!(adj.scale, 1);
        assert_eq!(adj.blend, 1.0);
        assert_eq!(adj.midtones, 0.1);
        assert_eq!(adj.contrast, 1.0, "NaN falls back to neutral");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let adj: Adjustments = serde_yaml::from_str("contrast: 1.5\ninvert: true\n").unwrap();
        assert_eq!(adj.contrast, 1.5);
        assert!(adj.invert);
        assert_eq!(adj.scale, 1);
        assert_eq!(adj.midtones, 1.0);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = serde_yaml::from_str::<Adjustments>("brightnes: 2\n").unwrap_err();
        assert!(err.to_string().contains("brightnes"), "{err}");
    }
}
