//! 256-entry tone curve.

use super::options::Adjustments;

/// Lookup table from an 8-bit channel value to a working-precision value.
#[derive(Debug, Clone)]
pub struct ToneCurve {
    lut: [f32; 256],
}

impl ToneCurve {
    /// Build the curve: contrast about mid-grey, midtone gamma, highlight
    /// gain, then inversion. Each step clamps to `0..=1`.
    pub fn new(adj: &Adjustments) -> Self {
        let mut lut = [0.0f32; 256];
        for (i, slot) in lut.iter_mut().enumerate() {
            let mut v = i as f32 / 255.0;
            v = ((v - 0.5) * adj.contrast + 0.5).clamp(0.0, 1.0);
            if adj.midtones != 1.0 {
                v = v.powf(1.0 / adj.midtones);
            }
            if v > 0.5 {
                v = (0.5 + (v - 0.5) * adj.highlights).clamp(0.0, 1.0);
            }
            if adj.invert {
                v = 1.0 - v;
            }
            *slot = v * 255.0;
        }
        Self { lut }
    }

    #[inline]
    pub fn apply(&self, v: u8) -> f32 {
        self.lut[v as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_curve() {
        let curve = ToneCurve::new(&Adjustments::default());
        for v in 0..=255u8 {
            assert!((curve.apply(v) - v as f32).abs() < 1e-3, "value {v}");
        }
    }

    #[test]
    fn test_contrast_pushes_away_from_mid() {
        let curve = ToneCurve::new(&Adjustments::new().contrast(2.0));
        assert!(curve.apply(64) < 64.0);
        assert!(curve.apply(192) > 192.0);
        assert_eq!(curve.apply(0), 0.0);
        assert_eq!(curve.apply(255), 255.0);
    }

    #[test]
    fn test_midtones_gamma_lifts() {
        let curve = ToneCurve::new(&Adjustments::new().midtones(2.0));
        assert!(curve.apply(64) > 64.0);
    }

    #[test]
    fn test_highlights_only_touch_upper_half() {
        let curve = ToneCurve::new(&Adjustments::new().highlights(0.5));
        assert!((curve.apply(100) - 100.0).abs() < 1e-3);
        assert!(curve.apply(230) < 230.0);
    }

    #[test]
    fn test_invert() {
        let curve = ToneCurve::new(&Adjustments::new().invert(true));
        assert_eq!(curve.apply(0), 255.0);
        assert!(curve.apply(255).abs() < 1e-3);
    }
}
