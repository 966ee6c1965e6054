//! Closed-form threshold fields.
//!
//! Every function here maps an integer pixel position to a threshold in
//! `[0, 1)` without looking at any other pixel, so evaluation order never
//! changes the output. Seeded randomness comes only from [`hash`].
//!
//! The GPU shader carries a line-for-line copy of the bit-exact functions
//! (see [`Procedural::is_bit_exact`]); keep the two in sync when changing a
//! formula. Divisions are written as products with a reciprocal so both
//! sides round identically.

use std::f32::consts::TAU;

/// Largest `f32` below 1.0.
pub const BELOW_ONE: f32 = 1.0 - f32::EPSILON / 2.0;

/// Integer avalanche hash of a pixel position and seed.
#[inline]
pub fn hash_u32(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = x.wrapping_mul(0x8da6_b343)
        ^ y.wrapping_mul(0xd816_3841)
        ^ seed.wrapping_mul(0xcb1a_b31f).wrapping_add(0x9e37_79b9);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;
    h
}

/// Uniform value in `[0, 1)` for a pixel position and seed.
///
/// Uses the top 24 bits so the conversion to `f32` is exact.
#[inline]
pub fn hash(x: u32, y: u32, seed: u32) -> f32 {
    (hash_u32(x, y, seed) >> 8) as f32 / 16_777_216.0
}

/// A position-only threshold function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Procedural {
    /// Independent uniform threshold per pixel.
    WhiteNoise { seed: u32 },
    /// Smoothly interpolated lattice noise with cells of `scale` pixels.
    ValueNoise { scale: f32, seed: u32 },
    /// Parallel sine bands `period` pixels apart, rotated by `angle` degrees.
    SineWave { period: f32, angle: f32 },
    /// Concentric rings around the image center.
    Rings { period: f32 },
    /// Pie slices around the image center.
    Sectors { count: u32 },
    /// Archimedean spiral around the image center.
    Spiral { period: f32 },
    /// Diagonal lines on an integer grid.
    Lines { period: u32 },
    /// Two crossing diagonal line sets.
    Crosshatch { period: u32 },
    /// Crosshatch roughened with coherent noise.
    Sketch { period: u32, seed: u32 },
}

impl Procedural {
    /// Stable numeric tag shared with the GPU shader.
    pub fn kind(&self) -> u32 {
        match self {
            Procedural::WhiteNoise { .. } => 0,
            Procedural::ValueNoise { .. } => 1,
            Procedural::SineWave { .. } => 2,
            Procedural::Rings { .. } => 3,
            Procedural::Sectors { .. } => 4,
            Procedural::Spiral { .. } => 5,
            Procedural::Lines { .. } => 6,
            Procedural::Crosshatch { .. } => 7,
            Procedural::Sketch { .. } => 8,
        }
    }

    /// Replace the seed of seeded variants; others are returned unchanged.
    pub fn with_seed(self, seed: u32) -> Self {
        match self {
            Procedural::WhiteNoise { .. } => Procedural::WhiteNoise { seed },
            Procedural::ValueNoise { scale, .. } => Procedural::ValueNoise { scale, seed },
            Procedural::Sketch { period, .. } => Procedural::Sketch { period, seed },
            other => other,
        }
    }

    /// Whether the formula is integer math plus single correctly rounded
    /// products, so any IEEE device reproduces it bit for bit.
    ///
    /// The rest go through `sin`/`atan2`/`sqrt` or multi-step blends whose
    /// last bits differ between math libraries; a GPU backend receives
    /// those as a precomputed per-pixel field.
    pub fn is_bit_exact(&self) -> bool {
        matches!(
            self,
            Procedural::WhiteNoise { .. } | Procedural::Lines { .. } | Procedural::Crosshatch { .. }
        )
    }

    /// Threshold at `(x, y)` for an image of `width` x `height`.
    pub fn eval(&self, x: u32, y: u32, width: u32, height: u32) -> f32 {
        let t = match *self {
            Procedural::WhiteNoise { seed } => hash(x, y, seed),
            Procedural::ValueNoise { scale, seed } => value_noise(x, y, scale, seed),
            Procedural::SineWave { period, angle } => {
                let a = angle.to_radians();
                let d = x as f32 * a.cos() + y as f32 * a.sin();
                0.5 + 0.5 * (TAU * d / period.max(1.0)).sin()
            }
            Procedural::Rings { period } => {
                let (dx, dy) = centered(x, y, width, height);
                let r = (dx * dx + dy * dy).sqrt() / period.max(1.0);
                (2.0 * fract(r) - 1.0).abs()
            }
            Procedural::Sectors { count } => {
                let (dx, dy) = centered(x, y, width, height);
                let turn = dy.atan2(dx) / TAU + 0.5;
                fract(turn * count.max(1) as f32)
            }
            Procedural::Spiral { period } => {
                let (dx, dy) = centered(x, y, width, height);
                let r = (dx * dx + dy * dy).sqrt() / period.max(1.0);
                let turn = dy.atan2(dx) / TAU + 0.5;
                fract(r + turn)
            }
            Procedural::Lines { period } => {
                let p = period.max(1);
                (((x + y) % p) as f32 + 0.5) * (1.0 / p as f32)
            }
            Procedural::Crosshatch { period } => crosshatch(x, y, period),
            Procedural::Sketch { period, seed } => {
                let noise = value_noise(x, y, 4.0, seed);
                0.75 * crosshatch(x, y, period) + 0.25 * noise
            }
        };
        t.clamp(0.0, BELOW_ONE)
    }
}

#[inline]
fn fract(v: f32) -> f32 {
    v - v.floor()
}

/// Pixel center relative to the image center.
#[inline]
fn centered(x: u32, y: u32, width: u32, height: u32) -> (f32, f32) {
    (
        x as f32 + 0.5 - width as f32 * 0.5,
        y as f32 + 0.5 - height as f32 * 0.5,
    )
}

#[inline]
fn crosshatch(x: u32, y: u32, period: u32) -> f32 {
    let p = period.max(1);
    let a = (x + y) % p;
    let b = (x + p - y % p) % p;
    (a.max(b) as f32 + 0.5) * (1.0 / p as f32)
}

/// Bilinear lattice noise with a smoothstep fade.
fn value_noise(x: u32, y: u32, scale: f32, seed: u32) -> f32 {
    let inv = 1.0 / scale.max(1.0);
    let fx = x as f32 * inv;
    let fy = y as f32 * inv;
    let cx = fx.floor();
    let cy = fy.floor();
    let tx = fx - cx;
    let ty = fy - cy;
    let (ix, iy) = (cx as u32, cy as u32);

    let v00 = hash(ix, iy, seed);
    let v10 = hash(ix + 1, iy, seed);
    let v01 = hash(ix, iy + 1, seed);
    let v11 = hash(ix + 1, iy + 1, seed);

    let sx = tx * tx * (3.0 - 2.0 * tx);
    let sy = ty * ty * (3.0 - 2.0 * ty);
    let top = v00 + (v10 - v00) * sx;
    let bottom = v01 + (v11 - v01) * sx;
    top + (bottom - top) * sy
}
