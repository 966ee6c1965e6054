//! Blue noise threshold matrix.
//!
//! Generated once per process with Ulichney's void-and-cluster method on a
//! torus, so the tile repeats without seams. Blue noise lacks the low
//! frequencies that make Bayer's cross-hatch visible and gives an organic,
//! grain-like texture instead.

use std::sync::OnceLock;

use super::matrix::ThresholdMatrix;
use super::procedural::hash;

/// Side of the generated tile.
pub const BLUE_NOISE_SIZE: usize = 32;

const SIGMA: f32 = 1.5;
const SEED: u32 = 0x5eed_b1e5;

static BLUE_NOISE: OnceLock<ThresholdMatrix> = OnceLock::new();

/// The shared blue noise matrix, built on first use.
pub fn blue_noise_matrix() -> &'static ThresholdMatrix {
    BLUE_NOISE.get_or_init(|| {
        let ranks = void_and_cluster(BLUE_NOISE_SIZE, SIGMA, SEED);
        let rows: Vec<Vec<u32>> = ranks
            .chunks(BLUE_NOISE_SIZE)
            .map(<[u32]>::to_vec)
            .collect();
        match ThresholdMatrix::from_rows(&rows) {
            Ok(m) => m,
            // Unreachable for a square power-of-two tile.
            Err(_) => ThresholdMatrix::bayer(4),
        }
    })
}

/// Binary pattern with a Gaussian "energy" field kept in sync.
struct Pattern {
    n: usize,
    bits: Vec<bool>,
    energy: Vec<f32>,
    /// `weights[dy * n + dx]` for toroidal offsets.
    weights: Vec<f32>,
}

impl Pattern {
    fn new(n: usize, sigma: f32) -> Self {
        let mut weights = vec![0.0; n * n];
        let two_sigma_sq = 2.0 * sigma * sigma;
        for dy in 0..n {
            for dx in 0..n {
                let wx = dx.min(n - dx) as f32;
                let wy = dy.min(n - dy) as f32;
                weights[dy * n + dx] = (-(wx * wx + wy * wy) / two_sigma_sq).exp();
            }
        }
        Self {
            n,
            bits: vec![false; n * n],
            energy: vec![0.0; n * n],
            weights,
        }
    }

    fn set(&mut self, idx: usize, on: bool) {
        if self.bits[idx] == on {
            return;
        }
        self.bits[idx] = on;
        let sign = if on { 1.0 } else { -1.0 };
        let n = self.n;
        let (px, py) = (idx % n, idx / n);
        for y in 0..n {
            let dy = (y + n - py) % n;
            for x in 0..n {
                let dx = (x + n - px) % n;
                self.energy[y * n + x] += sign * self.weights[dy * n + dx];
            }
        }
    }

    /// Set pixel with the highest energy (first index on ties).
    fn tightest_cluster(&self) -> Option<usize> {
        self.argmax(|i| self.bits[i])
    }

    /// Unset pixel with the lowest energy (first index on ties).
    fn largest_void(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for i in 0..self.bits.len() {
            if self.bits[i] {
                continue;
            }
            match best {
                Some((_, e)) if self.energy[i] >= e => {}
                _ => best = Some((i, self.energy[i])),
            }
        }
        best.map(|(i, _)| i)
    }

    fn argmax(&self, include: impl Fn(usize) -> bool) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for i in 0..self.bits.len() {
            if !include(i) {
                continue;
            }
            match best {
                Some((_, e)) if self.energy[i] <= e => {}
                _ => best = Some((i, self.energy[i])),
            }
        }
        best.map(|(i, _)| i)
    }

    fn ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

/// Rank every cell of an `n` x `n` torus with void-and-cluster.
pub(crate) fn void_and_cluster(n: usize, sigma: f32, seed: u32) -> Vec<u32> {
    let cells = n * n;
    let mut pattern = Pattern::new(n, sigma);

    // Initial pattern: the ~10% of cells with the smallest hash.
    let mut order: Vec<usize> = (0..cells).collect();
    order.sort_by(|&a, &b| {
        let ha = hash((a % n) as u32, (a / n) as u32, seed);
        let hb = hash((b % n) as u32, (b / n) as u32, seed);
        ha.total_cmp(&hb)
    });
    for &i in order.iter().take((cells / 10).max(1)) {
        pattern.set(i, true);
    }

    // Relax: move the tightest cluster into the largest void until stable.
    for _ in 0..cells {
        let Some(cluster) = pattern.tightest_cluster() else {
            break;
        };
        pattern.set(cluster, false);
        let Some(void) = pattern.largest_void() else {
            pattern.set(cluster, true);
            break;
        };
        if void == cluster {
            pattern.set(cluster, true);
            break;
        }
        pattern.set(void, true);
    }

    let prototype = pattern.bits.clone();
    let initial = pattern.ones();
    let mut ranks = vec![0u32; cells];

    // Phase 1: peel the prototype from its tightest clusters.
    let mut rank = initial;
    while let Some(i) = pattern.tightest_cluster() {
        rank -= 1;
        ranks[i] = rank as u32;
        pattern.set(i, false);
    }

    // Phases 2 and 3: restore the prototype, then fill the largest voids.
    for (i, &on) in prototype.iter().enumerate() {
        pattern.set(i, on);
    }
    let mut rank = initial;
    while let Some(i) = pattern.largest_void() {
        ranks[i] = rank as u32;
        rank += 1;
        pattern.set(i, true);
    }

    ranks
}
