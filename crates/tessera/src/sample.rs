//! Deterministic random inputs for tests and benchmarks.
//!
//! Purpose
//! - Reproducible point clouds and constraint polygons driven by a replay
//!   token `(seed, index)`, so stress tests and benches can enumerate cases
//!   without storing fixtures. Each sampler stretches the token into a full
//!   RNG seed under its own stream tag, keeping the cloud and polygon draws
//!   for the same token decorrelated.

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Stream tags, one per sampler (ASCII names).
const CLOUD_STREAM: u64 = 0x636c_6f75_64; // "cloud"
const RING_STREAM: u64 = 0x7269_6e67; // "ring"

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    pub fn new(seed: u64, index: u64) -> Self {
        Self { seed, index }
    }

    /// Stretch the token into a 32-byte `StdRng` seed with an xorshift64*
    /// stream. The `| 1` keeps the generator state nonzero for any token.
    fn rng(self, stream: u64) -> StdRng {
        let mut state = (self.seed ^ stream)
            .wrapping_add(self.index.wrapping_mul(0xa076_1d64_78bd_642f))
            | 1;
        let mut bytes = [0u8; 32];
        for chunk in bytes.chunks_exact_mut(8) {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let word = state.wrapping_mul(0x2545_f491_4f6c_dd1d);
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        StdRng::from_seed(bytes)
    }
}

/// Uniform point cloud in the square `[-extent, extent]^2`, deduplicated on
/// a fine grid so the validator accepts it.
pub fn draw_point_cloud(n: usize, extent: f64, tok: ReplayToken) -> Vec<Vector2<f64>> {
    let mut rng = tok.rng(CLOUD_STREAM);
    let mut seen = std::collections::BTreeSet::new();
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let x: f64 = rng.gen_range(-extent..extent);
        let y: f64 = rng.gen_range(-extent..extent);
        // Snap the dedup key, not the point, so near-duplicates stay apart.
        let key = ((x * 1e6) as i64, (y * 1e6) as i64);
        if seen.insert(key) {
            out.push(Vector2::new(x, y));
        }
    }
    out
}

/// A jittered polygon ring around the origin: `n` vertices in angular order
/// plus the flat constraint edge list closing the loop.
pub fn draw_ring_polygon(
    n: usize,
    base_radius: f64,
    radial_jitter: f64,
    tok: ReplayToken,
) -> (Vec<Vector2<f64>>, Vec<usize>) {
    let n = n.max(3);
    let mut rng = tok.rng(RING_STREAM);
    let mut points = Vec::with_capacity(n);
    for k in 0..n {
        let a = k as f64 * std::f64::consts::TAU / n as f64;
        let r = base_radius * (1.0 + radial_jitter * (rng.gen::<f64>() * 2.0 - 1.0));
        points.push(Vector2::new(r * a.cos(), r * a.sin()));
    }
    let mut edges = Vec::with_capacity(2 * n);
    for k in 0..n {
        edges.push(k);
        edges.push((k + 1) % n);
    }
    (points, edges)
}
