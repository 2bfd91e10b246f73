//! Deterministic text vectors.
//!
//! This is not an embedding model. Each text seeds a ChaCha stream from the
//! SHA-256 digest of its bytes, and the stream is drawn into a Gaussian
//! vector that is then L2-normalised. The same text and dimension give the
//! same vector on every run, process and platform.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

pub const DEFAULT_VECTOR_DIMENSION: usize = 128;

/// Added to the norm before dividing so an all-zero draw stays finite.
const NORM_EPSILON: f32 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeterministicVectorizer {
    dimension: usize,
}

impl Default for DeterministicVectorizer {
    fn default() -> Self {
        Self::new(DEFAULT_VECTOR_DIMENSION)
    }
}

impl DeterministicVectorizer {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        vector(text, self.dimension)
    }
}

/// First eight digest bytes, little endian.
fn seed_for(text: &str) -> u64 {
    let digest = Sha256::digest(text.as_bytes());
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed)
}

/// Standard normal sample via Box-Muller. `1 - u` keeps the log argument in (0, 1].
fn standard_normal(rng: &mut ChaCha8Rng) -> f64 {
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

pub fn vector(text: &str, dim: usize) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed_for(text));
    let mut raw: Vec<f32> = (0..dim).map(|_| standard_normal(&mut rng) as f32).collect();
    normalize_in_place(&mut raw);
    raw
}

pub(crate) fn normalize_in_place(values: &mut [f32]) {
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt() + NORM_EPSILON;
    for v in values.iter_mut() {
        *v /= norm;
    }
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
