//! Random sources for selection.
//!
//! Selection needs exactly two draws: a float in `[0, 1)` and an integer in
//! `[0, n)`. [`RandomSource`] is the seam; [`SeededRandom`] is the default,
//! seedable implementation so decisions are reproducible in tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The two uniform draws selection policies consume.
pub trait RandomSource {
    /// Uniform float in `[0, 1)`.
    fn uniform_float(&mut self) -> f64;

    /// Uniform integer in `[0, n)`. Callers guarantee `n > 0`.
    fn uniform_int(&mut self, n: usize) -> usize;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn uniform_float(&mut self) -> f64 {
        (**self).uniform_float()
    }

    fn uniform_int(&mut self, n: usize) -> usize {
        (**self).uniform_int(n)
    }
}

/// Seedable [`RandomSource`] backed by `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Restart the stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// The seed this stream was last started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for SeededRandom {
    /// Deterministic by default (seed 0).
    fn default() -> Self {
        Self::new(0)
    }
}

impl RandomSource for SeededRandom {
    fn uniform_float(&mut self) -> f64 {
        self.rng.random()
    }

    fn uniform_int(&mut self, n: usize) -> usize {
        self.rng.random_range(0..n.max(1))
    }
}
