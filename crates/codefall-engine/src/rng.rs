//! Seeded randomness for the scene generators.
//!
//! All random decisions (layout jitter, gaps, keyword and token picks) go
//! through one [`SceneRng`] so that a fixed seed reproduces the whole scene.

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg64;

/// PCG-backed random source with the handful of draws the generators use.
#[derive(Debug, Clone)]
pub struct SceneRng {
    inner: Pcg64,
    seed: u64,
}

impl SceneRng {
    /// Deterministic generator for `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Pcg64::seed_from_u64(seed),
            seed,
        }
    }

    /// Generator seeded from OS entropy. The chosen seed is kept so the run
    /// can be reproduced.
    pub fn from_entropy() -> Self {
        Self::seeded(rand::rngs::OsRng.next_u64())
    }

    /// Build from an optional seed.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// The seed this generator started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform float in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Uniform integer in the closed range `[min, max]`.
    ///
    /// Returns `min` when `max < min`.
    pub fn random_int(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        self.inner.gen_range(min..=max)
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// Fair coin: `true` when the unit draw lands above one half.
    pub fn coin(&mut self) -> bool {
        self.unit() > 0.5
    }
}
