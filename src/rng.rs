//! Seeded random number generation for reproducible fitting.
//!
//! Every restart attempt draws its initial guess from a [`FitRng`] seeded
//! deterministically from the master seed and the attempt's coordinates
//! (window start, window end, attempt index). Parallel and sequential
//! execution therefore produce bit-identical ensembles for a given seed,
//! while entropy-seeded runs remain independent.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Normal};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// ChaCha20-based RNG used throughout the fitting engine.
///
/// ChaCha20 gives a large, splittable seed space and identical streams on
/// every platform, which is what makes the per-attempt seed derivation below
/// reproducible.
#[derive(Debug, Clone)]
pub struct FitRng {
    rng: ChaCha20Rng,
}

impl FitRng {
    /// Create an RNG from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Create an RNG from an explicit seed.
    ///
    /// `seed_from_u64` expands the 64-bit value into the full 256-bit
    /// ChaCha20 key.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Draw a uniform value in `[low, high)`.
    ///
    /// Degenerate ranges (`low == high`) return the bound itself.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..high)
    }

    /// Draw one random u64, used to derive a master seed for entropy runs.
    pub fn random_seed(&mut self) -> u64 {
        self.rng.gen()
    }

    /// Draw a standard normal value.
    pub fn standard_normal(&mut self) -> f64 {
        // Unit normal construction cannot fail.
        let normal = Normal::new(0.0, 1.0).expect("unit normal is well-formed");
        normal.sample(&mut self.rng)
    }
}

/// Derive the seed for one restart attempt from the master seed and the
/// attempt's coordinates.
///
/// Hash-mixes `(window_start, window_end, attempt)` and XORs with the master
/// seed, so distinct attempts get distinct, order-independent streams.
pub fn derive_attempt_seed(master: u64, window_start: usize, window_end: usize, attempt: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    window_start.hash(&mut hasher);
    window_end.hash(&mut hasher);
    attempt.hash(&mut hasher);
    master ^ hasher.finish()
}
