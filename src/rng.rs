//! Seeded stochastic draws.
//!
//! `spec.md` §9 requires all randomness to flow through one seeded generator
//! per simulation, with a fixed draw order (wind deltas, then perpendicular
//! deltas, then per-firebrand landing gates) so tests can reproduce a run bit
//! for bit. [`EngineRng`] wraps `rand::rngs::StdRng` (deterministic for a
//! given `rand` release, matching the teacher crate's sole dependency on
//! `rand` — no `rand_chacha` pin needed at this crate's scale) and exposes
//! exactly the four primitives the spec names.
//!
//! Per-cell / per-layer perturbations need a second, *order-independent* way
//! to draw a value: two engines, or two parallel iterations of the same
//! step, must derive the same pixel offset for cell `(i, j)` regardless of
//! what order cells are visited in. [`keyed_uniform`] hashes the key
//! (`base_seed`, layer name, cell, epoch) with `rustc_hash`'s `FxHasher` (the
//! teacher crate's hashing dependency) into a fresh seed and draws from a
//! throwaway `StdRng`, so the result depends only on the key.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal, Normal};
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// One seeded generator per simulation.
pub struct EngineRng {
    rng: StdRng,
}

impl EngineRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `uniform_float(lo, hi)`: draw from `[lo, hi]`.
    pub fn uniform_float(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// `uniform_int(lo, hi)`: draw an inclusive integer from `[lo, hi]`.
    pub fn uniform_int(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// `lognormal(mu, sigma)`. Degenerates to zero displacement (`exp(mu)`
    /// with no spread) when `sigma <= 0`, per the `NumericDomain` recovery
    /// rule in `spec.md` §7 rather than panicking.
    pub fn lognormal(&mut self, mu: f64, sigma: f64) -> f64 {
        if sigma <= 0.0 {
            return mu.exp();
        }
        LogNormal::new(mu, sigma)
            .map(|d| d.sample(&mut self.rng))
            .unwrap_or_else(|_| mu.exp())
    }

    /// `normal(mu, sigma)`. Degenerates to `mu` when `sigma <= 0`.
    pub fn normal(&mut self, mu: f64, sigma: f64) -> f64 {
        if sigma <= 0.0 {
            return mu;
        }
        Normal::new(mu, sigma)
            .map(|d| d.sample(&mut self.rng))
            .unwrap_or(mu)
    }

    /// Draw a uniform(0,1) value, used for ignition-probability gates.
    pub fn unit(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }
}

/// Order-independent uniform draw keyed by `(base_seed, layer, cell, epoch)`.
///
/// Used for `pixel`-spatial perturbations, whose value must be reproducible
/// within a `frequency`-minute band regardless of iteration order (`spec.md`
/// §4.3, §8 "Perturbation reproducibility").
pub fn keyed_uniform(
    base_seed: u64,
    layer: &str,
    row: usize,
    col: usize,
    epoch: i64,
    lo: f64,
    hi: f64,
) -> f64 {
    if hi <= lo {
        return lo;
    }
    let mut hasher = FxHasher::default();
    base_seed.hash(&mut hasher);
    layer.hash(&mut hasher);
    row.hash(&mut hasher);
    col.hash(&mut hasher);
    epoch.hash(&mut hasher);
    let derived_seed = hasher.finish();
    let mut rng = StdRng::seed_from_u64(derived_seed);
    let u: f64 = rng.gen_range(0.0..1.0);
    lo + u * (hi - lo)
}
