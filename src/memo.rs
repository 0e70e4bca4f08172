//! Bounded memoization for Rothermel spread-info computations (`spec.md` §9
//! Design Notes: "implementations MAY memoize `rothermel_no_wind_no_slope` on
//! `(fuel_model_number, fuel_moisture)`", and `spec.md` "Replace the source's
//! globally-memoized function with a per-engine **bounded** mapping").
//!
//! Grounded on the teacher's `core_types::spatial::SpatialIndex`, which keys
//! an `FxHashMap` by a hashed coordinate rather than a derived struct key —
//! the same shape used here, with moisture quantized to four decimal places
//! so nearly-identical floats collapse to one cache entry instead of missing
//! on floating-point noise. The eviction policy is a hand-rolled
//! least-recently-used scan rather than pulling in a dedicated `lru` crate,
//! matching the teacher's preference for small hand-rolled data structures
//! over a crate for a need this small.

use crate::fuel_model::{build_fuel_model, FuelModel};
use crate::fuel_moisture::FuelMoisture;
use crate::surface_fire::{rothermel_no_wind_no_slope, SpreadInfoMin};
use rustc_hash::FxHashMap;

/// Quantized cache key: a fuel model number plus its five moisture fractions
/// rounded to four decimal places.
type CacheKey = (u16, [i64; 5]);

/// Upper bound on resident entries before the least-recently-used one is
/// evicted. Comfortably larger than the handful of distinct
/// `(fuel_model_number, moisture)` combinations a single landscape/weather
/// pairing produces in practice, while still bounding memory on pathological
/// inputs (e.g. a per-pixel moisture perturbation that defeats quantization).
const DEFAULT_CAPACITY: usize = 4096;

fn quantize(value: f64) -> i64 {
    (value * 10_000.0).round() as i64
}

fn cache_key(fuel_model_number: u16, moisture: &FuelMoisture) -> CacheKey {
    (
        fuel_model_number,
        [
            quantize(moisture.dead_1hr),
            quantize(moisture.dead_10hr),
            quantize(moisture.dead_100hr),
            quantize(moisture.live_herb),
            quantize(moisture.live_woody),
        ],
    )
}

/// Per-simulation, bounded, least-recently-used memoization cache for
/// [`rothermel_no_wind_no_slope`].
///
/// Not thread-safe by itself; `spread_kernel` gives each parallel simulation
/// its own `SpreadInfoCache` rather than sharing one behind a lock, matching
/// the teacher's per-task ownership model for `SpatialIndex`.
pub struct SpreadInfoCache {
    entries: FxHashMap<CacheKey, (SpreadInfoMin, u64)>,
    capacity: usize,
    clock: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl SpreadInfoCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity.min(1024), Default::default()),
            capacity: capacity.max(1),
            clock: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Evicts the entry with the oldest `last_used` tick. Called only once
    /// `entries.len() == capacity` and a fresh key is about to be inserted.
    fn evict_least_recently_used(&mut self) {
        if let Some(victim) = self
            .entries
            .iter()
            .min_by_key(|(_, (_, last_used))| *last_used)
            .map(|(key, _)| *key)
        {
            self.entries.remove(&victim);
            self.evictions += 1;
        }
    }

    /// Look up or compute the no-wind, no-slope spread info for `fuel_model`
    /// moisturized by `moisture`. Returns `None` if `fuel_model_number` has
    /// no registered fuel model (non-burnable).
    pub fn get_or_compute(
        &mut self,
        fuel_model_number: u16,
        moisture: &FuelMoisture,
    ) -> Option<SpreadInfoMin> {
        let key = cache_key(fuel_model_number, moisture);
        self.clock += 1;
        if let Some((min, last_used)) = self.entries.get_mut(&key) {
            self.hits += 1;
            *last_used = self.clock;
            return Some(*min);
        }
        self.misses += 1;
        let fuel_model: FuelModel = build_fuel_model(fuel_model_number)?.moisturize(moisture);
        let min = rothermel_no_wind_no_slope(&fuel_model);
        if self.entries.len() >= self.capacity {
            self.evict_least_recently_used();
        }
        self.entries.insert(key, (min, self.clock));
        Some(min)
    }

    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn evictions(&self) -> u64 {
        self.evictions
    }
}

impl Default for SpreadInfoCache {
    fn default() -> Self {
        Self::new()
    }
}
