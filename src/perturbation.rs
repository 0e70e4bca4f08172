//! Per-layer weather/fuel perturbations (`spec.md` §3 "Perturbations",
//! §4.3 `sample_at` step 3).
//!
//! Grounded on [`crate::rng`]'s split between `EngineRng` (sequential,
//! order-dependent draws) and [`crate::rng::keyed_uniform`] (order-
//! independent draws keyed by layer/cell/epoch): a `global` perturbation is
//! one `EngineRng` draw taken once at simulation setup, a `pixel`
//! perturbation is redrawn per cell (and per `frequency`-minute band) via
//! `keyed_uniform` so two simulations stepping cells in different orders
//! still agree on the same cell's offset.

use crate::rng::{keyed_uniform, EngineRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpatialType {
    Global,
    Pixel,
}

/// Static perturbation configuration for one landscape or weather layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Perturbation {
    pub spatial_type: SpatialType,
    pub lo: f64,
    pub hi: f64,
    /// Re-draw cadence in minutes for `pixel` perturbations. `None` means
    /// the per-cell offset is fixed for the whole simulation.
    pub frequency: Option<f64>,
}

/// A [`Perturbation`] bound to one simulation: carries the single
/// pre-drawn offset a `global` perturbation needs (`pixel` perturbations
/// need no simulation-level state, since `keyed_uniform` is self-contained).
#[derive(Debug, Clone, Copy)]
pub struct ActivePerturbation {
    config: Perturbation,
    global_offset: f64,
}

impl ActivePerturbation {
    /// Binds `config` to one simulation, drawing the `global` offset now
    /// (a no-op draw for `pixel` perturbations, which ignore it).
    pub fn new(config: Perturbation, rng: &mut EngineRng) -> Self {
        let global_offset = match config.spatial_type {
            SpatialType::Global => rng.uniform_float(config.lo, config.hi),
            SpatialType::Pixel => 0.0,
        };
        Self {
            config,
            global_offset,
        }
    }

    /// The offset to add to a raw sampled value at `(row, col)` under
    /// `base_seed`/`layer`/`global_clock`.
    #[must_use]
    pub fn offset(&self, base_seed: u64, layer: &str, row: usize, col: usize, global_clock: f64) -> f64 {
        match self.config.spatial_type {
            SpatialType::Global => self.global_offset,
            SpatialType::Pixel => {
                let epoch = match self.config.frequency {
                    Some(freq) if freq > 0.0 => (global_clock / freq).floor() as i64,
                    _ => 0,
                };
                keyed_uniform(base_seed, layer, row, col, epoch, self.config.lo, self.config.hi)
            }
        }
    }
}
