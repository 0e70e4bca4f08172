//! Engine output record (`spec.md` §6 "Engine output record").

use crate::spread_kernel::{Cell, IgnitionState};
use crate::surface_fire::byram_flame_length;
use serde::{Deserialize, Serialize};

/// The matrices and scalars one simulation returns to its driver.
///
/// Row-major `Vec<f64>` per matrix, same layout as [`crate::landscape::Landscape`]
/// layers, so a driver can write them straight to a raster without a
/// transposition step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOutput {
    pub num_rows: usize,
    pub num_cols: usize,
    pub global_clock: f64,
    pub ignited_cells: Vec<Cell>,
    pub fire_spread_matrix: Vec<f64>,
    pub flame_length_matrix: Vec<f64>,
    pub fire_line_intensity_matrix: Vec<f64>,
    pub burn_time_matrix: Vec<f64>,
    pub firebrand_count_matrix: Option<Vec<u32>>,
    /// Spread rates clamped from negative to zero over the run
    /// (`spec.md` §7 diagnostic side channel).
    pub clamped_negative_rate_count: u64,
    /// Firebrand log-normal draws clamped from non-finite/negative to zero
    /// displacement over the run (`spec.md` §7 diagnostic side channel).
    pub clamped_lognormal_count: u64,
}

impl EngineOutput {
    /// Builds an output record from the engine's mutable state at
    /// termination. `ignited_cells` is every cell with `fire_spread > 0`, in
    /// row-major order.
    #[must_use]
    pub fn from_state(state: &IgnitionState, global_clock: f64, spotting_enabled: bool) -> Self {
        let mut ignited_cells = Vec::new();
        for row in 0..state.num_rows {
            for col in 0..state.num_cols {
                if state.fire_spread[state.index(row, col)] > 0.0 {
                    ignited_cells.push((row, col));
                }
            }
        }
        Self {
            num_rows: state.num_rows,
            num_cols: state.num_cols,
            global_clock,
            ignited_cells,
            fire_spread_matrix: state.fire_spread.clone(),
            flame_length_matrix: state.flame_length.clone(),
            fire_line_intensity_matrix: state.fire_line_intensity.clone(),
            burn_time_matrix: state.burn_time.clone(),
            firebrand_count_matrix: spotting_enabled.then(|| state.firebrand_count.clone()),
            clamped_negative_rate_count: state.clamped_negative_rate_count,
            clamped_lognormal_count: state.clamped_lognormal_count,
        }
    }

    /// An empty result for a rejected ignition (`spec.md` §4.6 "On invalid
    /// point ignition, return a null result").
    #[must_use]
    pub fn empty(num_rows: usize, num_cols: usize) -> Self {
        let n = num_rows * num_cols;
        Self {
            num_rows,
            num_cols,
            global_clock: 0.0,
            ignited_cells: Vec::new(),
            fire_spread_matrix: vec![0.0; n],
            flame_length_matrix: vec![0.0; n],
            fire_line_intensity_matrix: vec![0.0; n],
            burn_time_matrix: vec![-1.0; n],
            firebrand_count_matrix: None,
            clamped_negative_rate_count: 0,
            clamped_lognormal_count: 0,
        }
    }

    /// Fireline intensity at `(row, col)`, Btu/(ft·s) — a named accessor over
    /// `fire_line_intensity_matrix`, mirroring the teacher's
    /// `FuelElement::byram_fireline_intensity` convenience pattern.
    #[must_use]
    pub fn byram_fireline_intensity(&self, row: usize, col: usize) -> f64 {
        self.fire_line_intensity_matrix[row * self.num_cols + col]
    }

    /// Re-derives flame length at `(row, col)` from the stored fireline
    /// intensity via Byram's formula, without re-running the engine.
    #[must_use]
    pub fn recompute_flame_length(&self, row: usize, col: usize) -> f64 {
        byram_flame_length(self.byram_fireline_intensity(row, col))
    }
}
