//! Landscape grid (`spec.md` §3 "Grid" / "Landscape layers").
//!
//! Flat row-major `Vec<f64>` per layer, indexed `row * num_cols + col` —
//! the same storage convention as the teacher's `grid::terrain::TerrainData`
//! — but the eight fixed layers `spec.md` names instead of a single
//! elevation raster with runtime slope/aspect derivation: this crate
//! receives slope and aspect pre-computed as landscape inputs (loading and
//! derivation are out of scope, see `spec.md` §1).

use crate::fuel_model::is_burnable;
use serde::{Deserialize, Serialize};

/// The eight aligned 2-D landscape layers plus grid geometry.
///
/// Construction validates nothing; `spec.md` §7 assigns dimension-mismatch
/// validation to [`crate::engine`] before a run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Landscape {
    pub num_rows: usize,
    pub num_cols: usize,
    /// Uniform square cell size, ft.
    pub cell_size: f64,
    /// Elevation, ft.
    pub elevation: Vec<f64>,
    /// Slope, rise/run (`tan(theta)`).
    pub slope: Vec<f64>,
    /// Aspect, degrees clockwise from north (downhill-facing direction).
    pub aspect: Vec<f64>,
    /// Fuel model code, 1..256 as `f64`; 91..99 reserved non-burnable.
    pub fuel_model: Vec<f64>,
    /// Canopy height, ft.
    pub canopy_height: Vec<f64>,
    /// Canopy base height, ft.
    pub canopy_base_height: Vec<f64>,
    /// Crown bulk density, lb/ft^3.
    pub crown_bulk_density: Vec<f64>,
    /// Canopy cover, 0..100.
    pub canopy_cover: Vec<f64>,
}

impl Landscape {
    #[must_use]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.num_cols + col
    }

    #[must_use]
    pub fn in_bounds(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.num_rows && (col as usize) < self.num_cols
    }

    /// Whether `(row, col)` carries a burnable fuel model code. Does not
    /// consult `fire_spread` — combine with the ignition matrix for the
    /// full "burnable cell" definition in the Glossary.
    #[must_use]
    pub fn is_burnable_cell(&self, row: usize, col: usize) -> bool {
        is_burnable(self.fuel_model[self.index(row, col)])
    }

    /// All eight layers at `(row, col)` as a flat slice, in declaration
    /// order, for layers other than `fuel_model`/`elevation`/`slope`/
    /// `aspect` that callers pull individually; kept for layer-count
    /// assertions in [`crate::engine`] validation.
    #[must_use]
    pub fn layer_len(&self) -> usize {
        self.num_rows * self.num_cols
    }

    /// The eight 8-neighbor row/col offsets in the canonical order the
    /// azimuth table (`spec.md` §6 "Azimuth table") enumerates them:
    /// N, NE, E, SE, S, SW, W, NW.
    #[must_use]
    pub fn neighbor_offsets() -> [(i64, i64); 8] {
        [
            (-1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
            (1, 0),
            (1, -1),
            (0, -1),
            (-1, -1),
        ]
    }

    /// Whether every layer has exactly `num_rows * num_cols` elements and
    /// all required cells carry finite values (`spec.md` §7 `InvalidInput`:
    /// "landscape dimensions mismatch; non-finite cells in required
    /// layers").
    #[must_use]
    pub fn dimensions_consistent(&self) -> bool {
        let expected = self.layer_len();
        [
            &self.elevation,
            &self.slope,
            &self.aspect,
            &self.fuel_model,
            &self.canopy_height,
            &self.canopy_base_height,
            &self.crown_bulk_density,
            &self.canopy_cover,
        ]
        .iter()
        .all(|layer| layer.len() == expected)
    }

    #[must_use]
    pub fn all_finite(&self) -> bool {
        [
            &self.elevation,
            &self.slope,
            &self.aspect,
            &self.fuel_model,
            &self.canopy_height,
            &self.canopy_base_height,
            &self.crown_bulk_density,
            &self.canopy_cover,
        ]
        .iter()
        .all(|layer| layer.iter().all(|v| v.is_finite()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_landscape(num_rows: usize, num_cols: usize, fuel_model: f64) -> Landscape {
        let n = num_rows * num_cols;
        Landscape {
            num_rows,
            num_cols,
            cell_size: 30.0,
            elevation: vec![0.0; n],
            slope: vec![0.0; n],
            aspect: vec![0.0; n],
            fuel_model: vec![fuel_model; n],
            canopy_height: vec![0.0; n],
            canopy_base_height: vec![0.0; n],
            crown_bulk_density: vec![0.0; n],
            canopy_cover: vec![0.0; n],
        }
    }

    #[test]
    fn index_is_row_major() {
        let ls = flat_landscape(3, 4, 1.0);
        assert_eq!(ls.index(0, 0), 0);
        assert_eq!(ls.index(1, 0), 4);
        assert_eq!(ls.index(2, 3), 11);
    }

    #[test]
    fn in_bounds_rejects_negative_and_overflow() {
        let ls = flat_landscape(5, 5, 1.0);
        assert!(ls.in_bounds(0, 0));
        assert!(ls.in_bounds(4, 4));
        assert!(!ls.in_bounds(-1, 0));
        assert!(!ls.in_bounds(0, 5));
    }

    #[test]
    fn burnable_cell_respects_barrier_range() {
        let ls = flat_landscape(2, 2, 95.0);
        assert!(!ls.is_burnable_cell(0, 0));
        let ls = flat_landscape(2, 2, 1.0);
        assert!(ls.is_burnable_cell(0, 0));
    }

    #[test]
    fn neighbor_offsets_match_azimuth_table_order() {
        let offsets = Landscape::neighbor_offsets();
        assert_eq!(offsets[0], (-1, 0));
        assert_eq!(offsets[4], (1, 0));
        assert_eq!(offsets.len(), 8);
    }

    #[test]
    fn dimensions_consistent_flags_mismatch() {
        let mut ls = flat_landscape(2, 2, 1.0);
        assert!(ls.dimensions_consistent());
        ls.slope.pop();
        assert!(!ls.dimensions_consistent());
    }

    #[test]
    fn all_finite_flags_nan() {
        let mut ls = flat_landscape(2, 2, 1.0);
        assert!(ls.all_finite());
        ls.elevation[0] = f64::NAN;
        assert!(!ls.all_finite());
    }
}
