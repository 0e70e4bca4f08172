//! Weather/Landfire sampling (`spec.md` §4.3).
//!
//! Mirrors the teacher's small, composed sampler functions (see
//! `weather::mod` for the pattern of one pure function per derived
//! quantity) but builds the sampler around `spec.md`'s exact three-step
//! `sample_at` recipe: resolution-multiplier remap, hourly band selection,
//! then perturbation.

use crate::fuel_moisture::{fuel_moisture, FuelMoisture};
use crate::landscape::Landscape;
use crate::perturbation::ActivePerturbation;
use serde::{Deserialize, Serialize};

/// One weather input variable: a single value for the whole run/grid, or an
/// hourly-banded raster stack at the weather grid's native (possibly
/// coarser) resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WeatherVariable {
    /// Constant value (including "scalar drawn per simulation" — the
    /// driver draws it once before constructing this variant).
    Scalar(f64),
    /// One 2-D band per hour, each `raster_rows * raster_cols` elements,
    /// row-major.
    RasterStack {
        bands: Vec<Vec<f64>>,
        raster_rows: usize,
        raster_cols: usize,
    },
}

impl WeatherVariable {
    fn raw_value_at(&self, row: usize, col: usize, global_clock: f64, multiplier: usize) -> f64 {
        match self {
            WeatherVariable::Scalar(v) => *v,
            WeatherVariable::RasterStack {
                bands,
                raster_rows,
                raster_cols,
            } => {
                let m = multiplier.max(1);
                let raster_row = (row / m).min(raster_rows.saturating_sub(1));
                let raster_col = (col / m).min(raster_cols.saturating_sub(1));
                let band_index = ((global_clock / 60.0).floor() as usize).min(bands.len().saturating_sub(1));
                bands[band_index][raster_row * raster_cols + raster_col]
            }
        }
    }
}

/// `sample_at(raster, here, global_clock, multiplier, perturb)`.
#[must_use]
pub fn sample_at(
    variable: &WeatherVariable,
    row: usize,
    col: usize,
    global_clock: f64,
    multiplier: usize,
    perturb: Option<(&ActivePerturbation, u64, &str)>,
) -> f64 {
    let raw = variable.raw_value_at(row, col, global_clock, multiplier);
    match perturb {
        Some((active, base_seed, layer)) => raw + active.offset(base_seed, layer, row, col, global_clock),
        None => raw,
    }
}

/// The four weather variables `spec.md` §3 names, plus the shared
/// resolution multiplier between weather rasters and the landscape grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weather {
    pub temperature: WeatherVariable,
    pub relative_humidity: WeatherVariable,
    pub wind_speed_20ft: WeatherVariable,
    pub wind_from_direction: WeatherVariable,
    pub resolution_multiplier: usize,
}

/// Per-layer perturbation bindings, one per named layer, looked up by name
/// in [`extract_constants`]. Layers without an entry are not perturbed.
pub struct PerturbationSet<'a> {
    pub base_seed: u64,
    pub entries: Vec<(&'a str, &'a ActivePerturbation)>,
}

impl<'a> PerturbationSet<'a> {
    fn lookup(&self, layer: &str) -> Option<(&'a ActivePerturbation, u64, &'a str)> {
        self.entries
            .iter()
            .find(|(name, _)| *name == layer)
            .map(|(name, active)| (*active, self.base_seed, *name))
    }
}

/// Per-cell, per-clock bundle the spread kernel consumes directly
/// (`spec.md` §4.3 `extract_constants`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constants {
    pub aspect: f64,
    pub slope: f64,
    pub canopy_height: f64,
    pub canopy_base_height: f64,
    pub crown_bulk_density: f64,
    pub canopy_cover: f64,
    pub fuel_model: f64,
    pub wind_speed_20ft: f64,
    pub wind_from_direction: f64,
    pub temperature: f64,
    pub relative_humidity: f64,
}

/// `extract_constants(landscape, weather, clock, cell)`.
#[must_use]
pub fn extract_constants(
    landscape: &Landscape,
    weather: &Weather,
    global_clock: f64,
    row: usize,
    col: usize,
    perturbations: Option<&PerturbationSet<'_>>,
) -> Constants {
    let idx = landscape.index(row, col);
    let m = weather.resolution_multiplier;

    let sample = |name: &str, variable: &WeatherVariable| {
        let perturb = perturbations.and_then(|set| set.lookup(name));
        sample_at(variable, row, col, global_clock, m, perturb)
    };

    Constants {
        aspect: landscape.aspect[idx],
        slope: landscape.slope[idx],
        canopy_height: landscape.canopy_height[idx],
        canopy_base_height: landscape.canopy_base_height[idx],
        crown_bulk_density: landscape.crown_bulk_density[idx],
        canopy_cover: landscape.canopy_cover[idx],
        fuel_model: landscape.fuel_model[idx],
        wind_speed_20ft: sample("wind_speed_20ft", &weather.wind_speed_20ft),
        wind_from_direction: sample("wind_from_direction", &weather.wind_from_direction),
        temperature: sample("temperature", &weather.temperature),
        relative_humidity: sample("relative_humidity", &weather.relative_humidity),
    }
}

impl Constants {
    #[must_use]
    pub fn fuel_moisture(&self) -> FuelMoisture {
        fuel_moisture(self.relative_humidity, self.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_landscape() -> Landscape {
        let n = 4 * 4;
        Landscape {
            num_rows: 4,
            num_cols: 4,
            cell_size: 30.0,
            elevation: vec![0.0; n],
            slope: vec![0.1; n],
            aspect: vec![180.0; n],
            fuel_model: vec![1.0; n],
            canopy_height: vec![0.0; n],
            canopy_base_height: vec![0.0; n],
            crown_bulk_density: vec![0.0; n],
            canopy_cover: vec![0.0; n],
        }
    }

    #[test]
    fn scalar_variable_ignores_clock_and_position() {
        let v = WeatherVariable::Scalar(12.5);
        assert_eq!(sample_at(&v, 0, 0, 0.0, 1, None), 12.5);
        assert_eq!(sample_at(&v, 3, 2, 500.0, 4, None), 12.5);
    }

    #[test]
    fn raster_stack_selects_hourly_band() {
        let v = WeatherVariable::RasterStack {
            bands: vec![vec![1.0, 2.0, 3.0, 4.0], vec![10.0, 20.0, 30.0, 40.0]],
            raster_rows: 2,
            raster_cols: 2,
        };
        assert_eq!(sample_at(&v, 0, 0, 0.0, 1, None), 1.0);
        assert_eq!(sample_at(&v, 0, 0, 61.0, 1, None), 10.0);
    }

    #[test]
    fn multiplier_remaps_into_coarser_weather_grid() {
        let v = WeatherVariable::RasterStack {
            bands: vec![vec![1.0, 2.0, 3.0, 4.0]],
            raster_rows: 2,
            raster_cols: 2,
        };
        // landscape cell (3,3) with multiplier 2 maps to weather cell (1,1).
        assert_eq!(sample_at(&v, 3, 3, 0.0, 2, None), 4.0);
    }

    #[test]
    fn extract_constants_pulls_landscape_and_weather() {
        let landscape = flat_landscape();
        let weather = Weather {
            temperature: WeatherVariable::Scalar(80.0),
            relative_humidity: WeatherVariable::Scalar(25.0),
            wind_speed_20ft: WeatherVariable::Scalar(5.0),
            wind_from_direction: WeatherVariable::Scalar(270.0),
            resolution_multiplier: 1,
        };
        let c = extract_constants(&landscape, &weather, 0.0, 1, 1, None);
        assert_eq!(c.temperature, 80.0);
        assert_eq!(c.aspect, 180.0);
        assert_eq!(c.fuel_model, 1.0);
        assert!(c.fuel_moisture().dead_1hr > 0.0);
    }
}
