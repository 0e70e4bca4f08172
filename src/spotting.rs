//! Firebrand spotting (`spec.md` §4.5).
//!
//! Grounded on the teacher's `physics::albini_spotting` module for doc
//! style (one function per named sub-formula, SI units called out in the
//! signature) but following `spec.md`'s exact gating/dispersal/accounting/
//! scheduling pipeline rather than the teacher's single-draw simplification.
//!
//! # References
//! - Albini, F.A. (1979). "Spot fire distance from burning trees: a
//!   predictive model." USDA Forest Service General Technical Report
//!   INT-56.
//! - Albini, F.A. (1983). "Potential spotting distance from wind-driven
//!   surface fires." USDA Forest Service Research Paper INT-309.
//! - Schroeder, M.J. (1969). "Ignition probability" (heat-of-preignition
//!   formulation as adopted by NFDRS).

use crate::fuel_moisture::fuel_moisture;
use crate::landscape::Landscape;
use crate::rng::EngineRng;
use crate::spread_kernel::{Cell, IgnitionState};
use crate::trajectory::BurnTrajectory;
use crate::units::{
    btu_ft_s_to_kw_m, fahrenheit_to_celsius, fahrenheit_to_kelvin, feet_to_meters, meters_to_feet,
    mph_to_ms, GRAVITY_MS2,
};
use crate::weather_sampler::Constants;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A bound that may be fixed or drawn uniformly at simulation time
/// (`spec.md` §6 "`num_firebrands: int|{lo,hi}` with each bound possibly a
/// `[min,max]` uniform-int range").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FirebrandBound {
    Fixed(i64),
    Range(i64, i64),
}

impl FirebrandBound {
    fn resolve(self, rng: &mut EngineRng) -> i64 {
        match self {
            FirebrandBound::Fixed(v) => v,
            FirebrandBound::Range(lo, hi) => rng.uniform_int(lo, hi),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NumFirebrands {
    Scalar(i64),
    Range { lo: FirebrandBound, hi: FirebrandBound },
}

impl NumFirebrands {
    fn resolve(self, rng: &mut EngineRng) -> i64 {
        match self {
            NumFirebrands::Scalar(v) => v,
            NumFirebrands::Range { lo, hi } => {
                let lo = lo.resolve(rng);
                let hi = hi.resolve(rng);
                rng.uniform_int(lo, hi)
            }
        }
    }
}

/// A scalar or uniform range percent (`spec.md` §6
/// `crown_fire_spotting_percent: number|[lo,hi]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PercentOrRange {
    Scalar(f64),
    Range(f64, f64),
}

impl PercentOrRange {
    fn resolve(self, rng: &mut EngineRng) -> f64 {
        match self {
            PercentOrRange::Scalar(v) => v,
            PercentOrRange::Range(lo, hi) => rng.uniform_float(lo, hi),
        }
    }
}

/// Surface-fire spotting gate: fires only above a critical intensity, with
/// a fuel-model-keyed spot percent table (`spec.md` §6
/// `surface_fire_spotting`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceFireSpotting {
    pub critical_fire_line_intensity: f64,
    /// Ordered `[(fm_lo, fm_hi), percent]` ranges. Later entries override
    /// earlier ones on overlap (`spec.md` §9 Open Questions).
    pub spot_percent: Vec<((f64, f64), f64)>,
}

impl SurfaceFireSpotting {
    fn percent_for(&self, fuel_model_number: f64) -> f64 {
        let mut result = 0.0;
        for ((lo, hi), percent) in &self.spot_percent {
            if fuel_model_number >= *lo && fuel_model_number <= *hi {
                result = *percent;
            }
        }
        result
    }
}

/// Spotting configuration (`spec.md` §6 `spotting`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpottingConfig {
    pub num_firebrands: NumFirebrands,
    pub ambient_gas_density: f64,
    pub specific_heat_gas: f64,
    pub decay_constant: f64,
    pub crown_fire_spotting_percent: PercentOrRange,
    pub surface_fire_spotting: Option<SurfaceFireSpotting>,
}

/// A pending or eligible spot ignition (`spec.md` §3 "Spot schedule").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotIgnition {
    pub cell: Cell,
    pub t_ignite: f64,
    pub p: f64,
}

/// `crown_spot_fire?` (`spec.md` §4.5 Gating).
#[must_use]
pub fn crown_spot_fire(percent: PercentOrRange, rng: &mut EngineRng) -> bool {
    let p = percent.resolve(rng);
    p >= rng.unit()
}

/// `surface_fire_spot_fire?` (`spec.md` §4.5 Gating).
#[must_use]
pub fn surface_fire_spot_fire(
    intensity: f64,
    config: Option<&SurfaceFireSpotting>,
    fuel_model_number: f64,
    rng: &mut EngineRng,
) -> bool {
    let Some(config) = config else { return false };
    if intensity <= config.critical_fire_line_intensity {
        return false;
    }
    let percent = config.percent_for(fuel_model_number);
    percent >= rng.unit()
}

/// `schroeder_ign_prob(rh, temp)` (`spec.md` §4.5).
#[must_use]
pub fn schroeder_ign_prob(relative_humidity: f64, temperature_f: f64) -> f64 {
    let moisture = fuel_moisture(relative_humidity, temperature_f).dead_1hr;
    let t_c = fahrenheit_to_celsius(temperature_f);
    let t_ig = 320.0;
    let c_f = 0.266 + 0.0016 * (t_ig + t_c) / 2.0;
    let q_ig = (t_ig - t_c) * c_f
        + (100.0 - t_c) * moisture
        + 18.54 * (1.0 - (-15.1 * moisture).exp())
        + 540.0 * moisture;
    let x = (400.0 - q_ig) / 10.0;
    (4.8e-5 * x.powf(4.3) / 50.0).max(0.0)
}

/// `deltas_wind_to_coord`: projects a parallel/perpendicular log-normal
/// displacement (meters) into grid-plane `(row_offset, col_offset)` feet,
/// consistent with the `offset_to_degrees` azimuth convention (`spec.md`
/// §4.5 Dispersal, §6 Azimuth table: north is `-row`, east is `+col`).
fn deltas_wind_to_coord(d_parallel_m: f64, d_perpendicular_m: f64, wind_from_direction: f64) -> (f64, f64) {
    let wind_to_direction = (wind_from_direction + 180.0).rem_euclid(360.0);
    let d_par_ft = meters_to_feet(d_parallel_m);
    let d_perp_ft = meters_to_feet(d_perpendicular_m);
    let h = d_par_ft.hypot(d_perp_ft);
    let theta = wind_to_direction.to_radians() + d_perp_ft.atan2(d_par_ft);
    let dx = -h * theta.cos();
    let dy = h * theta.sin();
    (dx, dy)
}

/// Truncates a feet offset from a cell center into a whole-cell row/column
/// delta, via the half-cell `step` `spec.md` §4.5 specifies.
fn offset_to_cell_delta(offset_ft: f64, cell_size: f64) -> i64 {
    let step = cell_size / 2.0;
    let half_cell_units = (step + offset_ft) / step;
    (half_cell_units.trunc() / 2.0).trunc() as i64
}

/// One sampled firebrand's displacement from the source cell, in whole-cell
/// row/column deltas.
#[allow(clippy::too_many_arguments)]
fn sample_firebrand_landing(
    intensity_btu_ft_s: f64,
    wind_speed_20ft_mph: f64,
    wind_from_direction: f64,
    temperature_f: f64,
    config: &SpottingConfig,
    cell_size: f64,
    rng: &mut EngineRng,
    state: &mut IgnitionState,
) -> (i64, i64) {
    let intensity_si = btu_ft_s_to_kw_m(intensity_btu_ft_s);
    let wind_si = mph_to_ms(wind_speed_20ft_mph).max(0.01);
    let temp_k = fahrenheit_to_kelvin(temperature_f);

    let l_c = (intensity_si / (config.ambient_gas_density * config.specific_heat_gas * temp_k * GRAVITY_MS2.sqrt()))
        .max(1e-6)
        .powf(2.0 / 3.0);
    let froude = wind_si / (GRAVITY_MS2 * l_c).sqrt();
    let buoyancy_driven = froude <= 1.0;

    let (mu, sigma) = if buoyancy_driven {
        (
            1.47 * intensity_si.max(1e-6).powf(0.54) * wind_si.powf(-0.55) + 1.14,
            0.86 * intensity_si.max(1e-6).powf(-0.21) * wind_si.powf(0.44) + 0.19,
        )
    } else {
        (
            1.32 * intensity_si.max(1e-6).powf(0.26) * wind_si.powf(0.11) - 0.02,
            4.95 * intensity_si.max(1e-6).powf(-0.01) * wind_si.powf(-0.02) - 3.48,
        )
    };

    let d_parallel_raw = rng.lognormal(mu, sigma);
    let d_parallel = if d_parallel_raw.is_finite() && d_parallel_raw >= 0.0 {
        d_parallel_raw
    } else {
        state.clamped_lognormal_count += 1;
        warn!(draw = d_parallel_raw, mu, sigma, "clamped invalid firebrand log-normal draw to zero displacement");
        0.0
    };
    let d_perpendicular = rng.normal(0.0, 0.92);

    let (dx, dy) = deltas_wind_to_coord(d_parallel, d_perpendicular, wind_from_direction);
    (
        offset_to_cell_delta(dx, cell_size),
        offset_to_cell_delta(dy, cell_size),
    )
}

/// Invoked once per ignition event (`spec.md` §4.5): gates, disperses
/// firebrands, tallies `firebrand_count`, and schedules any spot ignitions
/// that clear the Schroeder probability gate.
#[allow(clippy::too_many_arguments)]
pub fn collect_spot_ignitions(
    source: Cell,
    intensity: f64,
    crown_fire: bool,
    landscape: &Landscape,
    state: &mut IgnitionState,
    constants: &Constants,
    config: &SpottingConfig,
    global_clock: f64,
    dt: f64,
    flame_length: f64,
    rng: &mut EngineRng,
) -> Vec<SpotIgnition> {
    let fires = if crown_fire {
        crown_spot_fire(config.crown_fire_spotting_percent, rng)
    } else {
        surface_fire_spot_fire(
            intensity,
            config.surface_fire_spotting.as_ref(),
            constants.fuel_model,
            rng,
        )
    };
    if !fires {
        return Vec::new();
    }

    let count = config.num_firebrands.resolve(rng).max(0);
    let source_elevation = landscape.elevation[landscape.index(source.0, source.1)];
    let mut scheduled = Vec::new();

    for _ in 0..count {
        let (row_delta, col_delta) = sample_firebrand_landing(
            intensity,
            constants.wind_speed_20ft,
            constants.wind_from_direction,
            constants.temperature,
            config,
            landscape.cell_size,
            rng,
            state,
        );
        let landing_row = source.0 as i64 + row_delta;
        let landing_col = source.1 as i64 + col_delta;
        if !landscape.in_bounds(landing_row, landing_col) {
            continue;
        }
        let (landing_row, landing_col) = (landing_row as usize, landing_col as usize);
        if !state.is_burnable_unburned(landscape, landing_row, landing_col) {
            continue;
        }

        let idx = state.index(landing_row, landing_col);
        state.firebrand_count[idx] += 1;
        let k = state.firebrand_count[idx];

        let dest_elevation = landscape.elevation[landscape.index(landing_row, landing_col)];
        let terrain_distance = BurnTrajectory::compute_terrain_distance(
            landscape.cell_size,
            landing_row as i64 - source.0 as i64,
            landing_col as i64 - source.1 as i64,
            dest_elevation - source_elevation,
        );

        let p_schroeder = schroeder_ign_prob(constants.relative_humidity, constants.temperature);
        let decay = (-config.decay_constant * terrain_distance).exp();
        let p_spot = 1.0 - (1.0 - p_schroeder * decay).powi(k as i32);

        if p_spot > rng.unit() {
            let t_ignite = ignition_time(
                global_clock + dt,
                flame_length,
                constants.wind_speed_20ft,
            );
            scheduled.push(SpotIgnition {
                cell: (landing_row, landing_col),
                t_ignite,
                p: p_schroeder * decay,
            });
        }
    }

    scheduled
}

/// `t_ignite = global_clock + 2*t_max_height + 20` (`spec.md` §4.5
/// "Ignition time").
fn ignition_time(global_clock: f64, flame_length_ft: f64, wind_speed_20ft_mph: f64) -> f64 {
    global_clock + 2.0 * t_max_height(flame_length_ft, wind_speed_20ft_mph) + 20.0
}

fn t_max_height(flame_length_ft: f64, wind_speed_20ft_mph: f64) -> f64 {
    let flame_length_m = feet_to_meters(flame_length_ft).max(1e-6);
    let wind_si = mph_to_ms(wind_speed_20ft_mph).max(0.1);
    let d = 0.003;
    let z_max = 0.39 * d * 1.0e5;
    let a = 5.963;
    let b = a - 1.4;
    let seconds = 2.0 * flame_length_m / wind_si + 1.2
        + (a / 3.0) * ((b + z_max / flame_length_m) / a).powf(1.5)
        - a / 3.0;
    seconds / 60.0
}

/// Merges spot ignitions into `schedule`, keeping the earliest `t_ignite`
/// per cell on conflict (`spec.md` §3 "Spot schedule").
pub fn merge_spot_schedule(schedule: &mut rustc_hash::FxHashMap<Cell, SpotIgnition>, incoming: Vec<SpotIgnition>) {
    for spot in incoming {
        schedule
            .entry(spot.cell)
            .and_modify(|existing| {
                if spot.t_ignite < existing.t_ignite {
                    *existing = spot;
                }
            })
            .or_insert(spot);
    }
}

/// Splits `schedule` into `(due, pending)` given the current step's horizon
/// `global_clock + dt` (`spec.md` §4.4.5).
#[must_use]
pub fn split_due(
    schedule: rustc_hash::FxHashMap<Cell, SpotIgnition>,
    horizon: f64,
) -> (Vec<SpotIgnition>, rustc_hash::FxHashMap<Cell, SpotIgnition>) {
    let mut due = Vec::new();
    let mut pending = rustc_hash::FxHashMap::default();
    for (cell, spot) in schedule {
        if spot.t_ignite <= horizon {
            due.push(spot);
        } else {
            pending.insert(cell, spot);
        }
    }
    due.sort_unstable_by_key(|s| s.cell);
    (due, pending)
}
