//! The front-tracking spread kernel (`spec.md` §4.4).
//!
//! Grounded on the teacher's `solver::cpu` module for the shape of a
//! stepped, single-threaded solver driven by an explicit state struct
//! rather than a generator/future; the state here is `ActiveFront`, a
//! `Map<source, Vec<BurnTrajectory>>` held by value and replaced per step,
//! following the "hold trajectories by value" design note in `spec.md` §9
//! rather than the source's mutable-cell-per-trajectory approach.

use crate::crown_fire::{crown_fire_eccentricity, crown_fire_line_intensity, cruz_crown_spread, van_wagner_initiation};
use crate::landscape::Landscape;
use crate::memo::SpreadInfoCache;
use crate::surface_fire::{
    anderson_flame_depth, byram_flame_length, byram_intensity, rothermel_any, rothermel_max,
    wind_adjustment_factor, SpreadInfoMax,
};
use crate::trajectory::{offset_to_degrees, BurnTrajectory};
use crate::units::mph_to_ft_per_min;
use crate::weather_sampler::{extract_constants, PerturbationSet, Weather};
use rustc_hash::FxHashMap;
use tracing::warn;

pub type Cell = (usize, usize);
/// `Map<source, Vec<BurnTrajectory>>` (`spec.md` §3 "active_front", §9
/// "Grid as a value").
pub type ActiveFront = FxHashMap<Cell, Vec<BurnTrajectory>>;

/// The four mutable per-simulation result matrices (`spec.md` §3 "Ignition
/// State"), plus the optional firebrand tally.
pub struct IgnitionState {
    pub num_rows: usize,
    pub num_cols: usize,
    pub fire_spread: Vec<f64>,
    pub flame_length: Vec<f64>,
    pub fire_line_intensity: Vec<f64>,
    pub burn_time: Vec<f64>,
    pub firebrand_count: Vec<u32>,
    /// Spread rates that came out negative before being clamped to zero
    /// (`spec.md` §7 "counted in a diagnostic side channel if present").
    pub clamped_negative_rate_count: u64,
    /// Firebrand log-normal draws that came out non-finite or negative
    /// before being clamped to zero (`spec.md` §7).
    pub clamped_lognormal_count: u64,
}

impl IgnitionState {
    #[must_use]
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        let n = num_rows * num_cols;
        Self {
            num_rows,
            num_cols,
            fire_spread: vec![0.0; n],
            flame_length: vec![0.0; n],
            fire_line_intensity: vec![0.0; n],
            burn_time: vec![-1.0; n],
            firebrand_count: vec![0; n],
            clamped_negative_rate_count: 0,
            clamped_lognormal_count: 0,
        }
    }

    #[must_use]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.num_cols + col
    }

    #[must_use]
    pub fn is_unburned(&self, row: usize, col: usize) -> bool {
        self.fire_spread[self.index(row, col)] == 0.0
    }

    /// A neighbor is eligible for a new trajectory when it carries burnable
    /// fuel and has not yet ignited (`spec.md` Glossary "Burnable cell").
    #[must_use]
    pub fn is_burnable_unburned(&self, landscape: &Landscape, row: usize, col: usize) -> bool {
        landscape.is_burnable_cell(row, col) && self.is_unburned(row, col)
    }
}

/// `compute_neighborhood` (`spec.md` §4.4.1).
///
/// `overflow` seeds one destination's initial `fractional_distance` with
/// the residual heat carried over from the trajectory that triggered `here`'s
/// own ignition (`spec.md` §4.4.4); `None` for a fresh ignition (explicit
/// point, perimeter cell, or spot ignition).
#[must_use]
pub fn compute_neighborhood(
    here: Cell,
    landscape: &Landscape,
    weather: &Weather,
    state: &mut IgnitionState,
    global_clock: f64,
    ellipse_adjustment_factor: f64,
    foliar_moisture: f64,
    perturbations: Option<&PerturbationSet<'_>>,
    cache: &mut SpreadInfoCache,
    overflow: Option<((i64, i64), f64)>,
) -> Vec<BurnTrajectory> {
    let (row, col) = here;
    let constants = extract_constants(landscape, weather, global_clock, row, col, perturbations);
    let moisture = constants.fuel_moisture();

    let Some(min_info) = cache.get_or_compute(constants.fuel_model as u16, &moisture) else {
        return Vec::new();
    };

    let midflame_wind = mph_to_ft_per_min(constants.wind_speed_20ft)
        * wind_adjustment_factor(min_info.depth, constants.canopy_height, constants.canopy_cover);
    let max_info = rothermel_max(
        &min_info,
        midflame_wind,
        constants.wind_from_direction,
        constants.slope,
        constants.aspect,
        ellipse_adjustment_factor,
    );

    let crown_spread_max = cruz_crown_spread(
        constants.wind_speed_20ft,
        constants.crown_bulk_density,
        moisture.dead_1hr,
    );
    let crown_ecc = crown_fire_eccentricity(constants.wind_speed_20ft, ellipse_adjustment_factor);
    let crown_max_info = SpreadInfoMax {
        max_spread_rate: crown_spread_max,
        max_spread_direction: max_info.max_spread_direction,
        eccentricity: crown_ecc,
    };

    let here_elevation = landscape.elevation[landscape.index(row, col)];

    let mut trajectories = Vec::with_capacity(8);
    for (di, dj) in Landscape::neighbor_offsets() {
        let dest_row = row as i64 + di;
        let dest_col = col as i64 + dj;
        if !landscape.in_bounds(dest_row, dest_col) {
            continue;
        }
        let (dest_row, dest_col) = (dest_row as usize, dest_col as usize);
        if !state.is_burnable_unburned(landscape, dest_row, dest_col) {
            continue;
        }

        let azimuth = offset_to_degrees(di, dj);
        let surface_rate_raw = rothermel_any(&max_info, azimuth);
        if surface_rate_raw < 0.0 {
            state.clamped_negative_rate_count += 1;
            warn!(rate = surface_rate_raw, here = ?here, "clamped negative surface spread rate to zero");
        }
        let surface_rate = surface_rate_raw.max(0.0);
        let surface_intensity = byram_intensity(
            min_info.reaction_intensity,
            anderson_flame_depth(surface_rate, min_info.residence_time),
        );

        let crowns = van_wagner_initiation(
            constants.canopy_cover,
            constants.canopy_base_height,
            foliar_moisture,
            surface_intensity,
        );

        let (spread_rate, intensity, crown_fire) = if crowns {
            let crown_rate_raw = rothermel_any(&crown_max_info, azimuth);
            if crown_rate_raw < 0.0 {
                state.clamped_negative_rate_count += 1;
                warn!(rate = crown_rate_raw, here = ?here, "clamped negative crown spread rate to zero");
            }
            let crown_rate = crown_rate_raw.max(0.0);
            let crown_intensity = crown_fire_line_intensity(
                crown_rate,
                constants.crown_bulk_density,
                constants.canopy_height,
                constants.canopy_base_height,
                min_info.heat_content,
            );
            (surface_rate.max(crown_rate), surface_intensity + crown_intensity, true)
        } else {
            (surface_rate, surface_intensity, false)
        };

        let flame_length = byram_flame_length(intensity);
        let dest_elevation = landscape.elevation[landscape.index(dest_row, dest_col)];
        let terrain_distance = BurnTrajectory::compute_terrain_distance(
            landscape.cell_size,
            di,
            dj,
            dest_elevation - here_elevation,
        );

        let fractional_distance = match overflow {
            Some((overflow_trajectory, overflow_heat)) if overflow_trajectory == (di, dj) => overflow_heat,
            _ => 0.0,
        };

        trajectories.push(BurnTrajectory {
            dest_row,
            dest_col,
            trajectory: (di, dj),
            spread_direction: azimuth,
            terrain_distance,
            spread_rate,
            fire_line_intensity: intensity,
            flame_length,
            fractional_distance,
            crown_fire,
        });
    }
    trajectories
}

/// `dt = cell_size / max(spread_rate)`, clamped so `global_clock + dt <=
/// max_runtime`. Returns `None` when the kernel should terminate
/// (`spec.md` §4.4.2, §4.4.7).
#[must_use]
pub fn compute_timestep(
    active_front: &ActiveFront,
    cell_size: f64,
    global_clock: f64,
    max_runtime: f64,
) -> Option<f64> {
    if active_front.is_empty() || global_clock >= max_runtime {
        return None;
    }
    let max_rate = active_front
        .values()
        .flat_map(|trajectories| trajectories.iter())
        .map(|t| t.spread_rate)
        .fold(0.0_f64, f64::max);
    if max_rate <= 0.0 {
        return None;
    }
    let dt = cell_size / max_rate;
    Some(dt.min(max_runtime - global_clock))
}

/// One conducted-spread ignition event resolved from this step's candidates
/// (`spec.md` §4.4.3).
#[derive(Debug, Clone, Copy)]
pub struct IgnitionEvent {
    pub dest: Cell,
    pub source: Cell,
    pub overflow_trajectory: (i64, i64),
    pub overflow_heat: f64,
    pub flame_length: f64,
    pub fire_line_intensity: f64,
    pub crown_fire: bool,
}

/// Accumulates `fractional_distance` across every trajectory by `dt`,
/// then groups candidates (`fractional_distance >= 1.0`) by destination,
/// keeping the one with the largest `fractional_distance` (ties broken by
/// source cell in row-major order) (`spec.md` §4.4.3).
pub fn accumulate_and_resolve_ignitions(active_front: &mut ActiveFront, dt: f64) -> Vec<IgnitionEvent> {
    let mut best: FxHashMap<Cell, IgnitionEvent> = FxHashMap::default();

    let mut sources: Vec<Cell> = active_front.keys().copied().collect();
    sources.sort_unstable();

    for source in sources {
        let Some(trajectories) = active_front.get_mut(&source) else {
            continue;
        };
        for t in trajectories.iter_mut() {
            if t.terrain_distance <= 0.0 {
                continue;
            }
            t.fractional_distance += t.spread_rate * dt / t.terrain_distance;
            if !t.is_ignition_candidate() {
                continue;
            }
            let dest = (t.dest_row, t.dest_col);
            let candidate = IgnitionEvent {
                dest,
                source,
                overflow_trajectory: t.trajectory,
                overflow_heat: t.fractional_distance - 1.0,
                flame_length: t.flame_length,
                fire_line_intensity: t.fire_line_intensity,
                crown_fire: t.crown_fire,
            };
            match best.get(&dest) {
                Some(existing) if existing.overflow_heat >= candidate.overflow_heat => {}
                _ => {
                    best.insert(dest, candidate);
                }
            }
        }
    }

    let mut events: Vec<IgnitionEvent> = best.into_values().collect();
    events.sort_unstable_by_key(|e| e.dest);
    events
}

/// Drops every trajectory in `active_front` whose destination is in
/// `ignited`, removing sources left with no trajectories (`spec.md`
/// §4.4.4 first bullet).
pub fn drop_trajectories_to_ignited(active_front: &mut ActiveFront, ignited: &[Cell]) {
    for trajectories in active_front.values_mut() {
        trajectories.retain(|t| !ignited.contains(&(t.dest_row, t.dest_col)));
    }
    active_front.retain(|_, trajectories| !trajectories.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuel_moisture::fuel_moisture;
    use crate::weather_sampler::WeatherVariable;

    fn flat_landscape(n_rows: usize, n_cols: usize) -> Landscape {
        let n = n_rows * n_cols;
        Landscape {
            num_rows: n_rows,
            num_cols: n_cols,
            cell_size: 30.0,
            elevation: vec![0.0; n],
            slope: vec![0.0; n],
            aspect: vec![0.0; n],
            fuel_model: vec![1.0; n],
            canopy_height: vec![0.0; n],
            canopy_base_height: vec![0.0; n],
            crown_bulk_density: vec![0.0; n],
            canopy_cover: vec![0.0; n],
        }
    }

    fn calm_weather() -> Weather {
        Weather {
            temperature: WeatherVariable::Scalar(70.0),
            relative_humidity: WeatherVariable::Scalar(20.0),
            wind_speed_20ft: WeatherVariable::Scalar(0.0),
            wind_from_direction: WeatherVariable::Scalar(0.0),
            resolution_multiplier: 1,
        }
    }

    #[test]
    fn compute_neighborhood_returns_eight_neighbors_in_interior() {
        let landscape = flat_landscape(5, 5);
        let weather = calm_weather();
        let mut state = IgnitionState::new(5, 5);
        let mut cache = SpreadInfoCache::new();
        let trajectories = compute_neighborhood((2, 2), &landscape, &weather, &mut state, 0.0, 1.0, 0.9, None, &mut cache, None);
        assert_eq!(trajectories.len(), 8);
        assert!(trajectories.iter().all(|t| t.spread_rate > 0.0));
    }

    #[test]
    fn compute_neighborhood_skips_out_of_bounds_and_ignited_neighbors() {
        let landscape = flat_landscape(3, 3);
        let weather = calm_weather();
        let mut state = IgnitionState::new(3, 3);
        state.fire_spread[state.index(0, 1)] = 1.0;
        let mut cache = SpreadInfoCache::new();
        let trajectories = compute_neighborhood((0, 0), &landscape, &weather, &mut state, 0.0, 1.0, 0.9, None, &mut cache, None);
        // Corner cell: 5 of 8 offsets are out of bounds, and (−1,0)→N is also
        // out of bounds; only in-bounds unburned neighbors remain.
        assert!(trajectories.len() <= 3);
        assert!(trajectories.iter().all(|t| !(t.dest_row == 0 && t.dest_col == 1)));
    }

    #[test]
    fn timestep_is_none_when_front_empty() {
        let active_front = ActiveFront::default();
        assert!(compute_timestep(&active_front, 30.0, 0.0, 60.0).is_none());
    }

    #[test]
    fn timestep_is_none_at_max_runtime() {
        let mut active_front = ActiveFront::default();
        active_front.insert(
            (0, 0),
            vec![BurnTrajectory {
                dest_row: 0,
                dest_col: 1,
                trajectory: (0, 1),
                spread_direction: 90.0,
                terrain_distance: 30.0,
                spread_rate: 10.0,
                fire_line_intensity: 0.0,
                flame_length: 0.0,
                fractional_distance: 0.0,
                crown_fire: false,
            }],
        );
        assert!(compute_timestep(&active_front, 30.0, 60.0, 60.0).is_none());
    }

    #[test]
    fn accumulate_resolves_highest_fractional_distance_on_tie() {
        let mut active_front = ActiveFront::default();
        active_front.insert(
            (0, 0),
            vec![BurnTrajectory {
                dest_row: 1,
                dest_col: 1,
                trajectory: (1, 1),
                spread_direction: 135.0,
                terrain_distance: 10.0,
                spread_rate: 100.0,
                fire_line_intensity: 10.0,
                flame_length: 1.0,
                fractional_distance: 0.0,
                crown_fire: false,
            }],
        );
        active_front.insert(
            (2, 2),
            vec![BurnTrajectory {
                dest_row: 1,
                dest_col: 1,
                trajectory: (-1, -1),
                spread_direction: 315.0,
                terrain_distance: 10.0,
                spread_rate: 50.0,
                fire_line_intensity: 5.0,
                flame_length: 0.5,
                fractional_distance: 0.0,
                crown_fire: false,
            }],
        );
        let events = accumulate_and_resolve_ignitions(&mut active_front, 1.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].source, (0, 0));
    }

    #[test]
    fn drop_trajectories_removes_empty_sources() {
        let mut active_front = ActiveFront::default();
        active_front.insert(
            (0, 0),
            vec![BurnTrajectory {
                dest_row: 0,
                dest_col: 1,
                trajectory: (0, 1),
                spread_direction: 90.0,
                terrain_distance: 30.0,
                spread_rate: 10.0,
                fire_line_intensity: 0.0,
                flame_length: 0.0,
                fractional_distance: 1.0,
                crown_fire: false,
            }],
        );
        drop_trajectories_to_ignited(&mut active_front, &[(0, 1)]);
        assert!(active_front.is_empty());
    }

    #[test]
    fn fuel_moisture_feeds_consistent_no_wind_no_slope_spread() {
        let moisture = fuel_moisture(20.0, 70.0);
        assert!(moisture.dead_1hr > 0.0);
    }
}
