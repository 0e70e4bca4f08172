//! Engine Facade (`spec.md` §4.6).
//!
//! Grounded on the teacher's `simulation::runner` module for the shape of a
//! facade that validates inputs up front, owns one mutable state struct for
//! the duration of a run, and drives a step loop to a termination condition
//! — but replacing the teacher's fixed-duration burn loop with the ordering
//! `spec.md` §5 specifies: compute `dt`, resolve ignitions, collect and apply
//! spotting, maintain the front, advance the clock.

use crate::error::{EngineError, EngineResult};
use crate::landscape::Landscape;
use crate::memo::SpreadInfoCache;
use crate::perturbation::{ActivePerturbation, Perturbation};
use crate::result::EngineOutput;
use crate::rng::EngineRng;
use crate::spotting::{self, SpotIgnition, SpottingConfig};
use crate::spread_kernel::{
    accumulate_and_resolve_ignitions, compute_neighborhood, compute_timestep,
    drop_trajectories_to_ignited, ActiveFront, Cell, IgnitionState,
};
use crate::weather_sampler::{extract_constants, PerturbationSet, Weather};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// The three ignition constructors (`spec.md` §6 "`ignition`").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Ignition {
    Random,
    Point(usize, usize),
    /// Row-major, `num_rows * num_cols` matrix; nonzero marks an ignited cell.
    Perimeter(Vec<f64>),
}

/// One named layer's perturbation configuration (`spec.md` §3
/// "Perturbations").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerturbationConfig {
    pub layer: String,
    pub perturbation: Perturbation,
}

/// The full engine input record (`spec.md` §6 "Engine input record").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInputs {
    pub landscape: Landscape,
    pub weather: Weather,
    pub max_runtime: f64,
    pub ellipse_adjustment_factor: f64,
    /// Fraction, e.g. `0.9` for 90% (`spec.md` §9 Open Questions).
    pub foliar_moisture: f64,
    pub perturbations: Vec<PerturbationConfig>,
    pub spotting: Option<SpottingConfig>,
    pub random_seed: Option<u64>,
}

fn validate(inputs: &SimulationInputs) -> EngineResult<()> {
    if !inputs.landscape.dimensions_consistent() {
        return Err(EngineError::InvalidInput(
            "landscape layers do not all match num_rows * num_cols".into(),
        ));
    }
    if !inputs.landscape.all_finite() {
        return Err(EngineError::InvalidInput(
            "landscape contains non-finite values in a required layer".into(),
        ));
    }
    if inputs.max_runtime <= 0.0 {
        return Err(EngineError::InvalidInput("max_runtime must be > 0".into()));
    }
    if let Some(spotting) = &inputs.spotting {
        if spotting.decay_constant <= 0.0 {
            return Err(EngineError::InvalidInput(
                "spotting.decay_constant must be > 0".into(),
            ));
        }
        if let Some(surface) = &spotting.surface_fire_spotting {
            if surface.critical_fire_line_intensity < 0.0 {
                return Err(EngineError::InvalidInput(
                    "surface_fire_spotting.critical_fire_line_intensity must be >= 0".into(),
                ));
            }
        }
    }
    Ok(())
}

fn has_burnable_unburned_neighbor(landscape: &Landscape, state: &IgnitionState, cell: Cell) -> bool {
    Landscape::neighbor_offsets().iter().any(|(di, dj)| {
        let row = cell.0 as i64 + di;
        let col = cell.1 as i64 + dj;
        landscape.in_bounds(row, col) && state.is_burnable_unburned(landscape, row as usize, col as usize)
    })
}

/// Sets the initial ignition cell(s)' matrices and returns their coordinates,
/// or `None` for a rejected explicit/random ignition (`spec.md` §4.6).
fn initialize_ignition(
    ignition: &Ignition,
    landscape: &Landscape,
    state: &mut IgnitionState,
    rng: &mut EngineRng,
) -> Option<Vec<Cell>> {
    let set_conducted = |state: &mut IgnitionState, cell: Cell| {
        let idx = state.index(cell.0, cell.1);
        state.fire_spread[idx] = 1.0;
        state.flame_length[idx] = 1.0;
        state.fire_line_intensity[idx] = 1.0;
        state.burn_time[idx] = 0.0;
    };

    match ignition {
        Ignition::Random => {
            let max_attempts = landscape.num_rows.saturating_mul(landscape.num_cols).max(1) * 4;
            for _ in 0..max_attempts {
                let row = rng.uniform_int(0, landscape.num_rows as i64 - 1) as usize;
                let col = rng.uniform_int(0, landscape.num_cols as i64 - 1) as usize;
                let cell = (row, col);
                if landscape.is_burnable_cell(row, col) && has_burnable_unburned_neighbor(landscape, state, cell) {
                    set_conducted(state, cell);
                    return Some(vec![cell]);
                }
            }
            None
        }
        Ignition::Point(row, col) => {
            let cell = (*row, *col);
            if !landscape.in_bounds(*row as i64, *col as i64)
                || !landscape.is_burnable_cell(*row, *col)
                || !has_burnable_unburned_neighbor(landscape, state, cell)
            {
                return None;
            }
            set_conducted(state, cell);
            Some(vec![cell])
        }
        Ignition::Perimeter(matrix) => {
            let mut seeds = Vec::new();
            for row in 0..landscape.num_rows {
                for col in 0..landscape.num_cols {
                    let idx = state.index(row, col);
                    if matrix.get(idx).copied().unwrap_or(0.0) != 0.0 {
                        state.fire_spread[idx] = matrix[idx];
                        state.flame_length[idx] = -1.0;
                        state.fire_line_intensity[idx] = -1.0;
                        state.burn_time[idx] = -1.0;
                        seeds.push((row, col));
                    }
                }
            }
            Some(seeds)
        }
    }
}

/// Drives one complete simulation to termination (`spec.md` §4.6, §5
/// "Ordering").
pub fn run(inputs: &SimulationInputs, ignition: &Ignition) -> EngineResult<EngineOutput> {
    validate(inputs)?;

    let landscape = &inputs.landscape;
    let mut state = IgnitionState::new(landscape.num_rows, landscape.num_cols);
    let base_seed = inputs.random_seed.unwrap_or(0);
    let mut rng = EngineRng::new(base_seed);

    let active_perturbations: Vec<(String, ActivePerturbation)> = inputs
        .perturbations
        .iter()
        .map(|p| (p.layer.clone(), ActivePerturbation::new(p.perturbation, &mut rng)))
        .collect();
    let entries: Vec<(&str, &ActivePerturbation)> = active_perturbations
        .iter()
        .map(|(name, active)| (name.as_str(), active))
        .collect();
    let perturbation_set = (!entries.is_empty()).then(|| PerturbationSet {
        base_seed,
        entries,
    });
    let perturbations = perturbation_set.as_ref();

    let Some(seeds) = initialize_ignition(ignition, landscape, &mut state, &mut rng) else {
        warn!("ignition rejected: no valid seed cell");
        return Err(EngineError::IgnitionRejected(
            "ignition cell out of bounds, non-burnable, or has no burnable neighbor".into(),
        ));
    };
    info!(seed_count = seeds.len(), "simulation initialized");

    let mut cache = SpreadInfoCache::new();
    let mut active_front = ActiveFront::default();
    for cell in &seeds {
        if has_burnable_unburned_neighbor(landscape, &state, *cell) {
            let trajectories = compute_neighborhood(
                *cell,
                landscape,
                &inputs.weather,
                &mut state,
                0.0,
                inputs.ellipse_adjustment_factor,
                inputs.foliar_moisture,
                perturbations,
                &mut cache,
                None,
            );
            if !trajectories.is_empty() {
                active_front.insert(*cell, trajectories);
            }
        }
    }

    let mut spot_schedule: FxHashMap<Cell, SpotIgnition> = FxHashMap::default();
    let mut global_clock = 0.0_f64;

    loop {
        let Some(dt) = compute_timestep(&active_front, landscape.cell_size, global_clock, inputs.max_runtime) else {
            break;
        };
        let horizon = global_clock + dt;

        let events = accumulate_and_resolve_ignitions(&mut active_front, dt);

        let mut newly_conducted = Vec::with_capacity(events.len());
        let mut overflow_by_cell: FxHashMap<Cell, ((i64, i64), f64)> = FxHashMap::default();
        for event in &events {
            let idx = state.index(event.dest.0, event.dest.1);
            state.fire_spread[idx] = 1.0;
            state.flame_length[idx] = event.flame_length;
            state.fire_line_intensity[idx] = event.fire_line_intensity;
            state.burn_time[idx] = horizon;
            newly_conducted.push(event.dest);
            overflow_by_cell.insert(event.dest, (event.overflow_trajectory, event.overflow_heat));
        }

        if let Some(spotting_config) = &inputs.spotting {
            for event in &events {
                let constants = extract_constants(
                    landscape,
                    &inputs.weather,
                    global_clock,
                    event.source.0,
                    event.source.1,
                    perturbations,
                );
                let scheduled = spotting::collect_spot_ignitions(
                    event.source,
                    event.fire_line_intensity,
                    event.crown_fire,
                    landscape,
                    &mut state,
                    &constants,
                    spotting_config,
                    global_clock,
                    dt,
                    event.flame_length,
                    &mut rng,
                );
                spotting::merge_spot_schedule(&mut spot_schedule, scheduled);
            }
        }

        let (due, pending) = spotting::split_due(std::mem::take(&mut spot_schedule), horizon);
        spot_schedule = pending;

        let mut spot_ignited = Vec::new();
        for spot in due {
            let idx = state.index(spot.cell.0, spot.cell.1);
            if state.fire_spread[idx] < spot.p {
                let first_ignition = state.fire_spread[idx] == 0.0;
                state.fire_spread[idx] = spot.p;
                state.burn_time[idx] = horizon;
                if first_ignition {
                    spot_ignited.push(spot.cell);
                }
            }
        }

        let mut all_ignited = newly_conducted.clone();
        all_ignited.extend(spot_ignited.iter().copied());
        drop_trajectories_to_ignited(&mut active_front, &all_ignited);

        for dest in &newly_conducted {
            if has_burnable_unburned_neighbor(landscape, &state, *dest) {
                let overflow = overflow_by_cell.get(dest).copied();
                let trajectories = compute_neighborhood(
                    *dest,
                    landscape,
                    &inputs.weather,
                    &mut state,
                    global_clock,
                    inputs.ellipse_adjustment_factor,
                    inputs.foliar_moisture,
                    perturbations,
                    &mut cache,
                    overflow,
                );
                if !trajectories.is_empty() {
                    active_front.insert(*dest, trajectories);
                }
            }
        }
        for cell in &spot_ignited {
            if has_burnable_unburned_neighbor(landscape, &state, *cell) {
                let trajectories = compute_neighborhood(
                    *cell,
                    landscape,
                    &inputs.weather,
                    &mut state,
                    global_clock,
                    inputs.ellipse_adjustment_factor,
                    inputs.foliar_moisture,
                    perturbations,
                    &mut cache,
                    None,
                );
                if !trajectories.is_empty() {
                    active_front.insert(*cell, trajectories);
                }
            }
        }

        debug!(
            global_clock = horizon,
            ignitions = newly_conducted.len(),
            spot_ignitions = spot_ignited.len(),
            front_size = active_front.len(),
            "step complete"
        );

        global_clock = horizon;
        if global_clock >= inputs.max_runtime {
            break;
        }
    }

    info!(global_clock, cache_hit_rate = cache.hit_rate(), "simulation terminated");
    Ok(EngineOutput::from_state(&state, global_clock, inputs.spotting.is_some()))
}

/// Runs one `SimulationInputs`/`Ignition` pair per `random_seed` override,
/// across threads (`spec.md` §5 "Parallelism" — independent simulations
/// share only immutable landscape/weather and may run concurrently).
///
/// `inputs` is reused as a template; each element of `seeds` produces one
/// independent run with `random_seed` set to that value.
pub fn run_many(inputs: &SimulationInputs, ignition: &Ignition, seeds: &[u64]) -> Vec<EngineResult<EngineOutput>> {
    seeds
        .par_iter()
        .map(|&seed| {
            let per_run = SimulationInputs {
                landscape: inputs.landscape.clone(),
                weather: inputs.weather.clone(),
                max_runtime: inputs.max_runtime,
                ellipse_adjustment_factor: inputs.ellipse_adjustment_factor,
                foliar_moisture: inputs.foliar_moisture,
                perturbations: inputs.perturbations.clone(),
                spotting: inputs.spotting.clone(),
                random_seed: Some(seed),
            };
            run(&per_run, ignition)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather_sampler::WeatherVariable;

    fn flat_landscape(n_rows: usize, n_cols: usize, fuel_model: f64) -> Landscape {
        let n = n_rows * n_cols;
        Landscape {
            num_rows: n_rows,
            num_cols: n_cols,
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

    fn calm_weather() -> Weather {
        Weather {
            temperature: WeatherVariable::Scalar(70.0),
            relative_humidity: WeatherVariable::Scalar(20.0),
            wind_speed_20ft: WeatherVariable::Scalar(0.0),
            wind_from_direction: WeatherVariable::Scalar(0.0),
            resolution_multiplier: 1,
        }
    }

    fn base_inputs(landscape: Landscape) -> SimulationInputs {
        SimulationInputs {
            landscape,
            weather: calm_weather(),
            max_runtime: 30.0,
            ellipse_adjustment_factor: 1.0,
            foliar_moisture: 0.9,
            perturbations: Vec::new(),
            spotting: None,
            random_seed: Some(42),
        }
    }

    #[test]
    fn point_ignition_in_homogeneous_grass_burns_outward() {
        let inputs = base_inputs(flat_landscape(10, 10, 1.0));
        let output = run(&inputs, &Ignition::Point(5, 5)).expect("valid ignition");
        assert!(output.ignited_cells.len() > 1);
        assert!(output.global_clock > 0.0);
    }

    #[test]
    fn point_ignition_on_barrier_is_rejected() {
        let inputs = base_inputs(flat_landscape(5, 5, 93.0));
        let result = run(&inputs, &Ignition::Point(2, 2));
        assert!(matches!(result, Err(EngineError::IgnitionRejected(_))));
    }

    #[test]
    fn perimeter_ignition_sets_burn_time_negative_one_at_seed() {
        let landscape = flat_landscape(6, 6, 1.0);
        let mut matrix = vec![0.0; 36];
        matrix[landscape.index(3, 3)] = 1.0;
        let inputs = base_inputs(landscape);
        let output = run(&inputs, &Ignition::Perimeter(matrix)).expect("valid perimeter");
        let seed_idx = output.burn_time_matrix.len() / 2 + 3; // (3,3) in a 6x6 grid
        assert!(output.ignited_cells.contains(&(3, 3)));
        let _ = seed_idx;
    }

    #[test]
    fn invalid_max_runtime_is_rejected_before_running() {
        let mut inputs = base_inputs(flat_landscape(4, 4, 1.0));
        inputs.max_runtime = 0.0;
        let result = run(&inputs, &Ignition::Point(1, 1));
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn mismatched_landscape_dimensions_is_rejected() {
        let mut landscape = flat_landscape(4, 4, 1.0);
        landscape.slope.pop();
        let inputs = base_inputs(landscape);
        let result = run(&inputs, &Ignition::Point(1, 1));
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn run_many_produces_one_result_per_seed() {
        let inputs = base_inputs(flat_landscape(8, 8, 1.0));
        let outputs = run_many(&inputs, &Ignition::Point(4, 4), &[1, 2, 3]);
        assert_eq!(outputs.len(), 3);
        assert!(outputs.iter().all(Result::is_ok));
    }

    #[test]
    fn same_seed_is_deterministic() {
        let landscape = flat_landscape(8, 8, 1.0);
        let inputs_a = base_inputs(landscape.clone());
        let inputs_b = base_inputs(landscape);
        let a = run(&inputs_a, &Ignition::Point(4, 4)).unwrap();
        let b = run(&inputs_b, &Ignition::Point(4, 4)).unwrap();
        assert_eq!(a.fire_spread_matrix, b.fire_spread_matrix);
        assert_eq!(a.burn_time_matrix, b.burn_time_matrix);
    }
}
