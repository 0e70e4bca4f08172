//! Wildfire spread engine: an adaptive-timestep cellular fire-spread kernel,
//! the embedded Rothermel/Van Wagner/Cruz fire-behavior model, and a
//! stochastic firebrand spotting model.
//!
//! Raster I/O, projection handling, CSV/PNG writers, the outer Monte Carlo
//! driver, and configuration parsing are explicitly out of scope; this crate
//! exposes [`engine::run`] as its single entry point, operating purely on
//! already-loaded [`landscape::Landscape`] and [`weather_sampler::Weather`]
//! values.

pub mod crown_fire;
pub mod engine;
pub mod error;
pub mod fuel_model;
pub mod fuel_moisture;
pub mod landscape;
pub mod loader;
pub mod memo;
pub mod perturbation;
pub mod result;
pub mod rng;
pub mod spotting;
pub mod spread_kernel;
pub mod surface_fire;
pub mod trajectory;
pub mod units;
pub mod weather_sampler;

pub use engine::{run, Ignition, PerturbationConfig, SimulationInputs};
pub use error::{EngineError, EngineResult};
pub use result::EngineOutput;
