//! Error types for the spread engine.
//!
//! Follows the teacher crate's convention of a hand-rolled `enum` with a
//! manual `Display` and `std::error::Error` impl (see
//! `simulation::persistence::PersistenceError`) rather than pulling in
//! `thiserror`, which the teacher crate does not depend on.

use std::fmt;

/// Errors surfaced to the driver before or during a single simulation run.
///
/// Only the two structural kinds from `spec.md` §7 are represented here.
/// `NumericDomain` anomalies are clamped in place (see the `tracing::warn!`
/// events emitted by [`crate::spread_kernel`] and [`crate::spotting`]) and
/// `Exhaustion` (`max_runtime` reached) is ordinary termination, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Landscape/weather dimensions mismatch, non-finite required cells,
    /// `max_runtime <= 0`, or spotting configured with missing parameters.
    InvalidInput(String),
    /// An explicit point ignition was out of bounds, on non-burnable fuel,
    /// or had no burnable neighbor to spread to.
    IgnitionRejected(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidInput(msg) => write!(f, "invalid simulation input: {msg}"),
            EngineError::IgnitionRejected(msg) => write!(f, "ignition rejected: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

pub type EngineResult<T> = Result<T, EngineError>;
