//! Unit conversions used throughout the spread engine.
//!
//! The landscape, weather and output types all carry plain `f64` values in the
//! units `spec.md` calls for (feet, miles per hour, °F, Btu/(ft·s), minutes).
//! This module centralizes the handful of conversions the physics needs so the
//! conversion constants appear exactly once.
//!
//! Unlike the teacher crate's `core_types::units` (a full newtype lattice with
//! `Ord`/`Add`/`Sub` impls for a dozen physical quantities), this crate keeps
//! conversions as free functions: the surface this crate exposes is narrow
//! enough that a newtype-per-quantity framework would be more machinery than
//! the problem calls for. See `DESIGN.md` for the trade-off.

/// Feet per mile per minute: converts mi/h to ft/min (`* 88`).
pub const MPH_TO_FT_PER_MIN: f64 = 88.0;

/// Gravitational acceleration, m/s^2 (used by the spotting model's Froude number).
pub const GRAVITY_MS2: f64 = 9.81;

#[inline]
pub fn mph_to_ft_per_min(mph: f64) -> f64 {
    mph * MPH_TO_FT_PER_MIN
}

#[inline]
pub fn mph_to_ms(mph: f64) -> f64 {
    mph * 0.44704
}

#[inline]
pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

#[inline]
pub fn fahrenheit_to_kelvin(f: f64) -> f64 {
    fahrenheit_to_celsius(f) + 273.15
}

/// Btu/(ft·s) to kW/m, the unit the spotting model's firebrand dispersal
/// equations expect for fireline intensity.
#[inline]
pub fn btu_ft_s_to_kw_m(intensity: f64) -> f64 {
    intensity * 3.46141
}

#[inline]
pub fn feet_to_meters(ft: f64) -> f64 {
    ft * 0.3048
}

#[inline]
pub fn meters_to_feet(m: f64) -> f64 {
    m / 0.3048
}
