//! Fuel moisture from relative humidity and temperature (`spec.md` §4.3).
//!
//! Mirrors the teacher's `physics::fuel_moisture` module in spirit (a small
//! pure function over temperature/humidity, documented with its source
//! equation) but implements the three-branch equilibrium moisture content
//! (EMC) formula `spec.md` specifies rather than the teacher's Simard-68
//! adsorption/desorption pair, since this crate has no separate
//! adsorbing/desorbing fuel state to track.

/// Per-class fuel moisture, fraction (0.06 == 6%).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FuelMoisture {
    pub dead_1hr: f64,
    pub dead_10hr: f64,
    pub dead_100hr: f64,
    pub live_herb: f64,
    pub live_woody: f64,
}

/// Equilibrium moisture content (%) from relative humidity (%) and
/// temperature (°F), the standard NFDRS/Simard (1968) three-branch formula.
#[must_use]
pub fn equilibrium_moisture_content(relative_humidity: f64, temperature_f: f64) -> f64 {
    let rh = relative_humidity;
    let t = temperature_f;
    if rh < 10.0 {
        0.03229 + 0.281_073 * rh - 0.000_578 * rh * t
    } else if rh < 50.0 {
        2.227_49 + 0.160_107 * rh - 0.014_784 * t
    } else {
        21.060_6 + 0.005_565 * rh * rh - 0.000_35 * rh * t - 0.483_199 * rh
    }
}

/// `fuel_moisture(rh, temp)` (`spec.md` §4.3): EMC divided by 30 gives the
/// base fraction; dead timelag classes add `{0.002, 0.015, 0.025}`; live
/// classes scale by `{2.0, 0.5}`.
#[must_use]
pub fn fuel_moisture(relative_humidity: f64, temperature_f: f64) -> FuelMoisture {
    let base = equilibrium_moisture_content(relative_humidity, temperature_f) / 30.0;
    FuelMoisture {
        dead_1hr: base + 0.002,
        dead_10hr: base + 0.015,
        dead_100hr: base + 0.025,
        live_herb: base * 2.0,
        live_woody: base * 0.5,
    }
}
