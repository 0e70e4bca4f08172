//! Crown fire initiation and spread (`spec.md` §4.2).
//!
//! Grounded on the teacher's `physics::crown_fire` module for doc-comment
//! structure (Formula/Arguments/Returns/References blocks, one pure function
//! per named quantity) while replacing the teacher's simplified initiation-
//! only check with the full Van Wagner (1977) initiation test and the Cruz
//! (2005) active crown spread rate `spec.md` names.
//!
//! # References
//! - Van Wagner, C.E. (1977). "Conditions for the start and spread of
//!   crown fire." Canadian Journal of Forest Research 7(1): 23-34.
//! - Cruz, M.G., Alexander, M.E., Wakimoto, R.H. (2005). "Development and
//!   testing of models for predicting crown fire rate of spread in conifer
//!   forest stands." Canadian Journal of Forest Research 35(7): 1626-1639.
//! - Byram, G.M. (1959). "Combustion of forest fuels." In Davis, K.P., Forest
//!   Fire: Control and Use.

use crate::units::{btu_ft_s_to_kw_m, meters_to_feet};

/// lb/ft^3 to kg/m^3.
const LB_FT3_TO_KG_M3: f64 = 16.0185;

/// `van_wagner_initiation(canopy_cover, canopy_base_height, foliar_moisture,
/// surface_intensity)`.
///
/// `surface_intensity` is Byram fireline intensity, Btu/(ft·s).
/// `foliar_moisture` is a fraction (`0.9` == 90%), converted to percent for
/// the formula as Van Wagner (1977) originally tabulates it. A canopy with
/// no cover has nothing to torch and never initiates.
#[must_use]
pub fn van_wagner_initiation(
    canopy_cover: f64,
    canopy_base_height_ft: f64,
    foliar_moisture: f64,
    surface_intensity_btu_ft_s: f64,
) -> bool {
    if canopy_cover <= 0.0 || canopy_base_height_ft <= 0.0 {
        return false;
    }
    let canopy_base_height_m = canopy_base_height_ft * 0.3048;
    let foliar_moisture_pct = foliar_moisture * 100.0;
    let critical_intensity_kw_m =
        (0.01 * canopy_base_height_m * (460.0 + 25.9 * foliar_moisture_pct)).powf(1.5);
    let surface_intensity_kw_m = btu_ft_s_to_kw_m(surface_intensity_btu_ft_s);
    surface_intensity_kw_m >= critical_intensity_kw_m
}

/// `cruz_crown_spread(wind_speed_20ft, crown_bulk_density,
/// fine_dead_fuel_moisture_1hr)`: active crown fire rate of spread, ft/min.
///
/// `wind_speed_20ft_mph` is the 20 ft wind speed in mph (as carried
/// throughout the engine), converted to km/h for the Cruz et al. (2005)
/// regression. `crown_bulk_density_lb_ft3` is lb/ft³ as stored on the
/// landscape and converted to kg/m³ here. `fine_dead_fuel_moisture_1hr` is a
/// fraction.
#[must_use]
pub fn cruz_crown_spread(
    wind_speed_20ft_mph: f64,
    crown_bulk_density_lb_ft3: f64,
    fine_dead_fuel_moisture_1hr: f64,
) -> f64 {
    if wind_speed_20ft_mph <= 0.0 || crown_bulk_density_lb_ft3 <= 0.0 {
        return 0.0;
    }
    let wind_kmh = wind_speed_20ft_mph * 1.609_34;
    let crown_bulk_density_kg_m3 = crown_bulk_density_lb_ft3 * LB_FT3_TO_KG_M3;
    let moisture_pct = (fine_dead_fuel_moisture_1hr * 100.0).max(0.0);
    let ros_m_min = 11.02
        * wind_kmh.powf(0.90)
        * crown_bulk_density_kg_m3.powf(0.19)
        * (-0.17 * moisture_pct).exp();
    meters_to_feet(ros_m_min).max(0.0)
}

/// `crown_fire_eccentricity(wind_speed_20ft, ellipse_adjustment_factor)`:
/// reuses Anderson's (1983) length-to-width curve, the same shape
/// `surface_fire::rothermel_max` derives for the surface ellipse, but
/// applied directly to the 20 ft wind speed rather than a back-solved
/// effective wind (crown runs are driven by open wind, not midflame wind).
#[must_use]
pub fn crown_fire_eccentricity(wind_speed_20ft_mph: f64, ellipse_adjustment_factor: f64) -> f64 {
    let effective_mph = (wind_speed_20ft_mph * ellipse_adjustment_factor.max(0.0)).max(0.0);
    let length_to_width = (0.936 * (0.1147 * effective_mph).exp()
        + 0.461 * (-0.0692 * effective_mph).exp()
        - 0.397)
        .max(1.0);
    (1.0 - 1.0 / (length_to_width * length_to_width)).max(0.0).sqrt()
}

/// `crown_fire_line_intensity(crown_spread_rate, crown_bulk_density,
/// canopy_height, canopy_base_height, heat_content_1hr_dead)`: Byram's
/// intensity formula applied to the crown fuel layer between canopy base
/// and top, Btu/(ft·s).
#[must_use]
pub fn crown_fire_line_intensity(
    crown_spread_rate_ft_min: f64,
    crown_bulk_density_lb_ft3: f64,
    canopy_height_ft: f64,
    canopy_base_height_ft: f64,
    heat_content_1hr_dead_btu_lb: f64,
) -> f64 {
    let crown_depth_ft = (canopy_height_ft - canopy_base_height_ft).max(0.0);
    let crown_fuel_load_lb_ft2 = crown_bulk_density_lb_ft3 * crown_depth_ft;
    (crown_fuel_load_lb_ft2 * heat_content_1hr_dead_btu_lb * crown_spread_rate_ft_min / 60.0)
        .max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intense_surface_fire_initiates_crowning_with_low_canopy_base() {
        assert!(van_wagner_initiation(80.0, 3.0, 0.90, 800.0));
    }

    #[test]
    fn weak_surface_fire_does_not_initiate_crowning() {
        assert!(!van_wagner_initiation(80.0, 30.0, 1.0, 5.0));
    }

    #[test]
    fn bare_canopy_never_initiates() {
        assert!(!van_wagner_initiation(0.0, 3.0, 0.90, 5000.0));
    }

    #[test]
    fn crown_spread_increases_with_wind() {
        let calm = cruz_crown_spread(2.0, 0.02, 0.06);
        let windy = cruz_crown_spread(25.0, 0.02, 0.06);
        assert!(windy > calm);
    }

    #[test]
    fn crown_spread_is_zero_without_bulk_density() {
        assert_eq!(cruz_crown_spread(20.0, 0.0, 0.06), 0.0);
    }

    #[test]
    fn crown_eccentricity_grows_with_wind() {
        let calm = crown_fire_eccentricity(2.0, 1.0);
        let windy = crown_fire_eccentricity(30.0, 1.0);
        assert!(windy > calm);
        assert!(windy < 1.0);
    }

    #[test]
    fn crown_intensity_scales_with_crown_depth() {
        let shallow = crown_fire_line_intensity(50.0, 0.02, 20.0, 18.0, 8000.0);
        let deep = crown_fire_line_intensity(50.0, 0.02, 20.0, 2.0, 8000.0);
        assert!(deep > shallow);
    }
}
