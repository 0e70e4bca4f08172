//! Rothermel (1972) surface fire spread model (`spec.md` §4.1).
//!
//! Structured the way the teacher's `physics::rothermel` decomposes the
//! model — reaction intensity, propagating flux ratio, wind coefficient,
//! slope coefficient, each as its own documented function citing the primary
//! source — but implementing the full multi-particle-class, directional
//! (elliptical) Rothermel/Albini (1976) formulation `spec.md` requires,
//! rather than the teacher's single-particle simplified/Australian-
//! calibrated version.
//!
//! # References
//! - Rothermel, R.C. (1972). "A mathematical model for predicting fire
//!   spread in wildland fuels." USDA Forest Service Research Paper INT-115.
//! - Albini, F.A. (1976). "Estimating wildfire behavior and effects." USDA
//!   Forest Service General Technical Report INT-30.
//! - Anderson, H.E. (1969). "Heat transfer and fire spread." USDA Forest
//!   Service Research Paper INT-69 (flame depth).
//! - Anderson, H.E. (1983). "Predicting wind-driven wild land fire size and
//!   shape." USDA Forest Service Research Paper INT-305 (ellipse L/W ratio).
//! - Byram, G.M. (1959). "Combustion of forest fuels." In Davis, K.P., Forest
//!   Fire: Control and Use.

use crate::fuel_model::{FuelModel, MINERAL_DAMPING, TOTAL_MINERAL_CONTENT};

/// No-wind, no-slope spread behavior for a moisturized fuel bed.
///
/// Pure, memoizable on `(fuel_model_number, fuel_moisture)` per `spec.md`
/// §4.1/§9.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadInfoMin {
    /// Flame residence time, minutes (Anderson 1969: `384 / sigma`).
    pub residence_time: f64,
    /// Reaction intensity, Btu/(ft²·min).
    pub reaction_intensity: f64,
    /// No-wind, no-slope spread rate, ft/min.
    pub r0: f64,
    /// Propagating flux ratio, dimensionless.
    pub propagating_flux_ratio: f64,
    /// Heat sink term (`rho_bed * epsilon * Q_ig`, Btu/ft³).
    pub heat_sink: f64,
    /// Characteristic (mean) surface-area-to-volume ratio, ft⁻¹.
    pub sigma: f64,
    /// Packing ratio, dimensionless.
    pub beta: f64,
    /// Optimum packing ratio, dimensionless.
    pub beta_optimum: f64,
    /// Fuel bed depth, ft — carried through so callers (`wind_adjustment_factor`)
    /// need not re-fetch the fuel model.
    pub depth: f64,
    /// Heat content, Btu/lb — carried through for `crown_fire_line_intensity`'s
    /// `heat_content_1hr_dead` argument.
    pub heat_content: f64,
}

/// Directional (wind+slope) spread behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadInfoMax {
    pub max_spread_rate: f64,
    /// Azimuth of maximum spread, degrees clockwise from north.
    pub max_spread_direction: f64,
    /// Fire ellipse eccentricity, `0` (circle) to just under `1`.
    pub eccentricity: f64,
}

/// `rothermel_no_wind_no_slope(fm)`.
#[must_use]
pub fn rothermel_no_wind_no_slope(fm: &FuelModel) -> SpreadInfoMin {
    let mut area_dead = 0.0;
    let mut area_live = 0.0;
    for (class, is_dead) in fm.present_classes() {
        let area = fm.surface_area(class);
        if is_dead {
            area_dead += area;
        } else {
            area_live += area;
        }
    }
    let area_total = area_dead + area_live;

    let weighted_sav = |is_dead_target: bool, category_area: f64| -> f64 {
        if category_area <= 0.0 {
            return 0.0;
        }
        fm.present_classes()
            .filter(|(_, is_dead)| *is_dead == is_dead_target)
            .map(|(class, _)| {
                let weight = fm.surface_area(class) / category_area;
                weight * class.sav
            })
            .sum()
    };
    let sigma_dead = weighted_sav(true, area_dead);
    let sigma_live = weighted_sav(false, area_live);

    let f_dead = if area_total > 0.0 { area_dead / area_total } else { 0.0 };
    let f_live = if area_total > 0.0 { area_live / area_total } else { 0.0 };
    let sigma = f_dead * sigma_dead + f_live * sigma_live;

    let total_load = fm.total_load();
    let bulk_density = if fm.depth > 0.0 { total_load / fm.depth } else { 0.0 };
    let beta = if fm.particle_density > 0.0 {
        bulk_density / fm.particle_density
    } else {
        0.0
    };
    let beta_optimum = if sigma > 0.0 {
        3.348 * sigma.powf(-0.8189)
    } else {
        0.0
    };
    let relative_packing = if beta_optimum > 0.0 { beta / beta_optimum } else { 0.0 };

    let sigma_15 = sigma.powf(1.5);
    let gamma_max = if sigma > 0.0 {
        sigma_15 / (495.0 + 0.0594 * sigma_15)
    } else {
        0.0
    };
    let a_exp = if sigma > 0.0 {
        1.0 / (4.774 * sigma.powf(0.1) - 7.27)
    } else {
        0.0
    };
    let gamma_prime = if relative_packing > 0.0 {
        gamma_max * relative_packing.powf(a_exp) * (a_exp * (1.0 - relative_packing)).exp()
    } else {
        0.0
    };

    let moisture_damping = |is_dead_target: bool, mx: f64, category_area: f64| -> f64 {
        if category_area <= 0.0 || mx <= 0.0 {
            return 1.0;
        }
        let weighted_moisture: f64 = fm
            .present_classes()
            .filter(|(_, is_dead)| *is_dead == is_dead_target)
            .map(|(class, _)| (fm.surface_area(class) / category_area) * class.moisture)
            .sum();
        let ratio = (weighted_moisture / mx).min(1.0);
        (1.0 - 2.59 * ratio + 5.11 * ratio.powi(2) - 3.46 * ratio.powi(3)).clamp(0.0, 1.0)
    };

    let mx_dead = fm.moisture_of_extinction_dead;
    let mx_live = live_moisture_of_extinction(fm, mx_dead);
    let eta_m_dead = moisture_damping(true, mx_dead, area_dead);
    let eta_m_live = moisture_damping(false, mx_live, area_live);

    let dead_load = fm.dead_1h.load + fm.dead_10h.load + fm.dead_100h.load;
    let live_load = fm.live_herb.load + fm.live_woody.load;
    let net_dead = dead_load * (1.0 - TOTAL_MINERAL_CONTENT);
    let net_live = live_load * (1.0 - TOTAL_MINERAL_CONTENT);

    let reaction_intensity = gamma_prime
        * fm.heat_content
        * MINERAL_DAMPING
        * (net_dead * eta_m_dead + net_live * eta_m_live);

    let propagating_flux_ratio = if sigma > 0.0 {
        (((0.792 + 0.681 * sigma.sqrt()) * (beta + 0.1)).exp() / (192.0 + 0.2595 * sigma))
            .clamp(0.0, 1.0)
    } else {
        0.0
    };

    let heat_sink_per_class = |is_dead_target: bool, category_area: f64| -> f64 {
        if category_area <= 0.0 {
            return 0.0;
        }
        fm.present_classes()
            .filter(|(_, is_dead)| *is_dead == is_dead_target)
            .map(|(class, _)| {
                let weight = fm.surface_area(class) / category_area;
                let exposure = (-138.0 / class.sav).exp();
                let q_ig = 250.0 + 1116.0 * class.moisture;
                weight * exposure * q_ig
            })
            .sum()
    };
    let heat_sink = bulk_density
        * (f_dead * heat_sink_per_class(true, area_dead) + f_live * heat_sink_per_class(false, area_live));

    let r0 = if heat_sink > 0.0 {
        (reaction_intensity * propagating_flux_ratio / heat_sink).max(0.0)
    } else {
        0.0
    };

    let residence_time = if sigma > 0.0 { 384.0 / sigma } else { 0.0 };

    SpreadInfoMin {
        residence_time,
        reaction_intensity,
        r0,
        propagating_flux_ratio,
        heat_sink,
        sigma,
        beta,
        beta_optimum,
        depth: fm.depth,
        heat_content: fm.heat_content,
    }
}

/// Live fuel moisture of extinction, following the standard fine-fuel-ratio
/// formula (Rothermel 1972, Albini 1976 BASIC program). Falls back to the
/// dead extinction moisture when there is no live load (the value is unused
/// in that case since `net_live == 0`).
fn live_moisture_of_extinction(fm: &FuelModel, mx_dead: f64) -> f64 {
    let fine_dead: f64 = [fm.dead_1h, fm.dead_10h, fm.dead_100h]
        .into_iter()
        .filter(|c| c.is_present())
        .map(|c| c.load * (-138.0 / c.sav).exp())
        .sum();
    let fine_live: f64 = [fm.live_herb, fm.live_woody]
        .into_iter()
        .filter(|c| c.is_present())
        .map(|c| c.load * (-500.0 / c.sav).exp())
        .sum();
    if fine_live <= 0.0 {
        return mx_dead;
    }
    let fine_dead_moisture_weighted: f64 = if fine_dead > 0.0 {
        [fm.dead_1h, fm.dead_10h, fm.dead_100h]
            .into_iter()
            .filter(|c| c.is_present())
            .map(|c| c.load * (-138.0 / c.sav).exp() * c.moisture)
            .sum::<f64>()
            / fine_dead
    } else {
        0.0
    };
    let w_ratio = fine_dead / fine_live;
    let mx_live = 2.9 * w_ratio * (1.0 - fine_dead_moisture_weighted / mx_dead.max(1e-6)) - 0.226;
    mx_live.max(mx_dead)
}

/// Wind coefficient constants (Rothermel 1972, eq. 47-49).
struct WindCoeffs {
    c: f64,
    b: f64,
    e: f64,
}

fn wind_coeffs(sigma: f64) -> WindCoeffs {
    WindCoeffs {
        c: 7.47 * (-0.8711 * sigma.powf(0.55)).exp(),
        b: 0.02526 * sigma.powf(0.54),
        e: 0.715 * (-0.000_359 * sigma).exp(),
    }
}

fn phi_wind(min: &SpreadInfoMin, midflame_wind_ft_min: f64) -> f64 {
    if midflame_wind_ft_min <= 0.0 || min.beta_optimum <= 0.0 {
        return 0.0;
    }
    let coeffs = wind_coeffs(min.sigma);
    let relative_packing = min.beta / min.beta_optimum;
    coeffs.c * midflame_wind_ft_min.powf(coeffs.b) * relative_packing.powf(-coeffs.e)
}

fn phi_slope(min: &SpreadInfoMin, slope: f64) -> f64 {
    if min.beta <= 0.0 {
        return 0.0;
    }
    5.275 * min.beta.powf(-0.3) * slope * slope
}

/// `rothermel_max(min, midflame_wind, wind_from_direction, slope, aspect,
/// ellipse_adjustment_factor)`.
///
/// `wind_from_direction` and `aspect` are both degrees clockwise from north;
/// `aspect` follows the standard GIS convention of the downhill-facing
/// direction, so fire is driven upslope toward `(aspect + 180) mod 360`.
#[must_use]
pub fn rothermel_max(
    min: &SpreadInfoMin,
    midflame_wind_ft_min: f64,
    wind_from_direction: f64,
    slope: f64,
    aspect: f64,
    ellipse_adjustment_factor: f64,
) -> SpreadInfoMax {
    let phi_w = phi_wind(min, midflame_wind_ft_min).max(0.0);
    let phi_s = phi_slope(min, slope).max(0.0);

    let wind_to_direction = (wind_from_direction + 180.0).rem_euclid(360.0);
    let upslope_direction = (aspect + 180.0).rem_euclid(360.0);

    let wind_rad = wind_to_direction.to_radians();
    let slope_rad = upslope_direction.to_radians();
    let x = phi_w * wind_rad.sin() + phi_s * slope_rad.sin();
    let y = phi_w * wind_rad.cos() + phi_s * slope_rad.cos();
    let phi_combined = x.hypot(y);

    let max_spread_direction = if phi_combined > 1e-9 {
        x.atan2(y).to_degrees().rem_euclid(360.0)
    } else {
        0.0
    };
    let max_spread_rate = (min.r0 * (1.0 + phi_combined)).max(0.0);

    let eccentricity = fire_ellipse_eccentricity(min, phi_w, ellipse_adjustment_factor);

    SpreadInfoMax {
        max_spread_rate,
        max_spread_direction,
        eccentricity,
    }
}

/// Back-solves an "effective wind speed" from the wind-only contribution to
/// `phi` and runs it through Anderson's (1983) length-to-width ratio curve.
/// `ellipse_adjustment_factor` scales the effective wind speed before it
/// enters the L/W curve, matching how FARSITE-family tools expose the same
/// knob (a user-tunable correction on fire shape elongation).
fn fire_ellipse_eccentricity(min: &SpreadInfoMin, phi_w: f64, ellipse_adjustment_factor: f64) -> f64 {
    if phi_w <= 0.0 || min.sigma <= 0.0 {
        return 0.0;
    }
    let coeffs = wind_coeffs(min.sigma);
    if coeffs.c <= 0.0 || coeffs.b <= 0.0 {
        return 0.0;
    }
    let effective_wind_ft_min = (phi_w / coeffs.c).powf(1.0 / coeffs.b);
    let effective_wind_mph = (effective_wind_ft_min / crate::units::MPH_TO_FT_PER_MIN)
        * ellipse_adjustment_factor.max(0.0);

    let length_to_width = (0.936 * (0.1147 * effective_wind_mph).exp()
        + 0.461 * (-0.0692 * effective_wind_mph).exp()
        - 0.397)
        .max(1.0);

    (1.0 - 1.0 / (length_to_width * length_to_width)).max(0.0).sqrt()
}

/// `rothermel_any(max, azimuth)`: elliptical projection of the max-direction
/// spread rate onto an arbitrary azimuth.
#[must_use]
pub fn rothermel_any(max: &SpreadInfoMax, azimuth: f64) -> f64 {
    let delta = (azimuth - max.max_spread_direction).to_radians();
    let e = max.eccentricity;
    let denom = 1.0 - e * delta.cos();
    if denom <= 1e-9 {
        return max.max_spread_rate;
    }
    (max.max_spread_rate * (1.0 - e * e) / denom).max(0.0)
}

/// `wind_adjustment_factor(depth, canopy_height, canopy_cover)`: standard
/// sheltered/unsheltered midflame wind adjustment factor (Albini & Baughman
/// 1979).
#[must_use]
pub fn wind_adjustment_factor(fuel_bed_depth: f64, canopy_height: f64, canopy_cover: f64) -> f64 {
    let sheltered = canopy_height > 0.0 && canopy_cover > 0.0;
    if sheltered {
        let crown_ratio = (canopy_cover / 100.0).clamp(0.0, 1.0);
        let waf = 0.555 / ((canopy_height * crown_ratio).sqrt() * (fuel_bed_depth + 0.1).ln_1p());
        waf.clamp(0.01, 1.0)
    } else {
        let fuel_bed_depth = fuel_bed_depth.max(0.01);
        let waf = 1.83 / (fuel_bed_depth + 0.1).ln_1p();
        waf.clamp(0.01, 1.0)
    }
}

/// `anderson_flame_depth(rate, residence_time)`, ft.
#[must_use]
pub fn anderson_flame_depth(spread_rate_ft_min: f64, residence_time_min: f64) -> f64 {
    (spread_rate_ft_min * residence_time_min).max(0.0)
}

/// `byram_intensity(reaction_intensity, flame_depth)`, Btu/(ft·s).
#[must_use]
pub fn byram_intensity(reaction_intensity_btu_ft2_min: f64, flame_depth_ft: f64) -> f64 {
    (reaction_intensity_btu_ft2_min * flame_depth_ft / 60.0).max(0.0)
}

/// `byram_flame_length(I)`, ft (Byram 1959).
#[must_use]
pub fn byram_flame_length(fireline_intensity_btu_ft_s: f64) -> f64 {
    if fireline_intensity_btu_ft_s <= 0.0 {
        return 0.0;
    }
    0.45 * fireline_intensity_btu_ft_s.powf(0.46)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuel_model::build_fuel_model;
    use crate::fuel_moisture::fuel_moisture;

    fn moisturized(n: u16, rh: f64, temp: f64) -> FuelModel {
        let fm = build_fuel_model(n).unwrap();
        let moisture = fuel_moisture(rh, temp);
        fm.moisturize(&moisture)
    }

    #[test]
    fn no_wind_no_slope_spread_is_positive_for_dry_grass() {
        let fm = moisturized(1, 20.0, 90.0);
        let min = rothermel_no_wind_no_slope(&fm);
        assert!(min.r0 > 0.0);
        assert!(min.reaction_intensity > 0.0);
        assert!(min.residence_time > 0.0);
    }

    #[test]
    fn wind_increases_max_spread_rate() {
        let fm = moisturized(1, 20.0, 90.0);
        let min = rothermel_no_wind_no_slope(&fm);
        let calm = rothermel_max(&min, 0.0, 270.0, 0.0, 0.0, 1.0);
        let windy = rothermel_max(&min, 880.0, 270.0, 0.0, 0.0, 1.0);
        assert!(windy.max_spread_rate > calm.max_spread_rate);
    }

    #[test]
    fn slope_increases_max_spread_rate() {
        let fm = moisturized(1, 20.0, 90.0);
        let min = rothermel_no_wind_no_slope(&fm);
        let flat = rothermel_max(&min, 0.0, 0.0, 0.0, 0.0, 1.0);
        let sloped = rothermel_max(&min, 0.0, 0.0, 0.5, 0.0, 1.0);
        assert!(sloped.max_spread_rate > flat.max_spread_rate);
    }

    #[test]
    fn downwind_spread_exceeds_upwind_spread() {
        let fm = moisturized(1, 20.0, 90.0);
        let min = rothermel_no_wind_no_slope(&fm);
        // Wind from the west (270) drives spread toward the east (90).
        let max = rothermel_max(&min, 880.0, 270.0, 0.0, 0.0, 1.0);
        let downwind = rothermel_any(&max, 90.0);
        let upwind = rothermel_any(&max, 270.0);
        assert!(downwind > upwind);
    }

    #[test]
    fn byram_flame_length_increases_with_intensity() {
        assert!(byram_flame_length(500.0) > byram_flame_length(50.0));
        assert_eq!(byram_flame_length(0.0), 0.0);
    }

    #[test]
    fn wind_adjustment_factor_is_bounded() {
        let waf = wind_adjustment_factor(1.0, 0.0, 0.0);
        assert!(waf > 0.0 && waf <= 1.0);
        let sheltered = wind_adjustment_factor(1.0, 40.0, 70.0);
        assert!(sheltered > 0.0 && sheltered <= 1.0);
    }
}
