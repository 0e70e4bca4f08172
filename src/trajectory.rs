//! Burn trajectories and the azimuth table (`spec.md` §3 "BurnTrajectory",
//! §6 "Azimuth table").
//!
//! `spec.md` §9 singles this type out: the source system mutates
//! `fractional_distance` as an imperative cell inside a globally-indexed
//! trajectory object. Here trajectories are held by value inside
//! `active_front`'s `Vec<BurnTrajectory>` per source and replaced wholesale
//! each step (see [`crate::spread_kernel`]), matching the teacher's general
//! preference for owned, replace-on-update state over `RefCell`/`Mutex`
//! interior mutability in single-threaded per-simulation code.

/// `(di, dj)` offset to compass azimuth, `spec.md` §6.
#[must_use]
pub fn offset_to_degrees(di: i64, dj: i64) -> f64 {
    match (di, dj) {
        (-1, 0) => 0.0,
        (-1, 1) => 45.0,
        (0, 1) => 90.0,
        (1, 1) => 135.0,
        (1, 0) => 180.0,
        (1, -1) => 225.0,
        (0, -1) => 270.0,
        (-1, -1) => 315.0,
        _ => unreachable!("trajectory offsets are one of the eight 8-neighbor vectors"),
    }
}

/// One outgoing edge from an active source cell to a burnable neighbor
/// (`spec.md` §3 "BurnTrajectory").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurnTrajectory {
    pub dest_row: usize,
    pub dest_col: usize,
    pub trajectory: (i64, i64),
    /// Azimuth derived from `trajectory`, degrees clockwise from north.
    pub spread_direction: f64,
    /// 3-D distance (using elevation), ft.
    pub terrain_distance: f64,
    /// ft/min along this trajectory.
    pub spread_rate: f64,
    /// Btu/(ft·s).
    pub fire_line_intensity: f64,
    /// ft.
    pub flame_length: f64,
    /// Cumulative fraction of `terrain_distance` covered.
    pub fractional_distance: f64,
    pub crown_fire: bool,
}

impl BurnTrajectory {
    /// Whether this trajectory has accumulated enough heat to ignite its
    /// destination this step (`spec.md` §4.4.3).
    #[must_use]
    pub fn is_ignition_candidate(&self) -> bool {
        self.fractional_distance >= 1.0
    }

    /// `terrain_distance = sqrt((cell_size*di)^2 + (cell_size*dj)^2 +
    /// (delta_elevation)^2)` (`spec.md` §4.4.1).
    #[must_use]
    pub fn compute_terrain_distance(cell_size: f64, di: i64, dj: i64, delta_elevation: f64) -> f64 {
        let dx = cell_size * di as f64;
        let dy = cell_size * dj as f64;
        (dx * dx + dy * dy + delta_elevation * delta_elevation).sqrt()
    }
}
