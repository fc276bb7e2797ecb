//! Named physical constants shared by the reference scenarios.
//!
//! These are plain values to be passed into a plant configuration; nothing in
//! the workspace reads them implicitly.

/// Density of water (kg/m^3).
pub const WATER_DENSITY: f64 = 1000.0;

/// Density of mercury (kg/m^3).
pub const MERCURY_DENSITY: f64 = 13546.0;

/// Gravitational acceleration used by the reference scenarios (m/s^2).
pub const GRAVITY: f64 = 9.81;
