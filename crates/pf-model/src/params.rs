//! Physical parameters of the coupled plant.

use crate::error::{ModelError, ModelResult};
use pf_core::{ensure_positive, within_relative};
use serde::{Deserialize, Serialize};

/// Physical parameters in SI units.
///
/// Tank and pipe fluid densities are kept as separate fields even though every
/// reference scenario uses the same fluid for both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalParameters {
    /// Density of the fluid in the tank (kg/m^3).
    pub tank_fluid_density: f64,
    /// Density of the fluid column in the pipe (kg/m^3).
    pub pipe_fluid_density: f64,
    /// Gravitational acceleration (m/s^2).
    pub gravity: f64,
    /// Tank cross-sectional area (m^2).
    pub tank_area: f64,
    /// Pipe length (m).
    pub pipe_length: f64,
    /// Pipe cross-sectional area (m^2).
    pub pipe_section_area: f64,
    /// Piston area (m^2). Must equal `pipe_section_area`.
    pub piston_area: f64,
    /// Moving mass (kg).
    pub mass: f64,
    /// Spring constant (N/m).
    pub spring_constant: f64,
    /// Damping constant (N s/m).
    pub damping_constant: f64,
}

impl PhysicalParameters {
    /// Check that every quantity is finite and strictly positive and that the
    /// piston fits the pipe.
    pub fn validate(&self) -> ModelResult<()> {
        ensure_positive(self.tank_fluid_density, "tank_fluid_density")?;
        ensure_positive(self.pipe_fluid_density, "pipe_fluid_density")?;
        ensure_positive(self.gravity, "gravity")?;
        ensure_positive(self.tank_area, "tank_area")?;
        ensure_positive(self.pipe_length, "pipe_length")?;
        ensure_positive(self.pipe_section_area, "pipe_section_area")?;
        ensure_positive(self.piston_area, "piston_area")?;
        ensure_positive(self.mass, "mass")?;
        ensure_positive(self.spring_constant, "spring_constant")?;
        ensure_positive(self.damping_constant, "damping_constant")?;

        if !within_relative(self.piston_area, self.pipe_section_area, 1e-12) {
            return Err(ModelError::AreaMismatch {
                piston_area: self.piston_area,
                pipe_section_area: self.pipe_section_area,
            });
        }
        Ok(())
    }

    /// Hydrostatic pressure per metre of tank fluid (Pa/m).
    pub fn pressure_per_height(&self) -> f64 {
        self.gravity * self.tank_fluid_density
    }

    /// Pressure-equivalent state value for a given tank fluid height.
    pub fn pressure_for_tank_height(&self, height: f64) -> f64 {
        self.gravity * self.tank_fluid_density * height
    }

    /// Tank fluid height for a given pressure-equivalent state value.
    pub fn tank_height(&self, pressure: f64) -> f64 {
        pressure / (self.gravity * self.tank_fluid_density)
    }

    /// Tank height that balances the spring force at `mass_position`.
    ///
    /// From `P = F / A = k x / A` and `P = g rho h`.
    pub fn spring_balanced_tank_height(&self, mass_position: f64) -> f64 {
        (self.spring_constant * mass_position)
            / (self.tank_fluid_density * self.gravity * self.piston_area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::PfError;
    use pf_core::constants::{GRAVITY, MERCURY_DENSITY};

    fn mercury() -> PhysicalParameters {
        PhysicalParameters {
            tank_fluid_density: MERCURY_DENSITY,
            pipe_fluid_density: MERCURY_DENSITY,
            gravity: GRAVITY,
            tank_area: 0.05,
            pipe_length: 10.0,
            pipe_section_area: 0.00125664,
            piston_area: 0.00125664,
            mass: 5.0,
            spring_constant: 500.0,
            damping_constant: 40.0,
        }
    }

    #[test]
    fn reference_parameters_are_valid() {
        mercury().validate().unwrap();
    }

    #[test]
    fn zero_area_is_rejected() {
        let params = PhysicalParameters {
            tank_area: 0.0,
            ..mercury()
        };
        assert_eq!(
            params.validate(),
            Err(ModelError::InvalidParameter(PfError::NonPositive {
                what: "tank_area",
                value: 0.0
            }))
        );
    }

    #[test]
    fn negative_mass_is_rejected() {
        let params = PhysicalParameters {
            mass: -5.0,
            ..mercury()
        };
        assert!(matches!(
            params.validate(),
            Err(ModelError::InvalidParameter(PfError::NonPositive { what: "mass", .. }))
        ));
    }

    #[test]
    fn mismatched_piston_is_rejected() {
        let params = PhysicalParameters {
            piston_area: 0.002,
            ..mercury()
        };
        assert!(matches!(
            params.validate(),
            Err(ModelError::AreaMismatch { .. })
        ));
    }

    #[test]
    fn tank_height_roundtrips_through_pressure() {
        let params = mercury();
        let p = params.pressure_for_tank_height(1.0);
        assert!((p - GRAVITY * MERCURY_DENSITY).abs() < 1e-9);
        assert!((params.tank_height(p) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn spring_balanced_height_matches_force_balance() {
        let params = mercury();
        let h = params.spring_balanced_tank_height(2.0);
        let pressure = params.pressure_for_tank_height(h);
        let spring_force = params.spring_constant * 2.0;
        assert!((pressure * params.piston_area - spring_force).abs() < 1e-9);
    }
}
