//! Physical readouts derived from the state vector.

use crate::params::PhysicalParameters;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Mass position, mass speed and tank fluid height at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantReadout {
    pub mass_position: f64,
    pub mass_speed: f64,
    pub tank_height: f64,
}

/// Maps full state vectors to [`PlantReadout`]s.
#[derive(Debug, Clone, Copy)]
pub struct OutputProjector {
    pressure_per_height: f64,
}

impl OutputProjector {
    pub fn new(params: &PhysicalParameters) -> Self {
        Self {
            pressure_per_height: params.pressure_per_height(),
        }
    }

    /// `None` unless `x` holds exactly the three plant states.
    pub fn project(&self, x: &DVector<f64>) -> Option<PlantReadout> {
        match x.as_slice() {
            [position, speed, pressure] => Some(PlantReadout {
                mass_position: *position,
                mass_speed: *speed,
                tank_height: pressure / self.pressure_per_height,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tank_height_divides_out_hydrostatics() {
        let params = PhysicalParameters {
            tank_fluid_density: 1000.0,
            pipe_fluid_density: 1000.0,
            gravity: 10.0,
            tank_area: 1.0,
            pipe_length: 1.0,
            pipe_section_area: 0.1,
            piston_area: 0.1,
            mass: 1.0,
            spring_constant: 1.0,
            damping_constant: 1.0,
        };
        let projector = OutputProjector::new(&params);
        let readout = projector
            .project(&DVector::from_vec(vec![1.5, -0.25, 20_000.0]))
            .unwrap();
        assert_eq!(readout.mass_position, 1.5);
        assert_eq!(readout.mass_speed, -0.25);
        assert!((readout.tank_height - 2.0).abs() < 1e-12);

        assert!(projector.project(&DVector::from_vec(vec![1.5, -0.25])).is_none());
        assert!(projector.project(&DVector::zeros(4)).is_none());
    }
}
