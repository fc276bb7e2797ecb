//! Scenario validation logic.

use crate::schema::{ControlDef, InitialStateDef, PlantDef, Scenario, SimulationDef};
use pf_core::within_relative;

/// Piston and pipe areas must agree to this relative tolerance.
const AREA_TOLERANCE: f64 = 1e-12;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(invalid("name", "\"\"", "must not be empty"));
    }

    validate_plant(&scenario.plant)?;
    validate_simulation(&scenario.simulation)?;
    validate_initial_state(&scenario.initial_state)?;
    validate_control(&scenario.control)?;
    Ok(())
}

fn validate_plant(plant: &PlantDef) -> Result<(), ValidationError> {
    if plant.fluid_density_kg_m3.is_some() {
        return Err(ValidationError::Unsupported {
            feature: "plant.fluid_density_kg_m3".to_string(),
            reason: "use tank_fluid_density_kg_m3 and pipe_fluid_density_kg_m3".to_string(),
        });
    }

    let fields = [
        ("plant.tank_fluid_density_kg_m3", plant.tank_fluid_density_kg_m3),
        ("plant.pipe_fluid_density_kg_m3", plant.pipe_fluid_density_kg_m3),
        ("plant.gravity_m_s2", plant.gravity_m_s2),
        ("plant.tank_area_m2", plant.tank_area_m2),
        ("plant.pipe_length_m", plant.pipe_length_m),
        ("plant.pipe_section_area_m2", plant.pipe_section_area_m2),
        ("plant.piston_area_m2", plant.effective_piston_area_m2()),
        ("plant.mass_kg", plant.mass_kg),
        ("plant.spring_constant_n_per_m", plant.spring_constant_n_per_m),
        ("plant.damping_constant_n_s_per_m", plant.damping_constant_n_s_per_m),
    ];
    for (field, value) in fields {
        positive(field, value)?;
    }

    let piston = plant.effective_piston_area_m2();
    let pipe = plant.pipe_section_area_m2;
    if !within_relative(piston, pipe, AREA_TOLERANCE) {
        return Err(ValidationError::Unsupported {
            feature: "plant.piston_area_m2".to_string(),
            reason: format!(
                "piston area {piston} differs from pipe section area {pipe}; the model assumes they are equal"
            ),
        });
    }
    Ok(())
}

fn validate_simulation(sim: &SimulationDef) -> Result<(), ValidationError> {
    finite("simulation.t0_s", sim.t0_s)?;
    finite("simulation.t_end_s", sim.t_end_s)?;
    positive("simulation.dt_s", sim.dt_s)?;
    if sim.t_end_s <= sim.t0_s {
        return Err(invalid(
            "simulation.t_end_s",
            &sim.t_end_s.to_string(),
            "must be after t0_s",
        ));
    }
    if sim.record_every == 0 {
        return Err(invalid("simulation.record_every", "0", "must be at least 1"));
    }
    Ok(())
}

fn validate_initial_state(init: &InitialStateDef) -> Result<(), ValidationError> {
    match init {
        InitialStateDef::Explicit { x } => {
            for value in x {
                finite("initial_state.x", *value)?;
            }
        }
        InitialStateDef::TankHeight {
            mass_position_m,
            tank_height_m,
        } => {
            finite("initial_state.mass_position_m", *mass_position_m)?;
            finite("initial_state.tank_height_m", *tank_height_m)?;
        }
        InitialStateDef::SpringBalanced { mass_position_m } => {
            finite("initial_state.mass_position_m", *mass_position_m)?;
        }
    }
    Ok(())
}

fn validate_control(control: &ControlDef) -> Result<(), ValidationError> {
    match control {
        ControlDef::OpenLoop => {}
        ControlDef::StateFeedback { poles_gain } => {
            positive("control.poles_gain", *poles_gain)?;
        }
        ControlDef::ReferenceTracking {
            poles_gain,
            reference_m,
        } => {
            positive("control.poles_gain", *poles_gain)?;
            finite("control.reference_m", *reference_m)?;
        }
        ControlDef::EstimatedReferenceTracking {
            poles_gain,
            observer_poles_gain,
            reference_m,
            initial_estimate,
        } => {
            positive("control.poles_gain", *poles_gain)?;
            positive("control.observer_poles_gain", *observer_poles_gain)?;
            finite("control.reference_m", *reference_m)?;
            for value in initial_estimate.iter().flatten() {
                finite("control.initial_estimate", *value)?;
            }
        }
    }
    Ok(())
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, &value.to_string(), "must be finite"))
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &value.to_string(), "must be finite and positive"))
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
