//! Scenario schema definitions.

use pf_core::constants::GRAVITY;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub plant: PlantDef,
    #[serde(default)]
    pub outputs: OutputsDef,
    #[serde(default)]
    pub simulation: SimulationDef,
    pub initial_state: InitialStateDef,
    #[serde(default)]
    pub control: ControlDef,
    #[serde(default)]
    pub checks: ChecksDef,
}

/// Physical parameters in SI units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantDef {
    #[serde(default)]
    pub tank_fluid_density_kg_m3: f64,
    #[serde(default)]
    pub pipe_fluid_density_kg_m3: f64,
    /// Version 1 files carry a single density for tank and pipe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluid_density_kg_m3: Option<f64>,
    #[serde(default = "default_gravity")]
    pub gravity_m_s2: f64,
    pub tank_area_m2: f64,
    pub pipe_length_m: f64,
    pub pipe_section_area_m2: f64,
    /// Defaults to the pipe section area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piston_area_m2: Option<f64>,
    pub mass_kg: f64,
    pub spring_constant_n_per_m: f64,
    pub damping_constant_n_s_per_m: f64,
}

impl PlantDef {
    pub fn effective_piston_area_m2(&self) -> f64 {
        self.piston_area_m2.unwrap_or(self.pipe_section_area_m2)
    }
}

fn default_gravity() -> f64 {
    GRAVITY
}

/// Which states the output matrix exposes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputsDef {
    #[default]
    FullState,
    MassPosition,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationDef {
    #[serde(default)]
    pub t0_s: f64,
    pub t_end_s: f64,
    pub dt_s: f64,
    #[serde(default = "default_record_every")]
    pub record_every: usize,
}

impl Default for SimulationDef {
    fn default() -> Self {
        Self {
            t0_s: 0.0,
            t_end_s: 50.0,
            dt_s: 1e-3,
            record_every: default_record_every(),
        }
    }
}

fn default_record_every() -> usize {
    1
}

/// How the initial plant state is given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum InitialStateDef {
    /// Raw state `[position m, speed m/s, pressure-equivalent Pa]`.
    Explicit { x: [f64; 3] },
    /// Mass at rest, tank filled to the given height.
    TankHeight {
        mass_position_m: f64,
        tank_height_m: f64,
    },
    /// Mass at rest, tank height balancing the spring force.
    SpringBalanced { mass_position_m: f64 },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ControlDef {
    #[default]
    OpenLoop,
    StateFeedback {
        poles_gain: f64,
    },
    ReferenceTracking {
        poles_gain: f64,
        reference_m: f64,
    },
    EstimatedReferenceTracking {
        poles_gain: f64,
        observer_poles_gain: f64,
        reference_m: f64,
        /// Estimator start state; defaults to the plant's initial state.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial_estimate: Option<[f64; 3]>,
    },
}

impl ControlDef {
    pub fn poles_gain(&self) -> Option<f64> {
        match self {
            ControlDef::OpenLoop => None,
            ControlDef::StateFeedback { poles_gain }
            | ControlDef::ReferenceTracking { poles_gain, .. }
            | ControlDef::EstimatedReferenceTracking { poles_gain, .. } => Some(*poles_gain),
        }
    }

    /// Same control with the state-feedback poles gain replaced.
    pub fn with_poles_gain(&self, gain: f64) -> ControlDef {
        let mut out = self.clone();
        match &mut out {
            ControlDef::OpenLoop => {}
            ControlDef::StateFeedback { poles_gain }
            | ControlDef::ReferenceTracking { poles_gain, .. }
            | ControlDef::EstimatedReferenceTracking { poles_gain, .. } => *poles_gain = gain,
        }
        out
    }
}

/// Structural diagnostics to run before integrating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChecksDef {
    #[serde(default = "enabled")]
    pub controllability: bool,
    #[serde(default = "enabled")]
    pub observability: bool,
}

impl Default for ChecksDef {
    fn default() -> Self {
        Self {
            controllability: true,
            observability: true,
        }
    }
}

fn enabled() -> bool {
    true
}
