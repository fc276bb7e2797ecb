//! Scenario definitions to runtime model objects.

use nalgebra::DVector;
use pf_model::{ObservedOutputs, PhysicalParameters, StateSpaceModel};
use pf_project::schema::{InitialStateDef, OutputsDef, PlantDef, Scenario, SimulationDef};
use pf_sim::SimOptions;
use tracing::debug;

use crate::error::AppResult;

/// Everything needed to design gains and integrate one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioRuntime {
    pub params: PhysicalParameters,
    pub model: StateSpaceModel,
    pub options: SimOptions,
    pub initial_state: DVector<f64>,
}

pub fn compile_scenario(scenario: &Scenario) -> AppResult<ScenarioRuntime> {
    let params = plant_parameters(&scenario.plant);
    params.validate()?;
    let model = StateSpaceModel::derive(&params, observed_outputs(scenario.outputs))?;
    debug!(
        a = ?model.a().as_slice(),
        b = ?model.b().as_slice(),
        outputs = model.output_dim(),
        "derived state-space model"
    );

    Ok(ScenarioRuntime {
        initial_state: initial_state(&scenario.initial_state, &params),
        options: sim_options(&scenario.simulation),
        params,
        model,
    })
}

pub fn plant_parameters(plant: &PlantDef) -> PhysicalParameters {
    PhysicalParameters {
        tank_fluid_density: plant.tank_fluid_density_kg_m3,
        pipe_fluid_density: plant.pipe_fluid_density_kg_m3,
        gravity: plant.gravity_m_s2,
        tank_area: plant.tank_area_m2,
        pipe_length: plant.pipe_length_m,
        pipe_section_area: plant.pipe_section_area_m2,
        piston_area: plant.effective_piston_area_m2(),
        mass: plant.mass_kg,
        spring_constant: plant.spring_constant_n_per_m,
        damping_constant: plant.damping_constant_n_s_per_m,
    }
}

pub fn observed_outputs(outputs: OutputsDef) -> ObservedOutputs {
    match outputs {
        OutputsDef::FullState => ObservedOutputs::FullState,
        OutputsDef::MassPosition => ObservedOutputs::MassPosition,
    }
}

pub fn sim_options(sim: &SimulationDef) -> SimOptions {
    SimOptions {
        t0: sim.t0_s,
        t_end: sim.t_end_s,
        dt: sim.dt_s,
        record_every: sim.record_every,
        ..SimOptions::default()
    }
}

/// State vector `[position, speed, pressure-equivalent]`; the mass starts at rest.
pub fn initial_state(init: &InitialStateDef, params: &PhysicalParameters) -> DVector<f64> {
    match init {
        InitialStateDef::Explicit { x } => DVector::from_row_slice(x),
        InitialStateDef::TankHeight {
            mass_position_m,
            tank_height_m,
        } => DVector::from_vec(vec![
            *mass_position_m,
            0.0,
            params.pressure_for_tank_height(*tank_height_m),
        ]),
        InitialStateDef::SpringBalanced { mass_position_m } => {
            let height = params.spring_balanced_tank_height(*mass_position_m);
            DVector::from_vec(vec![
                *mass_position_m,
                0.0,
                params.pressure_for_tank_height(height),
            ])
        }
    }
}
