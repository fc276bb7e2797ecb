//! Schema migration framework.

use crate::ProjectError;
use crate::schema::Scenario;

pub const LATEST_VERSION: u32 = 2;

pub fn migrate_to_latest(mut scenario: Scenario) -> Result<Scenario, ProjectError> {
    while scenario.version < LATEST_VERSION {
        scenario = migrate_one_version(scenario)?;
    }
    Ok(scenario)
}

fn migrate_one_version(scenario: Scenario) -> Result<Scenario, ProjectError> {
    match scenario.version {
        1 => migrate_v1_to_v2(scenario),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 2 splits the shared fluid density into tank and pipe densities.
fn migrate_v1_to_v2(mut scenario: Scenario) -> Result<Scenario, ProjectError> {
    let plant = &mut scenario.plant;
    if let Some(rho) = plant.fluid_density_kg_m3.take() {
        if plant.tank_fluid_density_kg_m3 == 0.0 {
            plant.tank_fluid_density_kg_m3 = rho;
        }
        if plant.pipe_fluid_density_kg_m3 == 0.0 {
            plant.pipe_fluid_density_kg_m3 = rho;
        }
    }
    scenario.version = 2;
    Ok(scenario)
}
