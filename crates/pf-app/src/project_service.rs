//! Scenario loading, saving and validation.

use std::path::Path;

use pf_project::ScenarioFormat;
use pf_project::schema::Scenario;

use crate::error::{AppError, AppResult};

/// Load a scenario from a YAML or JSON file, migrated and validated.
pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    let format = ScenarioFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ScenarioFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(pf_project::from_str_as(format, &content)?)
}

/// Save a scenario; the format follows the file extension.
pub fn save_scenario(path: &Path, scenario: &Scenario) -> AppResult<()> {
    pf_project::save(path, scenario)?;
    Ok(())
}

/// Validate scenario structure and that the plant model can be derived.
pub fn validate_scenario(scenario: &Scenario) -> AppResult<()> {
    pf_project::validate_scenario(scenario).map_err(pf_project::ProjectError::from)?;
    crate::scenario_compile::compile_scenario(scenario)?;
    Ok(())
}
