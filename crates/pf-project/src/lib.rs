//! pf-project: scenario file format and validation.

pub mod migrate;
pub mod schema;
pub mod validate;

pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{ValidationError, validate_scenario};

use std::path::Path;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Unknown scenario format: {path} (expected .yaml, .yml or .json)")]
    UnknownFormat { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn save_yaml(path: &Path, scenario: &Scenario) -> ProjectResult<()> {
    validate_scenario(scenario)?;
    let content = serde_yaml::to_string(scenario)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    from_json_str(&content)
}

pub fn save_json(path: &Path, scenario: &Scenario) -> ProjectResult<()> {
    validate_scenario(scenario)?;
    let content = serde_json::to_string_pretty(scenario)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// On-disk scenario encoding, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioFormat {
    Yaml,
    Json,
}

impl ScenarioFormat {
    pub fn from_path(path: &Path) -> ProjectResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(ProjectError::UnknownFormat {
                path: path.display().to_string(),
            }),
        }
    }
}

/// Load by file extension.
pub fn load(path: &Path) -> ProjectResult<Scenario> {
    match ScenarioFormat::from_path(path)? {
        ScenarioFormat::Yaml => load_yaml(path),
        ScenarioFormat::Json => load_json(path),
    }
}

/// Save by file extension.
pub fn save(path: &Path, scenario: &Scenario) -> ProjectResult<()> {
    match ScenarioFormat::from_path(path)? {
        ScenarioFormat::Yaml => save_yaml(path, scenario),
        ScenarioFormat::Json => save_json(path, scenario),
    }
}

/// Parse scenario text in the given format, then migrate and validate it.
pub fn from_str_as(format: ScenarioFormat, content: &str) -> ProjectResult<Scenario> {
    match format {
        ScenarioFormat::Yaml => from_yaml_str(content),
        ScenarioFormat::Json => from_json_str(content),
    }
}

pub fn from_yaml_str(content: &str) -> ProjectResult<Scenario> {
    let scenario: Scenario = serde_yaml::from_str(content)?;
    finish_load(scenario)
}

pub fn from_json_str(content: &str) -> ProjectResult<Scenario> {
    let scenario: Scenario = serde_json::from_str(content)?;
    finish_load(scenario)
}

fn finish_load(scenario: Scenario) -> ProjectResult<Scenario> {
    let scenario = migrate_to_latest(scenario)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}
