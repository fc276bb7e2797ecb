//! Error types for the pf-app service layer.

use std::path::PathBuf;

/// Application error wrapping the backend crates, shared by every frontend.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scenario error: {0}")]
    Project(#[from] pf_project::ProjectError),

    #[error("Plant model error: {0}")]
    Model(#[from] pf_model::ModelError),

    #[error("Control design failed: {0}")]
    Control(#[from] pf_controls::ControlError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] pf_sim::SimError),

    #[error("Failed to read scenario file: {path}")]
    ScenarioFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Report serialization failed: {0}")]
    Report(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for pf-app operations.
pub type AppResult<T> = Result<T, AppError>;
