//! Shared application service layer for pistonflow.
//!
//! This crate provides one interface for the CLI and any other frontend,
//! centralizing scenario loading, gain design, simulation and reporting.

pub mod error;
pub mod project_service;
pub mod report;
pub mod run_service;
pub mod scenario_compile;
pub mod sweep;

pub use error::{AppError, AppResult};
pub use project_service::{load_scenario, save_scenario, validate_scenario};
pub use report::{
    Diagnostics, Divergence, EstimatedSeries, FinalValues, Gains, PoleMap, RunReport, Series,
};
pub use run_service::{ControlDesign, design_control, run_diagnostics, run_scenario, run_scenario_file};
pub use scenario_compile::{ScenarioRuntime, compile_scenario};
pub use sweep::{SweepPoint, sweep_poles_gain};
