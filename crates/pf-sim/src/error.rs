//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while setting up or running a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Dimension mismatch: {what}")]
    Dimension { what: String },

    #[error("Step budget exceeded: {steps} steps requested, limit is {max_steps}")]
    TooManySteps { steps: usize, max_steps: usize },
}

pub type SimResult<T> = Result<T, SimError>;
