//! Error types for control design operations.

use thiserror::Error;

/// Result type for control design operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur while designing gains.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Matrix with the wrong shape for the requested operation.
    #[error("Matrix {matrix} has shape {rows}x{cols}, expected {expected}")]
    Shape {
        matrix: &'static str,
        rows: usize,
        cols: usize,
        expected: &'static str,
    },

    /// A matrix that must be inverted is singular.
    #[error("Singular system in {stage}: {what}")]
    Singular { stage: &'static str, what: String },

    /// Coefficient matching has no (unique, real) solution.
    #[error("Pole placement unsolvable: {what}")]
    Unsolvable { what: String },
}
