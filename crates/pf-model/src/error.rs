//! Error types for plant model derivation.

use pf_core::PfError;
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

/// Configuration errors detected before any matrix is built.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid physical parameter: {0}")]
    InvalidParameter(#[from] PfError),

    #[error(
        "Piston area ({piston_area} m^2) must equal pipe section area ({pipe_section_area} m^2)"
    )]
    AreaMismatch {
        piston_area: f64,
        pipe_section_area: f64,
    },

    #[error("Matrix {matrix} has shape {rows}x{cols}, expected {expected}")]
    Shape {
        matrix: &'static str,
        rows: usize,
        cols: usize,
        expected: &'static str,
    },
}
