//! Control laws evaluated once per integration step.

use crate::error::{ControlError, ControlResult};
use nalgebra::{DMatrix, DVector};

/// Rule producing the scalar plant input from a state vector.
///
/// The simulator decides which vector is fed in: the plant state for every
/// law except [`ControlLaw::EstimatedReferenceTracking`], which is fed the
/// observer estimate.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlLaw {
    /// u = 0
    OpenLoop,
    /// u = -K x
    StateFeedback { k: DMatrix<f64> },
    /// u = N r - K x
    ReferenceTracking { k: DMatrix<f64>, feedforward: f64 },
    /// u = N r - K x_est
    EstimatedReferenceTracking { k: DMatrix<f64>, feedforward: f64 },
}

impl ControlLaw {
    pub fn state_feedback(k: &DMatrix<f64>) -> ControlResult<Self> {
        check_gain(k)?;
        Ok(Self::StateFeedback { k: k.clone() })
    }

    pub fn reference_tracking(
        k: &DMatrix<f64>,
        n: &DMatrix<f64>,
        reference: &DVector<f64>,
    ) -> ControlResult<Self> {
        check_gain(k)?;
        Ok(Self::ReferenceTracking {
            k: k.clone(),
            feedforward: feedforward(n, reference)?,
        })
    }

    pub fn estimated_reference_tracking(
        k: &DMatrix<f64>,
        n: &DMatrix<f64>,
        reference: &DVector<f64>,
    ) -> ControlResult<Self> {
        check_gain(k)?;
        Ok(Self::EstimatedReferenceTracking {
            k: k.clone(),
            feedforward: feedforward(n, reference)?,
        })
    }

    /// Whether the law must be fed the observer estimate.
    pub fn uses_estimate(&self) -> bool {
        matches!(self, Self::EstimatedReferenceTracking { .. })
    }

    /// Input for the given feedback state.
    pub fn input(&self, state: &DVector<f64>) -> f64 {
        match self {
            Self::OpenLoop => 0.0,
            Self::StateFeedback { k } => -row_dot(k, state),
            Self::ReferenceTracking { k, feedforward }
            | Self::EstimatedReferenceTracking { k, feedforward } => {
                feedforward - row_dot(k, state)
            }
        }
    }

    /// Length of the state vector the gain expects; `None` for open loop.
    pub fn state_dim(&self) -> Option<usize> {
        match self {
            Self::OpenLoop => None,
            Self::StateFeedback { k }
            | Self::ReferenceTracking { k, .. }
            | Self::EstimatedReferenceTracking { k, .. } => Some(k.ncols()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenLoop => "open loop",
            Self::StateFeedback { .. } => "state feedback",
            Self::ReferenceTracking { .. } => "reference tracking",
            Self::EstimatedReferenceTracking { .. } => "estimated reference tracking",
        }
    }
}

/// Callers check `k.ncols() == x.len()` up front, see [`ControlLaw::state_dim`].
fn row_dot(k: &DMatrix<f64>, x: &DVector<f64>) -> f64 {
    k.iter().zip(x.iter()).map(|(ki, xi)| ki * xi).sum()
}

fn check_gain(k: &DMatrix<f64>) -> ControlResult<()> {
    if k.nrows() == 1 && k.ncols() > 0 {
        Ok(())
    } else {
        Err(ControlError::Shape {
            matrix: "K",
            rows: k.nrows(),
            cols: k.ncols(),
            expected: "1 x n",
        })
    }
}

/// N r for a single-input plant.
fn feedforward(n: &DMatrix<f64>, reference: &DVector<f64>) -> ControlResult<f64> {
    if n.shape() != (1, 1) {
        return Err(ControlError::Shape {
            matrix: "N",
            rows: n.nrows(),
            cols: n.ncols(),
            expected: "1x1",
        });
    }
    if reference.len() != 1 {
        return Err(ControlError::InvalidArg {
            what: "reference must have exactly one entry",
        });
    }
    Ok(n[(0, 0)] * reference[0])
}
