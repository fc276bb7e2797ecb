//! Closed-loop plant, optionally augmented with a Luenberger estimator.

use crate::error::{SimError, SimResult};
use crate::model::TransientModel;
use nalgebra::{DMatrix, DVector};
use pf_controls::ControlLaw;
use pf_model::StateSpaceModel;

/// Luenberger estimator `x_est' = A x_est + B u + L (C x - C x_est)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimator {
    /// Observer gain (n x k).
    pub l: DMatrix<f64>,
    /// Measured outputs (k x n).
    pub c: DMatrix<f64>,
    /// Estimate at the start of the run.
    pub initial: DVector<f64>,
}

/// Plant state, plus the estimate when an estimator runs alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantState {
    pub x: DVector<f64>,
    pub x_est: Option<DVector<f64>>,
}

/// `x' = A x + B u` under a [`ControlLaw`].
#[derive(Debug, Clone)]
pub struct ClosedLoopPlant {
    a: DMatrix<f64>,
    b: DVector<f64>,
    law: ControlLaw,
    initial: DVector<f64>,
    estimator: Option<Estimator>,
}

impl ClosedLoopPlant {
    pub fn new(
        model: &StateSpaceModel,
        law: ControlLaw,
        initial: DVector<f64>,
        estimator: Option<Estimator>,
    ) -> SimResult<Self> {
        let n = model.state_dim();
        if model.input_dim() != 1 {
            return Err(SimError::Dimension {
                what: format!("plant must have a single input, has {}", model.input_dim()),
            });
        }
        check_state("initial state", &initial, n)?;
        if let Some(cols) = law.state_dim().filter(|&cols| cols != n) {
            return Err(SimError::Dimension {
                what: format!("gain K must be 1 x {n}, got 1x{cols}"),
            });
        }

        if let Some(est) = &estimator {
            check_state("initial estimate", &est.initial, n)?;
            if est.c.ncols() != n || est.c.nrows() == 0 {
                return Err(SimError::Dimension {
                    what: format!(
                        "estimator C must be k x {n}, got {}x{}",
                        est.c.nrows(),
                        est.c.ncols()
                    ),
                });
            }
            if est.l.shape() != (n, est.c.nrows()) {
                return Err(SimError::Dimension {
                    what: format!(
                        "estimator L must be {n} x {}, got {}x{}",
                        est.c.nrows(),
                        est.l.nrows(),
                        est.l.ncols()
                    ),
                });
            }
        } else if law.uses_estimate() {
            return Err(SimError::InvalidArg {
                what: "control law feeds back the estimate but no estimator is configured",
            });
        }

        Ok(Self {
            a: model.a().clone(),
            b: model.b().column(0).into_owned(),
            law,
            initial,
            estimator,
        })
    }

    pub fn law(&self) -> &ControlLaw {
        &self.law
    }

    pub fn has_estimator(&self) -> bool {
        self.estimator.is_some()
    }

    /// Input the law applies in `state`.
    pub fn input(&self, state: &PlantState) -> f64 {
        match (&state.x_est, self.law.uses_estimate()) {
            (Some(x_est), true) => self.law.input(x_est),
            _ => self.law.input(&state.x),
        }
    }
}

impl TransientModel for ClosedLoopPlant {
    type State = PlantState;

    fn initial_state(&self) -> PlantState {
        PlantState {
            x: self.initial.clone(),
            x_est: self.estimator.as_ref().map(|e| e.initial.clone()),
        }
    }

    fn rhs(&mut self, _t: f64, state: &PlantState) -> SimResult<PlantState> {
        let u = self.input(state);
        let xdot = &self.a * &state.x + &self.b * u;

        let x_est_dot = match (&self.estimator, &state.x_est) {
            (Some(est), Some(x_est)) => {
                let y = &est.c * &state.x;
                let y_est = &est.c * x_est;
                Some(&self.a * x_est + &self.b * u + &est.l * (y - y_est))
            }
            (None, None) => None,
            _ => {
                return Err(SimError::InvalidArg {
                    what: "estimate present without estimator (or the reverse)",
                });
            }
        };

        Ok(PlantState {
            x: xdot,
            x_est: x_est_dot,
        })
    }

    fn add(&self, a: &PlantState, b: &PlantState) -> PlantState {
        PlantState {
            x: &a.x + &b.x,
            x_est: match (&a.x_est, &b.x_est) {
                (Some(ea), Some(eb)) => Some(ea + eb),
                _ => None,
            },
        }
    }

    fn scale(&self, a: &PlantState, scale: f64) -> PlantState {
        PlantState {
            x: &a.x * scale,
            x_est: a.x_est.as_ref().map(|e| e * scale),
        }
    }
}

fn check_state(what: &str, v: &DVector<f64>, n: usize) -> SimResult<()> {
    if v.len() != n {
        return Err(SimError::Dimension {
            what: format!("{what} has {} entries, expected {n}", v.len()),
        });
    }
    if v.iter().any(|x| !x.is_finite()) {
        return Err(SimError::InvalidArg {
            what: "initial vectors must be finite",
        });
    }
    Ok(())
}
