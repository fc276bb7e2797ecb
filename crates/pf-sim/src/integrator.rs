//! Fixed-step time integrators.

use crate::error::SimResult;
use crate::model::TransientModel;

/// Trait for time integrators.
pub trait Integrator {
    /// Advance state by one time step using the transient model.
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State>;
}

/// Forward Euler (explicit, 1st order): `x_new = x + rhs(t, x) * dt`.
///
/// No step-size control; an unstable model diverges and the values are kept.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let xdot = model.rhs(t, x)?;
        Ok(model.add(x, &model.scale(&xdot, dt)))
    }
}
