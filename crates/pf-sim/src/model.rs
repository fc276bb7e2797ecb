//! Seam between the integrator and the system being integrated.

use crate::error::SimResult;

/// A continuous-time system `x' = f(t, x)` over an arbitrary state type.
///
/// The integrator only needs the derivative and the two vector-space
/// operations on states; it never looks inside them.
pub trait TransientModel {
    type State: Clone;

    fn initial_state(&self) -> Self::State;

    /// Derivative of `x` at time `t`.
    ///
    /// Takes `&mut self` so models may keep per-step scratch data.
    fn rhs(&mut self, t: f64, x: &Self::State) -> SimResult<Self::State>;

    /// `a + b`
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// `scale * a`
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;
}
