//! Fixed-step closed-loop simulation driver.

use crate::error::{SimError, SimResult};
use crate::integrator::{ForwardEuler, Integrator};
use crate::model::TransientModel;
use crate::plant::{ClosedLoopPlant, PlantState};
use crate::trace::{SimulationTrace, TraceSample};
use tracing::{debug, info};

/// Simulation options.
#[derive(Clone, Debug, PartialEq)]
pub struct SimOptions {
    /// Start time (seconds)
    pub t0: f64,
    /// Final simulation time (seconds)
    pub t_end: f64,
    /// Fixed time step (seconds)
    pub dt: f64,
    /// Record every N-th step (decimation); the last step is always kept
    pub record_every: usize,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            t0: 0.0,
            t_end: 50.0,
            dt: 1e-3,
            record_every: 1,
            max_steps: 10_000_000,
        }
    }
}

impl SimOptions {
    /// Number of Euler steps, `floor((t_end - t0) / dt)`.
    pub fn steps(&self) -> SimResult<usize> {
        self.validate()?;
        let steps = ((self.t_end - self.t0) / self.dt).floor();
        if steps > self.max_steps as f64 {
            return Err(SimError::TooManySteps {
                steps: steps as usize,
                max_steps: self.max_steps,
            });
        }
        Ok(steps as usize)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !self.t0.is_finite() || !self.t_end.is_finite() {
            return Err(SimError::InvalidArg {
                what: "t0 and t_end must be finite",
            });
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if self.t_end <= self.t0 {
            return Err(SimError::InvalidArg {
                what: "t_end must be after t0",
            });
        }
        if self.record_every == 0 {
            return Err(SimError::InvalidArg {
                what: "record_every must be positive",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        Ok(())
    }
}

/// Integrate the closed loop with forward Euler and record the trace.
///
/// Samples are taken at t0, every `record_every`-th step, and the final step.
/// Each sample carries the input that drove the plant into it; the t0 sample
/// has none, so it records zero.
pub fn run_closed_loop(
    plant: &mut ClosedLoopPlant,
    opts: &SimOptions,
) -> SimResult<SimulationTrace> {
    let steps = opts.steps()?;
    info!(
        law = plant.law().name(),
        estimator = plant.has_estimator(),
        steps,
        dt = opts.dt,
        "starting closed-loop simulation"
    );

    let mut trace = SimulationTrace::with_capacity(steps / opts.record_every + 2);
    let mut t = opts.t0;
    let mut state = plant.initial_state();
    trace.push(sample(t, &state, 0.0));

    for step in 1..=steps {
        let u = plant.input(&state);
        state = ForwardEuler.step(plant, t, &state, opts.dt)?;
        t += opts.dt;
        if step % opts.record_every == 0 || step == steps {
            trace.push(sample(t, &state, u));
        }
    }

    if let Some(last) = trace.last() {
        debug!(t = last.t, x = ?last.x.as_slice(), u = last.u, "final sample");
    }
    info!(samples = trace.len(), "closed-loop simulation finished");
    Ok(trace)
}

fn sample(t: f64, state: &PlantState, u: f64) -> TraceSample {
    TraceSample {
        t,
        x: state.x.clone(),
        u,
        x_est: state.x_est.clone(),
    }
}
