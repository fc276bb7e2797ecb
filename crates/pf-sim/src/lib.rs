//! Transient simulation of the plant under a control law.
//!
//! Provides:
//! - A pluggable `TransientModel` / `Integrator` pair
//! - Fixed-step forward Euler integration
//! - The closed-loop plant, optionally coupled with a Luenberger estimator
//! - Append-only simulation traces

pub mod error;
pub mod integrator;
pub mod model;
pub mod plant;
pub mod sim;
pub mod trace;

pub use error::{SimError, SimResult};
pub use integrator::{ForwardEuler, Integrator};
pub use model::TransientModel;
pub use plant::{ClosedLoopPlant, Estimator, PlantState};
pub use sim::{SimOptions, run_closed_loop};
pub use trace::{SimulationTrace, TraceSample};
