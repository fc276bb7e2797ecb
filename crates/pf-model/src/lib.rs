//! Plant model for the spring-mass-damper / piston / pipe / tank system.
//!
//! The plant couples a mass on a spring and damper to a piston that pushes
//! fluid through a pipe into an open tank. Its linearized dynamics are
//!
//! ```text
//! _A x'' + _B x' + _C x - P = 0
//! P' = -_D x' + _E u
//! ```
//!
//! where `x` is the mass position, `P` the tank hydrostatic pressure and `u`
//! the commanded flow into the tank. This crate turns the physical parameters
//! into the continuous-time state-space matrices (A, B, C, D) with state
//! `[mass position, mass velocity, tank pressure]`.

pub mod error;
pub mod outputs;
pub mod params;
pub mod plant;

pub use error::{ModelError, ModelResult};
pub use outputs::{OutputProjector, PlantReadout};
pub use params::PhysicalParameters;
pub use plant::{CouplingCoefficients, ObservedOutputs, STATE_DIM, StateSpaceModel};
