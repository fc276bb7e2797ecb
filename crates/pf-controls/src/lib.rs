//! Control design for third-order, single-input plants.
//!
//! This crate turns a state-space model into the gains needed to run it in
//! closed loop:
//!
//! - **Rank tests**: controllability and observability of (A, B) and (A, C)
//! - **Pole placement**: state-feedback gain K and observer gain L that put
//!   every closed-loop pole at one repeated target location
//! - **Reference gain**: feedforward gain N so the tracked output settles on
//!   the reference
//! - **Control laws**: the input rules consumed by the simulator
//!
//! # Design Principles
//!
//! - **Closed form over symbolic**: characteristic-polynomial coefficients are
//!   expanded analytically, then matched by a small linear solve
//! - **One routine, two uses**: K and L come from the same placement code,
//!   the observer case being the dual of the feedback case
//! - **Fail loudly**: singular or inconsistent systems are errors, never
//!   silently replaced by default gains

pub mod error;
pub mod law;
pub mod placement;
pub mod rank;
pub mod reference;

pub use error::{ControlError, ControlResult};
pub use law::ControlLaw;
pub use placement::{
    PolePlacement, Synthesis, characteristic_coefficients, observer_gain, place_poles,
    state_feedback_gain, target_pole,
};
pub use rank::{
    controllability_matrix, is_controllable, is_observable, matrix_rank, observability_matrix,
};
pub use reference::{ReferenceGain, reference_gain};
