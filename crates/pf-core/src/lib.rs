//! pf-core: stable foundation for pistonflow.
//!
//! Contains:
//! - numeric (positivity checks, relative comparison)
//! - constants (named fluid densities, gravity)
//! - error (shared error types)

pub mod constants;
pub mod error;
pub mod numeric;

pub use error::PfError;
pub use numeric::*;
