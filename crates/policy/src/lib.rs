//! Role-based authorization gate.
//!
//! Core principle: **no tool host session is ever opened for an identity
//! that fails the gate.**

mod error;
mod gate;

pub use error::{Error, Result};
pub use gate::{DEFAULT_REQUIRED_ROLE, Decision, IdentityProfile, RoleGate};
