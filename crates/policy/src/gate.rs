//! Identity profiles and the role gate.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Role required for engineering tool execution unless configured otherwise.
pub const DEFAULT_REQUIRED_ROLE: &str = "SeniorEngineer";

/// An identity attribute set supplied by the embedding application.
///
/// Immutable for the duration of a call; this crate only reads `role`.
/// Where the profile comes from (auth system, session layer) is the caller's
/// concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub role: String,
}

impl IdentityProfile {
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }

    /// Reject profiles with an empty role before any authorization decision.
    pub fn validate(&self) -> Result<()> {
        if self.role.trim().is_empty() {
            return Err(Error::InvalidIdentity("role must not be empty".into()));
        }
        Ok(())
    }
}

/// Result of a gate check.
#[derive(Debug, Clone)]
pub enum Decision {
    Allow,
    Deny { reason: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Equality-based authorization gate preceding any privileged action.
///
/// Deserializable so a config file can embed the rule directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleGate {
    pub required_role: String,
}

impl Default for RoleGate {
    fn default() -> Self {
        Self {
            required_role: DEFAULT_REQUIRED_ROLE.to_string(),
        }
    }
}

impl RoleGate {
    pub fn new(required_role: impl Into<String>) -> Self {
        Self {
            required_role: required_role.into(),
        }
    }

    /// Check an identity against the required role.
    pub fn check(&self, identity: &IdentityProfile) -> Decision {
        if identity.role == self.required_role {
            Decision::Allow
        } else {
            Decision::Deny {
                reason: format!(
                    "role '{}' is not authorized (requires '{}')",
                    identity.role, self.required_role
                ),
            }
        }
    }
}
