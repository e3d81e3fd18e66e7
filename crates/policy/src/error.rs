//! Policy error types.

use thiserror::Error;

/// Policy errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The identity profile is malformed (e.g. an empty role).
    ///
    /// Distinct from a denial: a well-formed identity with the wrong role is
    /// denied, not invalid.
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),
}

pub type Result<T> = std::result::Result<T, Error>;
