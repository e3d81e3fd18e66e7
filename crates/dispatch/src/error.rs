//! Dispatch error types.
//!
//! Every failure surfaces to the caller as a distinguishable variant; nothing
//! is retried or swallowed, and no partial result is ever returned. A failed
//! role check is not an error — see `Outcome::Denied`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The identity profile is malformed (e.g. an empty role).
    #[error(transparent)]
    InvalidIdentity(#[from] policy::Error),

    /// The tool host could not be spawned or the handshake failed.
    #[error("failed to reach tool host: {0}")]
    Connection(#[source] mcp::Error),

    /// The tool call itself failed, with the host's error detail.
    #[error("tool invocation failed: {0}")]
    ToolCall(#[source] mcp::Error),

    /// The handshake or the tool call exceeded its bound.
    #[error("tool host operation timed out")]
    Timeout,
}

impl Error {
    pub(crate) fn connection(e: mcp::Error) -> Self {
        match e {
            mcp::Error::Timeout => Error::Timeout,
            e => Error::Connection(e),
        }
    }

    pub(crate) fn tool_call(e: mcp::Error) -> Self {
        match e {
            mcp::Error::Timeout => Error::Timeout,
            e => Error::ToolCall(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
