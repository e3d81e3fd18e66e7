//! Authorization-gated remote tool invocation.
//!
//! A caller with an identity attribute asks the [`Dispatcher`] to run a
//! query. The dispatcher checks the identity's role against a [`RoleGate`];
//! only if authorized does it open a scoped session to a tool host, perform
//! exactly one tool call, and return the formatted result. A failed role
//! check is a normal [`Outcome::Denied`], never a session.
//!
//! # Example
//!
//! ```ignore
//! use dispatch::{Dispatcher, StdioConnector};
//! use mcp::HostConfig;
//! use policy::{IdentityProfile, RoleGate};
//!
//! # async fn example() -> dispatch::Result<()> {
//! let connector = StdioConnector::new(HostConfig {
//!     name: "knowledge".into(),
//!     command: "foreman".into(),
//!     args: vec!["serve".into()],
//!     env: Default::default(),
//! });
//! let dispatcher = Dispatcher::new(RoleGate::default(), connector);
//!
//! let identity = IdentityProfile::new("SeniorEngineer");
//! let outcome = dispatcher.execute(&identity, "what can steel take?").await?;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

mod connector;
mod dispatcher;
mod error;

pub use connector::{Connector, StdioConnector, ToolSession};
pub use dispatcher::{Dispatcher, Outcome, UNAUTHORIZED_MESSAGE};
pub use error::{Error, Result};

// Re-export the gate types callers need to construct a dispatcher.
pub use policy::{IdentityProfile, RoleGate};
