//! The session seam between the dispatcher and a tool host.
//!
//! The dispatcher only ever needs two operations from a session: one tool
//! call and a teardown. Putting a trait at that boundary keeps the dispatch
//! logic testable against a mock transport.

use std::future::Future;
use std::time::Duration;

use mcp::{CallToolResult, HostConfig, Session};
use serde_json::Value;

/// A live, scoped connection to a tool host.
pub trait ToolSession: Send {
    /// Perform one tool call.
    fn call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> impl Future<Output = mcp::Result<CallToolResult>> + Send;

    /// Tear the session down. Best effort; errors are not surfaced.
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Opens sessions to a tool host. One session per dispatch, no pooling.
pub trait Connector: Send + Sync {
    type Session: ToolSession;

    /// Open a session, including whatever handshake the transport needs.
    fn connect(&self) -> impl Future<Output = mcp::Result<Self::Session>> + Send;
}

impl ToolSession for Session {
    async fn call_tool(&self, name: &str, arguments: Option<Value>) -> mcp::Result<CallToolResult> {
        Session::call_tool(self, name, arguments).await
    }

    async fn close(self) {
        let _ = self.shutdown().await;
    }
}

/// Production connector: spawns the tool host subprocess and completes the
/// initialize handshake over stdio.
pub struct StdioConnector {
    config: HostConfig,
    timeout: Duration,
}

impl StdioConnector {
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            timeout: mcp::DEFAULT_TIMEOUT,
        }
    }

    /// Bound applied to the handshake and to the tool call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Connector for StdioConnector {
    type Session = Session;

    async fn connect(&self) -> mcp::Result<Session> {
        let session = Session::spawn(self.config.clone())
            .await?
            .with_timeout(self.timeout);
        session.initialize().await?;
        Ok(session)
    }
}
