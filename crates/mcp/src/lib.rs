//! MCP (Model Context Protocol) over stdio — client and host sides.
//!
//! The client side spawns a tool host subprocess and talks to it over
//! newline-delimited JSON-RPC 2.0; the host side serves a [`ToolRegistry`]
//! over its own stdin/stdout.
//!
//! # Client example
//!
//! ```no_run
//! use mcp::{HostConfig, Session};
//! use std::collections::HashMap;
//!
//! # async fn example() -> mcp::Result<()> {
//! let config = HostConfig {
//!     name: "knowledge".to_string(),
//!     command: "foreman".to_string(),
//!     args: vec!["serve".to_string()],
//!     env: HashMap::new(),
//! };
//!
//! let session = Session::spawn(config).await?;
//! session.initialize().await?;
//!
//! let result = session.call_tool("get_material_specs", Some(serde_json::json!({
//!     "material_name": "Steel"
//! }))).await?;
//!
//! session.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Host example
//!
//! ```no_run
//! use mcp::ToolRegistry;
//!
//! # async fn example() -> mcp::Result<()> {
//! let registry = ToolRegistry::new()
//!     .resource("config://motd", "motd", "Message of the day", || "hello".into());
//! mcp::serve(&registry, "example-host").await
//! # }
//! ```

mod client;
mod error;
mod protocol;
mod registry;
mod serve;

pub use client::{DEFAULT_TIMEOUT, HostConfig, MAX_OUTPUT_SIZE, Session};
pub use error::{Error, Result};
pub use protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListResourcesResult, ListToolsResult, PROTOCOL_VERSION,
    ReadResourceParams, ReadResourceResult, RequestId, Resource, ResourceContent, Tool,
    ToolContent,
};
pub use registry::{CallError, ResourceHandler, ToolHandler, ToolRegistry};
pub use serve::{handle_request, serve};
