//! Stdio serving loop for a tool host.
//!
//! Reads newline-delimited JSON-RPC 2.0 requests from stdin and writes one
//! response line per request to stdout, until stdin closes. Diagnostics go to
//! stderr via `tracing`; stdout carries only protocol traffic.

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::error::Result;
use crate::protocol::PROTOCOL_VERSION;
use crate::registry::{CallError, ToolRegistry};

// --- JSON-RPC reply helpers ---

fn ok_result(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

fn tool_ok(id: Value, text: impl Into<String>) -> Value {
    ok_result(
        id,
        json!({
            "content": [{"type": "text", "text": text.into()}]
        }),
    )
}

fn tool_error(id: Value, text: impl Into<String>) -> Value {
    ok_result(
        id,
        json!({
            "content": [{"type": "text", "text": text.into()}],
            "isError": true
        }),
    )
}

fn rpc_error(id: Value, code: i64, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message.into()
        }
    })
}

// --- Request routing ---

/// Route one JSON-RPC request to the registry.
///
/// Returns `Value::Null` as a sentinel for notifications, which get no
/// response line.
pub fn handle_request(registry: &ToolRegistry, host_name: &str, request: &Value) -> Value {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = match request.get("method").and_then(|m| m.as_str()) {
        Some(m) => m,
        None => return rpc_error(id, -32600, "missing method"),
    };
    let params = request.get("params").cloned().unwrap_or_else(|| json!({}));

    match method {
        "initialize" => handle_initialize(id, host_name),
        "tools/list" => ok_result(
            id,
            json!({ "tools": serde_json::to_value(registry.tools()).unwrap_or(Value::Null) }),
        ),
        "tools/call" => handle_tools_call(registry, id, &params),
        "resources/list" => ok_result(
            id,
            json!({ "resources": serde_json::to_value(registry.resources()).unwrap_or(Value::Null) }),
        ),
        "resources/read" => handle_resources_read(registry, id, &params),
        "ping" => ok_result(id, json!({})),
        m if m.starts_with("notifications/") => Value::Null,
        _ => rpc_error(id, -32601, format!("method not found: {method}")),
    }
}

fn handle_initialize(id: Value, host_name: &str) -> Value {
    ok_result(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {}
            },
            "serverInfo": {
                "name": host_name,
                "version": env!("CARGO_PKG_VERSION")
            }
        }),
    )
}

fn handle_tools_call(registry: &ToolRegistry, id: Value, params: &Value) -> Value {
    let name = match params.get("name").and_then(|n| n.as_str()) {
        Some(n) => n,
        None => return rpc_error(id, -32602, "missing tool name"),
    };
    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    debug!(tool = name, "tool call");

    match registry.call(name, &arguments) {
        Ok(text) => tool_ok(id, text),
        Err(e @ CallError::UnknownTool(_)) => rpc_error(id, -32602, e.to_string()),
        Err(e @ CallError::InvalidArguments(_)) => rpc_error(id, -32602, e.to_string()),
        Err(CallError::Failed(text)) => tool_error(id, text),
    }
}

fn handle_resources_read(registry: &ToolRegistry, id: Value, params: &Value) -> Value {
    let uri = match params.get("uri").and_then(|u| u.as_str()) {
        Some(u) => u,
        None => return rpc_error(id, -32602, "missing resource uri"),
    };

    debug!(uri, "resource read");

    match registry.read(uri) {
        Some(text) => ok_result(
            id,
            json!({
                "contents": [{"uri": uri, "mimeType": "text/plain", "text": text}]
            }),
        ),
        None => rpc_error(id, -32002, format!("resource not found: {uri}")),
    }
}

/// Serve the registry over stdin/stdout until stdin closes.
pub async fn serve(registry: &ToolRegistry, host_name: &str) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    debug!(host = host_name, "serving tool host on stdio");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(line) {
            Ok(request) => handle_request(registry, host_name, &request),
            Err(e) => rpc_error(Value::Null, -32700, format!("parse error: {e}")),
        };

        if response.is_null() {
            continue;
        }

        stdout.write_all(response.to_string().as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    debug!(host = host_name, "stdin closed, shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_registry() -> ToolRegistry {
        ToolRegistry::new()
            .tool(
                "echo",
                "Echo the input back",
                json!({
                    "type": "object",
                    "required": ["text"],
                    "properties": {"text": {"type": "string"}}
                }),
                |args| {
                    let text = args.get("text").and_then(Value::as_str).unwrap_or_default();
                    Ok(format!("echo: {text}"))
                },
            )
            .resource("config://greeting", "greeting", "A static greeting", || {
                "hello".to_string()
            })
    }

    #[test]
    fn initialize_reports_protocol_and_capabilities() {
        let registry = test_registry();
        let request = json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}});
        let response = handle_request(&registry, "test-host", &request);

        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert!(response["result"]["capabilities"]["tools"].is_object());
        assert!(response["result"]["capabilities"]["resources"].is_object());
        assert_eq!(response["result"]["serverInfo"]["name"], "test-host");
    }

    #[test]
    fn tools_call_round_trip() {
        let registry = test_registry();
        let request = json!({
            "jsonrpc": "2.0", "id": 2, "method": "tools/call",
            "params": {"name": "echo", "arguments": {"text": "hi"}}
        });
        let response = handle_request(&registry, "test-host", &request);

        assert_eq!(response["result"]["content"][0]["text"], "echo: hi");
        assert!(response["result"].get("isError").is_none());
    }

    #[test]
    fn invalid_arguments_are_a_request_error() {
        let registry = test_registry();
        let request = json!({
            "jsonrpc": "2.0", "id": 3, "method": "tools/call",
            "params": {"name": "echo", "arguments": {"text": 42}}
        });
        let response = handle_request(&registry, "test-host", &request);
        assert_eq!(response["error"]["code"], -32602);
    }

    #[test]
    fn unknown_method_is_not_found() {
        let registry = test_registry();
        let request = json!({"jsonrpc": "2.0", "id": 4, "method": "bogus/method"});
        let response = handle_request(&registry, "test-host", &request);
        assert_eq!(response["error"]["code"], -32601);
    }

    #[test]
    fn notifications_get_no_response() {
        let registry = test_registry();
        let request = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        let response = handle_request(&registry, "test-host", &request);
        assert!(response.is_null());
    }

    #[test]
    fn resources_read_returns_text_content() {
        let registry = test_registry();
        let request = json!({
            "jsonrpc": "2.0", "id": 5, "method": "resources/read",
            "params": {"uri": "config://greeting"}
        });
        let response = handle_request(&registry, "test-host", &request);
        assert_eq!(response["result"]["contents"][0]["text"], "hello");

        let request = json!({
            "jsonrpc": "2.0", "id": 6, "method": "resources/read",
            "params": {"uri": "config://missing"}
        });
        let response = handle_request(&registry, "test-host", &request);
        assert_eq!(response["error"]["code"], -32002);
    }
}
