//! Tool and resource registry.
//!
//! The registry is an explicit object built at startup and handed to the
//! serving loop by reference. Nothing here is process-global, so tests can
//! build as many independent registries as they need.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::protocol::{Resource, Tool};

/// Handler for a tool call. Receives the validated argument object and
/// returns the text content of the reply, or an error message surfaced to
/// the caller with the `isError` flag set.
pub type ToolHandler =
    Box<dyn Fn(&Map<String, Value>) -> std::result::Result<String, String> + Send + Sync>;

/// Handler for a resource read. Resources take no arguments.
pub type ResourceHandler = Box<dyn Fn() -> String + Send + Sync>;

/// Errors from dispatching a call through the registry.
#[derive(Debug, Clone, Error)]
pub enum CallError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Failed(String),
}

struct ToolEntry {
    name: String,
    description: String,
    input_schema: Value,
    handler: ToolHandler,
}

struct ResourceEntry {
    uri: String,
    name: String,
    description: String,
    handler: ResourceHandler,
}

/// A named set of tools and read-only resources exposed by a tool host.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<ToolEntry>,
    resources: Vec<ResourceEntry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool with its input schema and handler.
    pub fn tool(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: impl Fn(&Map<String, Value>) -> std::result::Result<String, String>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.tools.push(ToolEntry {
            name: name.into(),
            description: description.into(),
            input_schema,
            handler: Box::new(handler),
        });
        self
    }

    /// Register an argument-less readable resource.
    pub fn resource(
        mut self,
        uri: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.resources.push(ResourceEntry {
            uri: uri.into(),
            name: name.into(),
            description: description.into(),
            handler: Box::new(handler),
        });
        self
    }

    /// Tool specifications, as listed over the wire.
    pub fn tools(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|t| Tool {
                name: t.name.clone(),
                description: Some(t.description.clone()),
                input_schema: t.input_schema.clone(),
            })
            .collect()
    }

    /// Resource listings, as listed over the wire.
    pub fn resources(&self) -> Vec<Resource> {
        self.resources
            .iter()
            .map(|r| Resource {
                uri: r.uri.clone(),
                name: r.name.clone(),
                description: Some(r.description.clone()),
                mime_type: Some("text/plain".to_string()),
            })
            .collect()
    }

    /// Dispatch a tool call by name.
    ///
    /// Arguments are validated against the tool's declared schema before the
    /// handler runs, so handlers can rely on required keys being present with
    /// the declared primitive types.
    pub fn call(&self, name: &str, arguments: &Value) -> std::result::Result<String, CallError> {
        let entry = self
            .tools
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| CallError::UnknownTool(name.to_string()))?;

        let empty = Map::new();
        let args = match arguments {
            Value::Null => &empty,
            Value::Object(map) => map,
            other => {
                return Err(CallError::InvalidArguments(format!(
                    "expected an object, got {other}"
                )));
            }
        };

        validate_arguments(&entry.input_schema, args).map_err(CallError::InvalidArguments)?;

        (entry.handler)(args).map_err(CallError::Failed)
    }

    /// Read a resource by URI. Returns `None` for unknown URIs.
    pub fn read(&self, uri: &str) -> Option<String> {
        self.resources
            .iter()
            .find(|r| r.uri == uri)
            .map(|r| (r.handler)())
    }
}

/// Validate an argument object against a JSON schema fragment.
///
/// Covers what the registry's schemas actually declare: the `required` list
/// and primitive `type` tags under `properties`. Not a general validator.
fn validate_arguments(schema: &Value, args: &Map<String, Value>) -> std::result::Result<(), String> {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !args.contains_key(key) {
                return Err(format!("missing required argument '{key}'"));
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };

    for (key, value) in args {
        let Some(declared) = properties.get(key) else {
            return Err(format!("unexpected argument '{key}'"));
        };
        let Some(expected) = declared.get("type").and_then(Value::as_str) else {
            continue;
        };
        let matches = match expected {
            "string" => value.is_string(),
            "number" => value.is_number(),
            "integer" => value.is_i64() || value.is_u64(),
            "boolean" => value.is_boolean(),
            "array" => value.is_array(),
            "object" => value.is_object(),
            _ => true,
        };
        if !matches {
            return Err(format!("argument '{key}' must be of type {expected}"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_registry() -> ToolRegistry {
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
    fn call_with_valid_arguments() {
        let registry = echo_registry();
        let out = registry.call("echo", &json!({"text": "hi"})).unwrap();
        assert_eq!(out, "echo: hi");
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let registry = echo_registry();
        let err = registry.call("nope", &json!({})).unwrap_err();
        assert!(matches!(err, CallError::UnknownTool(_)));
    }

    #[test]
    fn missing_required_argument_is_rejected_before_the_handler() {
        let registry = echo_registry();
        let err = registry.call("echo", &json!({})).unwrap_err();
        assert!(matches!(err, CallError::InvalidArguments(_)));
    }

    #[test]
    fn wrong_argument_type_is_rejected() {
        let registry = echo_registry();
        let err = registry.call("echo", &json!({"text": 42})).unwrap_err();
        assert!(matches!(err, CallError::InvalidArguments(_)));
    }

    #[test]
    fn undeclared_argument_is_rejected() {
        let registry = echo_registry();
        let err = registry
            .call("echo", &json!({"text": "hi", "extra": true}))
            .unwrap_err();
        assert!(matches!(err, CallError::InvalidArguments(_)));
    }

    #[test]
    fn resource_read_by_uri() {
        let registry = echo_registry();
        assert_eq!(registry.read("config://greeting").unwrap(), "hello");
        assert!(registry.read("config://missing").is_none());
    }

    #[test]
    fn listings_expose_schema_and_uri() {
        let registry = echo_registry();
        let tools = registry.tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "echo");
        assert!(tools[0].input_schema.get("required").is_some());

        let resources = registry.resources();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].uri, "config://greeting");
    }
}
