//! Engineering knowledge base served as a tool host.
//!
//! Exposes one tool (`get_material_specs`) and one read-only resource
//! (`config://safety-standards`). Both are deterministic and synthetic; no
//! external I/O happens in a handler.

use mcp::ToolRegistry;
use serde_json::{Value, json};
use thiserror::Error;

/// Name the tool host reports during the initialize handshake.
pub const HOST_NAME: &str = "engineering-knowledge-base";

/// Tool name for material property lookups.
pub const MATERIAL_SPECS_TOOL: &str = "get_material_specs";

/// URI of the safety standards resource.
pub const SAFETY_STANDARDS_URI: &str = "config://safety-standards";

/// Current mechanical safety regulations.
pub const SAFETY_STANDARDS: &str = "All moving joints require a 15% torque buffer.";

// Verified entries: (material, yield strength, thermal conductivity).
const MATERIALS: &[(&str, &str, &str)] = &[
    ("Steel", "250MPa", "50W/mK"),
    ("Aluminum", "95MPa", "205W/mK"),
    ("Titanium", "880MPa", "21.9W/mK"),
];

#[derive(Debug, Error)]
pub enum Error {
    #[error("material_name must not be empty")]
    EmptyMaterialName,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Retrieve thermal and mechanical properties for a material.
///
/// Pure function of its input. Materials without a verified entry get
/// echo-back formatting with an explicit fallback notice rather than an
/// error.
pub fn material_specs(material_name: &str) -> Result<String> {
    let name = material_name.trim();
    if name.is_empty() {
        return Err(Error::EmptyMaterialName);
    }

    match MATERIALS.iter().find(|(m, _, _)| *m == name) {
        Some((material, yield_strength, thermal)) => Ok(format!(
            "Spec for {material}: Yield Strength {yield_strength}, Thermal Cond: {thermal}"
        )),
        None => Ok(format!(
            "Spec for {name}: no verified entry on file; consult the materials desk before use"
        )),
    }
}

/// Build the registry this knowledge base serves.
///
/// Each call builds an independent registry, so tests can run as many hosts
/// as they like side by side.
pub fn registry() -> ToolRegistry {
    ToolRegistry::new()
        .tool(
            MATERIAL_SPECS_TOOL,
            "Retrieve thermal and mechanical properties for a material.",
            json!({
                "type": "object",
                "required": ["material_name"],
                "properties": {
                    "material_name": {
                        "type": "string",
                        "description": "Material to look up, e.g. \"Steel\""
                    }
                }
            }),
            |args| {
                let name = args
                    .get("material_name")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                material_specs(name).map_err(|e| e.to_string())
            },
        )
        .resource(
            SAFETY_STANDARDS_URI,
            "safety-standards",
            "Current mechanical safety regulations.",
            || SAFETY_STANDARDS.to_string(),
        )
}
