//! Configuration loading from foreman.toml.

use mcp::HostConfig;
use policy::RoleGate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Role gate applied before any dispatch.
    pub gate: RoleGate,

    /// Tool host to spawn per dispatch.
    pub host: HostSection,
}

/// Tool host configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HostSection {
    /// Command to spawn. When unset, the current executable is re-run with
    /// `serve` and `args` is ignored.
    pub command: Option<String>,

    /// Arguments passed to `command`.
    pub args: Vec<String>,

    /// Bound on the handshake and on the tool call, in seconds.
    pub timeout_secs: u64,
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            timeout_secs: 15,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Per-request timeout for tool host sessions.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.host.timeout_secs)
    }

    /// Build the spawn configuration for the tool host.
    pub fn host_config(&self) -> Result<HostConfig, ConfigError> {
        let (command, args) = match &self.host.command {
            Some(command) => (command.clone(), self.host.args.clone()),
            None => {
                let exe = std::env::current_exe()?;
                (exe.to_string_lossy().into_owned(), vec!["serve".to_string()])
            }
        };

        Ok(HostConfig {
            name: knowledge::HOST_NAME.to_string(),
            command,
            args,
            env: HashMap::new(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),
}
