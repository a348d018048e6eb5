//! Server configuration
//!
//! Loaded from TOML. Every section is optional; an absent file yields a
//! server that exposes `latest_filings` against the public OpenFEC API.
//! Secrets are never stored in the file: the API key is read from the
//! environment at runtime.

use crate::openfec::{OpenFecConfig, DEFAULT_BASE_URL, DEMO_API_KEY};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use url::Url;

/// Environment variable consulted when the configured one is unset
pub const FALLBACK_API_KEY_ENV: &str = "OPENFEC_API_KEY";

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub openfec: OpenFecSection,
    #[serde(default = "default_tools")]
    pub tools: HashMap<String, ToolConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            openfec: OpenFecSection::default(),
            tools: default_tools(),
        }
    }
}

/// Identity advertised in the MCP `initialize` handshake
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Usage hints returned to the client on initialize
    #[serde(default = "default_instructions")]
    pub instructions: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            instructions: default_instructions(),
        }
    }
}

/// Upstream API section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenFecSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for OpenFecSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

/// Tool configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ToolConfig {
    /// Simple form: tool_name = "identifier"
    Simple(String),
    /// Complex form: tool_name = { impl = "identifier", config = { ... } }
    Complex {
        #[serde(rename = "impl")]
        implementation: String,
        #[serde(default)]
        config: HashMap<String, serde_json::Value>,
    },
}

impl ToolConfig {
    pub fn implementation(&self) -> &str {
        match self {
            ToolConfig::Simple(implementation) => implementation,
            ToolConfig::Complex { implementation, .. } => implementation,
        }
    }
}

fn default_server_name() -> String {
    "fec-info".to_string()
}

fn default_instructions() -> Option<String> {
    Some(
        "Use latest_filings to look up recent FEC e-filings. Results are newest first; \
         pass limit=0 to check connectivity without fetching rows."
            .to_string(),
    )
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_key_env() -> String {
    "FEC_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_tools() -> HashMap<String, ToolConfig> {
    HashMap::from([(
        "latest_filings".to_string(),
        ToolConfig::Simple("builtin".to_string()),
    )])
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ServerConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate field values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "server.name must not be empty".to_string(),
            ));
        }

        validate_base_url(&self.openfec.base_url)?;

        if !(1..=300).contains(&self.openfec.timeout_secs) {
            return Err(ConfigError::InvalidConfig(format!(
                "openfec.timeout_secs must be between 1 and 300, got {}",
                self.openfec.timeout_secs
            )));
        }

        if self.openfec.api_key_env.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "openfec.api_key_env must not be empty".to_string(),
            ));
        }

        if self.tools.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "at least one tool must be configured".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the API key from the process environment
    pub fn resolve_api_key(&self) -> String {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Resolve the API key through `lookup`: the configured variable, then
    /// `OPENFEC_API_KEY`, then the public demo key
    pub fn resolve_api_key_with<F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let candidates = [self.openfec.api_key_env.as_str(), FALLBACK_API_KEY_ENV];
        for name in candidates {
            if let Some(key) = lookup(name).filter(|k| !k.trim().is_empty()) {
                return key;
            }
        }

        warn!(
            "No OpenFEC API key in {} or {}, using {} (lower rate limits)",
            self.openfec.api_key_env, FALLBACK_API_KEY_ENV, DEMO_API_KEY
        );
        DEMO_API_KEY.to_string()
    }

    /// Client configuration with the API key resolved from the environment
    pub fn openfec_config(&self) -> OpenFecConfig {
        self.openfec_config_with_key(self.resolve_api_key())
    }

    pub fn openfec_config_with_key(&self, api_key: String) -> OpenFecConfig {
        let defaults = OpenFecConfig::default();
        OpenFecConfig {
            api_key,
            base_url: self.openfec.base_url.clone(),
            timeout: Duration::from_secs(self.openfec.timeout_secs),
            user_agent: self
                .openfec
                .user_agent
                .clone()
                .unwrap_or(defaults.user_agent),
        }
    }

    /// Create a test configuration pointed at `base_url`
    #[cfg(test)]
    pub fn test_config(base_url: &str) -> Self {
        let mut config = Self::default();
        config.openfec.base_url = base_url.to_string();
        config.openfec.timeout_secs = 5;
        config
    }
}

/// Base URL must be absolute http(s)
fn validate_base_url(raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl(format!(
            "{raw}: scheme must be http or https"
        )));
    }
    Ok(())
}
