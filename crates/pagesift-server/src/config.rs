//! Configuration for the HTTP service.
//!
//! Settings come from a TOML file or from command-line flags and
//! environment variables (see [`crate::cli::Cli`]). They are read once at
//! startup and never change afterwards.

use pagesift_extractor::ExtractorConfig;
use pagesift_render::{LaunchConfig, RenderConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub bind_address: String,

    /// Bind port
    pub bind_port: u16,

    /// API key for the LLM provider
    pub openai_api_key: String,

    /// Model identifier
    pub model: String,

    /// Alternative OpenAI-compatible API base URL
    pub api_base_url: Option<String>,

    /// File holding the system prompt
    pub prompt_file: PathBuf,

    /// Browser process settings
    pub launch: LaunchConfig,

    /// Per-request render settings
    pub render: RenderConfig,

    /// Reduction and LLM settings
    pub extractor: ExtractorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            bind_port: 8000,
            openai_api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            api_base_url: None,
            prompt_file: PathBuf::from("prompts/prompt.txt"),
            launch: LaunchConfig::default(),
            render: RenderConfig::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from a TOML file.
    ///
    /// The result is not validated, so callers can fill in values that come
    /// from elsewhere (the API key from the environment) before calling
    /// [`ServerConfig::validate`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openai_api_key.trim().is_empty() {
            return Err(ConfigError::MissingField("openai_api_key".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingField("model".to_string()));
        }
        self.render.validate().map_err(ConfigError::Invalid)?;
        self.extractor.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
