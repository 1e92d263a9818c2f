//! Command-line and environment configuration.

use crate::config::{ConfigError, ServerConfig, DEFAULT_MODEL};
use clap::Parser;
use std::path::PathBuf;

/// Pagesift - extract structured JSON from web pages
#[derive(Debug, Parser)]
#[command(name = "pagesift-server")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file; replaces every flag below except the API key
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// API key for the LLM provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Model identifier
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub base_url: Option<String>,

    /// Navigation timeout in milliseconds
    #[arg(long, env = "BROWSER_TIMEOUT", default_value_t = 6000)]
    pub browser_timeout: u64,

    /// LLM timeout in milliseconds
    #[arg(long, env = "LLM_TIMEOUT", default_value_t = 30_000)]
    pub llm_timeout: u64,

    /// File holding the system prompt
    #[arg(long, env = "PROMPT_FILE", default_value = "prompts/prompt.txt")]
    pub prompt_file: PathBuf,

    /// Address to bind
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Port to bind
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,
}

impl Cli {
    /// Resolve the final, validated configuration
    pub fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let config = match self.config {
            Some(path) => {
                let mut config = ServerConfig::from_file(path)?;
                if config.openai_api_key.is_empty() {
                    config.openai_api_key = self.openai_api_key.unwrap_or_default();
                }
                config
            }
            None => {
                let defaults = ServerConfig::default();
                ServerConfig {
                    bind_address: self.bind_address,
                    bind_port: self.port,
                    openai_api_key: self.openai_api_key.unwrap_or_default(),
                    model: self.model,
                    api_base_url: self.base_url,
                    prompt_file: self.prompt_file,
                    render: defaults.render.with_navigation_timeout_ms(self.browser_timeout),
                    extractor: defaults.extractor.with_llm_timeout_ms(self.llm_timeout),
                    ..defaults
                }
            }
        };

        config.validate()?;
        Ok(config)
    }
}
