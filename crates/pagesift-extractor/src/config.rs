//! Configuration for the Extractor

use pagesift_reducer::{ReducerConfig, ReductionStrategy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Timeout for a single LLM call in milliseconds
    pub llm_timeout_ms: u64,

    /// Which reduction strategy feeds the LLM
    pub strategy: ReductionStrategy,

    /// Sampling temperature requested from the LLM
    pub temperature: f32,

    /// Content reducer settings
    pub reducer: ReducerConfig,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            llm_timeout_ms: 30_000,
            strategy: ReductionStrategy::default(),
            temperature: 0.1,
            reducer: ReducerConfig::default(),
        }
    }
}

impl ExtractorConfig {
    /// Replace the LLM timeout
    pub fn with_llm_timeout_ms(mut self, llm_timeout_ms: u64) -> Self {
        self.llm_timeout_ms = llm_timeout_ms;
        self
    }

    /// Replace the reduction strategy
    pub fn with_strategy(mut self, strategy: ReductionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// LLM timeout as a Duration
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_millis(self.llm_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.llm_timeout_ms == 0 {
            return Err("llm_timeout_ms must be greater than 0".to_string());
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }

        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string(self).map_err(|e| format!("Failed to serialize TOML: {}", e))
    }
}
