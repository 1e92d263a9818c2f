//! Error types for extraction

use thiserror::Error;

/// Errors that can occur while turning a rendered page into JSON
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// The LLM call failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// The LLM did not reply within the configured timeout
    #[error("LLM request timed out after {timeout_ms}ms")]
    LlmTimeout {
        /// Timeout that expired
        timeout_ms: u64,
    },

    /// The LLM replied with nothing
    #[error("LLM returned an empty response")]
    EmptyResponse,

    /// The reply was not JSON, even after looking for a fenced block
    #[error("Failed to parse JSON from LLM response: {0}")]
    InvalidJson(String),

    /// Invalid configuration or unreadable prompt file
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(err: serde_json::Error) -> Self {
        ExtractorError::InvalidJson(err.to_string())
    }
}
