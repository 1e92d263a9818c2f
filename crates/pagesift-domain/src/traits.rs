//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and the remote
//! services it calls. Implementations live in other crates.

use std::future::Future;

/// Output format the LLM is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Free-form text
    Text,

    /// A single JSON object
    #[default]
    JsonObject,
}

/// A single chat completion request sent to an LLM provider
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instructions (the prompt template)
    pub system: String,

    /// User content (reduced page text plus source URL)
    pub user: String,

    /// Required output format
    pub response_format: ResponseFormat,

    /// Sampling temperature, if the caller wants one sent
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Create a JSON-object request with no explicit temperature
    pub fn json(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            response_format: ResponseFormat::JsonObject,
            temperature: None,
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (pagesift-llm). The model
/// identifier is a property of the provider instance.
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Identifier of the model requests are sent to
    fn model(&self) -> &str;

    /// Run one completion and return the raw reply content.
    ///
    /// An empty string means the provider replied without content.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_request_defaults() {
        let request = CompletionRequest::json("system", "user");
        assert_eq!(request.response_format, ResponseFormat::JsonObject);
        assert_eq!(request.temperature, None);
    }

    #[test]
    fn test_with_temperature() {
        let request = CompletionRequest::json("s", "u").with_temperature(0.1);
        assert_eq!(request.temperature, Some(0.1));
    }
}
