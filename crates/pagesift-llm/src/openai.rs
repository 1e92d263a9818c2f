//! OpenAI Provider Implementation
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint and asks for
//! a JSON object reply.
//!
//! Some models reject the `temperature` parameter. Known families are
//! detected up front; for anything else a rejection is answered by one
//! retry without the parameter.
//!
//! # Examples
//!
//! ```no_run
//! use pagesift_llm::OpenAiProvider;
//! use std::time::Duration;
//!
//! let provider = OpenAiProvider::new("sk-...", "gpt-4-turbo-preview")
//!     .unwrap()
//!     .with_timeout(Duration::from_secs(30));
//! ```

use crate::LlmError;
use pagesift_domain::{CompletionRequest, LlmProvider, ResponseFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default timeout for LLM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Model name prefixes that reject a sampling temperature
pub const MODELS_WITHOUT_TEMPERATURE: &[&str] = &["o1", "gpt-5-nano"];

/// OpenAI-compatible chat completions provider
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormatBody {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Whether a model family is known to reject `temperature`
pub fn supports_temperature(model: &str) -> bool {
    !MODELS_WITHOUT_TEMPERATURE
        .iter()
        .any(|prefix| model.starts_with(prefix))
}

fn mentions_unsupported_temperature(body: &str) -> bool {
    let body = body.to_lowercase();
    body.contains("temperature")
        && (body.contains("unsupported")
            || body.contains("not supported")
            || body.contains("does not support"))
}

impl OpenAiProvider {
    /// Create a provider for `model` authenticated with `api_key`
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be constructed
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Use a different API base URL (without the `/chat/completions` suffix)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request HTTP timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// API base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(
        &self,
        request: &CompletionRequest,
        temperature: Option<f32>,
    ) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            response_format: match request.response_format {
                ResponseFormat::JsonObject => Some(ResponseFormatBody {
                    kind: "json_object",
                }),
                ResponseFormat::Text => None,
            },
            temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Communication(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(match status {
                reqwest::StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(self.model.clone()),
                reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
                reqwest::StatusCode::BAD_REQUEST
                    if temperature.is_some() && mentions_unsupported_temperature(&error_text) =>
                {
                    LlmError::UnsupportedParameter("temperature".to_string())
                }
                _ => LlmError::Communication(format!("HTTP {}: {}", status, error_text)),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
            }
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("Response has no choices".to_string()))?;
        Ok(choice.message.content.unwrap_or_default())
    }
}

impl LlmProvider for OpenAiProvider {
    type Error = LlmError;

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        let temperature = request
            .temperature
            .filter(|_| supports_temperature(&self.model));
        if request.temperature.is_some() && temperature.is_none() {
            debug!(model = %self.model, "model does not accept temperature, omitting it");
        }

        match self.send(request, temperature).await {
            Err(LlmError::UnsupportedParameter(parameter)) => {
                warn!(model = %self.model, %parameter, "provider rejected parameter, retrying without it");
                self.send(request, None).await
            }
            other => other,
        }
    }
}
