//! Pagesift LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `pagesift-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//!
//! # Examples
//!
//! ```
//! use pagesift_llm::MockProvider;
//! use pagesift_domain::{CompletionRequest, LlmProvider};
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let provider = MockProvider::new(r#"{"title": "Example"}"#);
//! let reply = rt.block_on(provider.complete(&CompletionRequest::json("system", "user"))).unwrap();
//! assert_eq!(reply, r#"{"title": "Example"}"#);
//! ```

#![warn(missing_docs)]

pub mod openai;

use pagesift_domain::{CompletionRequest, LlmProvider};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// The model rejected a request parameter
    #[error("Unsupported parameter: {0}")]
    UnsupportedParameter(String),

    /// The HTTP request timed out
    #[error("Request timed out")]
    Timeout,

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether this error is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, LlmError::Timeout)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Error,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured replies without making any network calls.
/// Replies can be keyed on a fragment of the user message.
///
/// # Examples
///
/// ```
/// use pagesift_llm::MockProvider;
///
/// let mut provider = MockProvider::default();
/// provider.add_response("example.com", r#"{"site": "example"}"#);
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
    default_response: String,
    responses: Arc<Mutex<HashMap<String, Scripted>>>,
    call_count: Arc<Mutex<usize>>,
    last_request: Arc<Mutex<Option<CompletionRequest>>>,
    delay: Duration,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed reply for all requests
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            model: "mock-model".to_string(),
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_request: Arc::new(Mutex::new(None)),
            delay: Duration::ZERO,
        }
    }

    /// Report a different model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Wait this long before replying
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Reply with `response` when the user message contains `fragment`
    pub fn add_response(&mut self, fragment: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(fragment.into(), Scripted::Reply(response.into()));
    }

    /// Fail when the user message contains `fragment`
    pub fn add_error(&mut self, fragment: impl Into<String>) {
        lock(&self.responses).insert(fragment.into(), Scripted::Error);
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<CompletionRequest> {
        lock(&self.last_request).clone()
    }

    fn scripted_reply(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        *lock(&self.call_count) += 1;
        *lock(&self.last_request) = Some(request.clone());

        let responses = lock(&self.responses);
        let scripted = responses
            .iter()
            .filter(|(fragment, _)| request.user.contains(fragment.as_str()))
            .max_by_key(|(fragment, _)| fragment.len())
            .map(|(_, scripted)| scripted.clone());

        match scripted {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Error) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        let reply = self.scripted_reply(request);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user: &str) -> CompletionRequest {
        CompletionRequest::json("Extract the title.", user)
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.complete(&request("any prompt")).await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.complete(&request("say hello")).await.unwrap(), "world");
        assert_eq!(provider.complete(&request("foo")).await.unwrap(), "bar");
        assert_eq!(provider.complete(&request("unknown")).await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_longest_fragment_wins() {
        let mut provider = MockProvider::default();
        provider.add_response("example.com", "short");
        provider.add_response("example.com/deals", "long");
        assert_eq!(
            provider.complete(&request("URL: https://example.com/deals")).await.unwrap(),
            "long"
        );
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);

        provider.complete(&request("prompt1")).await.unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.complete(&request("prompt2")).await.unwrap();
        assert_eq!(provider.call_count(), 2);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.complete(&request("a bad prompt")).await;
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
    }

    #[tokio::test]
    async fn test_mock_provider_records_last_request() {
        let provider = MockProvider::default().with_model("gpt-4o");
        assert_eq!(provider.model(), "gpt-4o");
        assert!(provider.last_request().is_none());

        provider.complete(&request("page text")).await.unwrap();
        let last = provider.last_request().unwrap();
        assert_eq!(last.system, "Extract the title.");
        assert_eq!(last.user, "page text");
    }

    #[tokio::test]
    async fn test_mock_provider_clone() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete(&request("test")).await.unwrap();

        // Both share the same call count through the Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_delay() {
        let provider = MockProvider::new("late").with_delay(Duration::from_millis(30));
        let started = std::time::Instant::now();
        provider.complete(&request("x")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
