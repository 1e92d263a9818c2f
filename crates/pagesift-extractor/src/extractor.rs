//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_json_reply;
use crate::prompt::{PromptBuilder, PromptTemplate};
use pagesift_domain::{CompletionRequest, LlmProvider, ReductionResult, RenderResult};
use pagesift_llm::LlmError;
use pagesift_reducer::ContentReducer;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Reduces a rendered page and asks the LLM to extract JSON from it
pub struct Extractor<L>
where
    L: LlmProvider<Error = LlmError>,
{
    llm_provider: Arc<L>,
    reducer: ContentReducer,
    template: PromptTemplate,
    config: ExtractorConfig,
}

impl<L> Extractor<L>
where
    L: LlmProvider<Error = LlmError> + Send + Sync + 'static,
{
    /// Create a new Extractor with the default reducer backends
    pub fn new(llm_provider: L, template: PromptTemplate, config: ExtractorConfig) -> Self {
        let reducer = ContentReducer::new(config.reducer.clone());
        Self::with_reducer(llm_provider, template, config, reducer)
    }

    /// Create an Extractor with a preconfigured reducer
    pub fn with_reducer(
        llm_provider: L,
        template: PromptTemplate,
        config: ExtractorConfig,
        reducer: ContentReducer,
    ) -> Self {
        Self {
            llm_provider: Arc::new(llm_provider),
            reducer,
            template,
            config,
        }
    }

    /// Extractor configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Model requests are sent to
    pub fn model(&self) -> &str {
        self.llm_provider.model()
    }

    /// Reduce a page rendered from `url` with the configured strategy
    pub fn reduce(&self, page: &RenderResult, url: &str) -> ReductionResult {
        let reduced = self.reducer.reduce_for(page, self.config.strategy, url);
        info!(
            method = %reduced.method,
            original_len = reduced.original_len,
            final_len = reduced.final_len,
            ratio = reduced.ratio(),
            "reduced page content"
        );
        if reduced.is_empty() {
            warn!(method = %reduced.method, "reduction produced no content");
        }
        reduced
    }

    /// Extract JSON from a rendered page
    ///
    /// The LLM call is bounded by `llm_timeout_ms`. LLM and parsing
    /// failures are returned to the caller without retrying.
    pub async fn extract(&self, page: &RenderResult, url: &str) -> Result<Value, ExtractorError> {
        let reduced = self.reduce(page, url);
        let user = PromptBuilder::new(url, &reduced.content).build();
        debug!("Prompt length: {} chars", user.len());

        let request = CompletionRequest::json(self.template.as_str(), user)
            .with_temperature(self.config.temperature);

        let start_time = Instant::now();
        let reply = timeout(self.config.llm_timeout(), self.llm_provider.complete(&request))
            .await
            .map_err(|_| ExtractorError::LlmTimeout {
                timeout_ms: self.config.llm_timeout_ms,
            })?
            .map_err(|e| self.map_llm_error(e))?;

        info!(
            model = self.model(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            reply_len = reply.len(),
            "LLM replied"
        );

        parse_json_reply(&reply)
    }

    fn map_llm_error(&self, error: LlmError) -> ExtractorError {
        if error.is_timeout() {
            ExtractorError::LlmTimeout {
                timeout_ms: self.config.llm_timeout_ms,
            }
        } else {
            ExtractorError::Llm(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesift_domain::ReductionMethod;
    use pagesift_llm::MockProvider;
    use pagesift_reducer::{MainContentBackend, ReductionStrategy};
    use std::time::Duration;

    fn page() -> RenderResult {
        RenderResult::new(
            "<html><body><main>Flight UA123 from JFK to LAX departs 14:30 for $245.00</main></body></html>"
                .to_string(),
            "Flight UA123 from JFK to LAX departs 14:30 for $245.00".to_string(),
        )
    }

    fn extractor(provider: MockProvider, config: ExtractorConfig) -> Extractor<MockProvider> {
        Extractor::new(provider, PromptTemplate::new("Return {\"price\": string}."), config)
    }

    #[tokio::test]
    async fn test_extract_returns_parsed_reply() {
        let provider = MockProvider::new(r#"{"price": "$245.00"}"#);
        let extractor = extractor(provider.clone(), ExtractorConfig::default());

        let value = extractor.extract(&page(), "https://example.com").await.unwrap();

        assert_eq!(value["price"], "$245.00");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_request_carries_template_url_and_temperature() {
        let provider = MockProvider::default();
        let extractor = extractor(provider.clone(), ExtractorConfig::default());

        extractor.extract(&page(), "https://example.com/fares").await.unwrap();

        let request = provider.last_request().unwrap();
        assert_eq!(request.system, "Return {\"price\": string}.");
        assert!(request.user.contains("URL: https://example.com/fares"));
        assert!(request.user.contains("$245.00"));
        assert_eq!(request.temperature, Some(0.1));
    }

    #[tokio::test]
    async fn test_provider_error_is_llm_error() {
        let mut provider = MockProvider::default();
        provider.add_error("example.com");
        let extractor = extractor(provider, ExtractorConfig::default());

        let result = extractor.extract(&page(), "https://example.com").await;
        assert!(matches!(result, Err(ExtractorError::Llm(_))));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let provider = MockProvider::new("{}").with_delay(Duration::from_millis(500));
        let config = ExtractorConfig::default().with_llm_timeout_ms(20);
        let extractor = extractor(provider, config);

        let result = extractor.extract(&page(), "https://example.com").await;
        assert_eq!(result, Err(ExtractorError::LlmTimeout { timeout_ms: 20 }));
    }

    #[test]
    fn test_provider_timeout_maps_to_llm_timeout() {
        let extractor = extractor(MockProvider::default(), ExtractorConfig::default());
        assert_eq!(
            extractor.map_llm_error(LlmError::Timeout),
            ExtractorError::LlmTimeout { timeout_ms: 30_000 }
        );
        assert!(matches!(
            extractor.map_llm_error(LlmError::RateLimitExceeded),
            ExtractorError::Llm(_)
        ));
    }

    #[test]
    fn test_reduce_uses_configured_strategy() {
        let config = ExtractorConfig::default().with_strategy(ReductionStrategy::Targeted);
        let extractor = extractor(MockProvider::default(), config);

        let reduced = extractor.reduce(&page(), "https://fares.example");
        assert_eq!(reduced.method, ReductionMethod::Targeted);
        assert!(reduced.content.contains("FLIGHT:UA123"));
    }

    struct UrlEchoBackend;

    impl MainContentBackend for UrlEchoBackend {
        fn method(&self) -> ReductionMethod {
            ReductionMethod::Readability
        }

        fn main_content(&self, _html: &str, page_url: Option<&str>) -> Option<String> {
            page_url.map(|url| format!("rendered from {}", url))
        }
    }

    #[tokio::test]
    async fn test_extract_passes_request_url_to_reducer() {
        let config = ExtractorConfig::default().with_strategy(ReductionStrategy::MainContent);
        let reducer = ContentReducer::with_backends(
            config.reducer.clone(),
            vec![Box::new(UrlEchoBackend)],
            Vec::new(),
        );
        let provider = MockProvider::new(r#"{"ok": true}"#);
        let extractor = Extractor::with_reducer(
            provider.clone(),
            PromptTemplate::new("Return {\"ok\": bool}."),
            config,
            reducer,
        );

        extractor.extract(&page(), "https://fares.example/deals").await.unwrap();

        let request = provider.last_request().unwrap();
        assert!(request.user.contains("rendered from https://fares.example/deals"));
    }
}
