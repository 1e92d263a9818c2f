//! Strategy selection over the ranked capability providers

use crate::backend::{CleanupProfile, MainContentBackend, MarkupCleaner};
use crate::cleanup::{DomCleaner, PatternCleaner};
use crate::main_content::StructuralBackend;
use crate::targeted::{TargetedConfig, TargetedExtractor};
use pagesift_domain::{ReductionMethod, ReductionResult, RenderResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a rendered page is reduced before it is sent to the LLM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionStrategy {
    /// Targeted windows, falling back to main content when they come out
    /// nearly empty
    #[default]
    TargetedWithFallback,

    /// Targeted windows only; may be empty
    Targeted,

    /// Main-content text (strategy A)
    MainContent,

    /// Markup with script/style/media removed (strategy B)
    LightCleanup,
}

/// Reducer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReducerConfig {
    /// Targeted extraction settings
    pub targeted: TargetedConfig,

    /// Targeted output shorter than this (characters) falls back to main content
    pub min_targeted_chars: usize,

    /// Elements removed by light cleanup
    pub cleanup_profile: CleanupProfile,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            targeted: TargetedConfig::default(),
            min_targeted_chars: 100,
            cleanup_profile: CleanupProfile::default(),
        }
    }
}

/// Content reducer
///
/// Every operation is pure: no network, no mutation of the input, and the
/// same input with the same backends always yields the same output.
///
/// # Examples
///
/// ```
/// use pagesift_reducer::{ContentReducer, ReducerConfig};
/// use pagesift_domain::ReductionMethod;
///
/// let reducer = ContentReducer::new(ReducerConfig::default());
/// let result = reducer.targeted("Flight UA123 departs JFK at 14:30");
/// assert_eq!(result.method, ReductionMethod::Targeted);
/// assert!(result.content.contains("AIRPORT:JFK"));
/// ```
pub struct ContentReducer {
    main_content: Vec<Box<dyn MainContentBackend>>,
    cleaners: Vec<Box<dyn MarkupCleaner>>,
    targeted: TargetedExtractor,
    min_targeted_chars: usize,
    cleanup_profile: CleanupProfile,
}

impl std::fmt::Debug for ContentReducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backends: Vec<_> = self.main_content.iter().map(|b| b.method()).collect();
        let cleaners: Vec<_> = self.cleaners.iter().map(|c| c.method()).collect();
        f.debug_struct("ContentReducer")
            .field("main_content", &backends)
            .field("cleaners", &cleaners)
            .field("min_targeted_chars", &self.min_targeted_chars)
            .finish()
    }
}

/// Main-content backends compiled into this build, best first
pub fn default_main_content_backends() -> Vec<Box<dyn MainContentBackend>> {
    let mut backends: Vec<Box<dyn MainContentBackend>> = Vec::new();
    #[cfg(feature = "readability")]
    backends.push(Box::new(crate::main_content::ReadabilityBackend::default()));
    backends.push(Box::new(StructuralBackend));
    backends
}

/// Markup cleaners compiled into this build, best first
pub fn default_cleaners() -> Vec<Box<dyn MarkupCleaner>> {
    vec![Box::new(DomCleaner), Box::new(PatternCleaner)]
}

impl ContentReducer {
    /// Reducer with every backend available in this build
    pub fn new(config: ReducerConfig) -> Self {
        Self::with_backends(config, default_main_content_backends(), default_cleaners())
    }

    /// Reducer with an explicit, ranked set of backends
    pub fn with_backends(
        config: ReducerConfig,
        main_content: Vec<Box<dyn MainContentBackend>>,
        cleaners: Vec<Box<dyn MarkupCleaner>>,
    ) -> Self {
        Self {
            main_content,
            cleaners,
            targeted: TargetedExtractor::new(&config.targeted),
            min_targeted_chars: config.min_targeted_chars,
            cleanup_profile: config.cleanup_profile,
        }
    }

    /// Reducer without any HTML-parsing capability
    pub fn text_only(config: ReducerConfig) -> Self {
        Self::with_backends(config, Vec::new(), Vec::new())
    }

    /// Strategy A: main-content text.
    ///
    /// Asks each main-content backend in rank order. With no backend, or
    /// when none finds anything, the visible text is returned unchanged.
    pub fn main_content(&self, html: &str, text: &str) -> ReductionResult {
        self.main_content_from(html, text, None)
    }

    fn main_content_from(&self, html: &str, text: &str, page_url: Option<&str>) -> ReductionResult {
        let original_len = html.chars().count();
        for backend in &self.main_content {
            match backend.main_content(html, page_url) {
                Some(content) if !content.trim().is_empty() => {
                    return ReductionResult::new(content, backend.method(), original_len);
                }
                _ => debug!(method = %backend.method(), "backend found no main content"),
            }
        }
        ReductionResult::new(text.to_string(), ReductionMethod::RawText, text.chars().count())
    }

    /// Strategy B: markup with script, style, image, svg and noscript
    /// elements removed and everything else intact
    pub fn light_cleanup(&self, html: &str) -> ReductionResult {
        let original_len = html.chars().count();
        for cleaner in &self.cleaners {
            if let Some(content) = cleaner.clean(html, self.cleanup_profile) {
                return ReductionResult::new(content, cleaner.method(), original_len);
            }
        }
        ReductionResult::new(html.to_string(), ReductionMethod::RawText, original_len)
    }

    /// Strategy C: labelled keyword windows over visible text.
    ///
    /// An empty result means nothing of interest was found.
    pub fn targeted(&self, text: &str) -> ReductionResult {
        ReductionResult::new(
            self.targeted.extract(text),
            ReductionMethod::Targeted,
            text.chars().count(),
        )
    }

    /// Reduce a rendered page with the given strategy
    pub fn reduce(&self, page: &RenderResult, strategy: ReductionStrategy) -> ReductionResult {
        self.reduce_page(page, strategy, None)
    }

    /// Reduce a page rendered from `page_url`; backends that resolve links
    /// resolve them against that address
    pub fn reduce_for(
        &self,
        page: &RenderResult,
        strategy: ReductionStrategy,
        page_url: &str,
    ) -> ReductionResult {
        self.reduce_page(page, strategy, Some(page_url))
    }

    fn reduce_page(
        &self,
        page: &RenderResult,
        strategy: ReductionStrategy,
        page_url: Option<&str>,
    ) -> ReductionResult {
        match strategy {
            ReductionStrategy::Targeted => self.targeted(page.text()),
            ReductionStrategy::MainContent => self.main_content_from(page.html(), page.text(), page_url),
            ReductionStrategy::LightCleanup => self.light_cleanup(page.html()),
            ReductionStrategy::TargetedWithFallback => {
                let targeted = self.targeted(page.text());
                if targeted.final_len >= self.min_targeted_chars {
                    return targeted;
                }
                debug!(
                    targeted_len = targeted.final_len,
                    threshold = self.min_targeted_chars,
                    "targeted extraction too short, using main content"
                );
                self.main_content_from(page.html(), page.text(), page_url)
            }
        }
    }
}
