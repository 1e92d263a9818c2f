//! Error types for the render stage

use thiserror::Error;

/// Raw failure reported by a browser backend.
///
/// Backends only distinguish "the thing we waited for never happened" from
/// everything else; [`RenderError::classify`] turns this into the render
/// taxonomy based on the stage that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// A bounded wait expired
    #[error("timed out: {0}")]
    Timeout(String),

    /// Any other failure
    #[error("{0}")]
    Failed(String),
}

/// Stage of a render attempt in which a backend failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Starting the browser process
    Launch,
    /// Opening a page context
    Open,
    /// Installing viewport, stealth script and resource policy
    Prepare,
    /// Navigating and waiting for the network to settle
    Navigate,
    /// Reading HTML or visible text
    Extract,
}

/// Errors that can occur while rendering a page
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The browser process could not be started
    #[error("Browser initialization failed: {0}")]
    Initialization(String),

    /// Navigation did not settle within the configured timeout
    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout {
        /// Target URL
        url: String,
        /// Timeout that expired
        timeout_ms: u64,
    },

    /// Navigation failed (DNS, refused connection, invalid URL, ...)
    #[error("Navigation to {url} failed: {reason}")]
    Navigation {
        /// Target URL
        url: String,
        /// Reason reported by the browser
        reason: String,
    },

    /// The page loaded but its HTML is implausibly small
    #[error("Page at {url} is empty: {html_len} chars of HTML")]
    EmptyPage {
        /// Target URL
        url: String,
        /// Length of the HTML that was read
        html_len: usize,
    },

    /// Reading the DOM failed
    #[error("Content extraction failed: {0}")]
    ContentExtraction(String),

    /// Unrecognized failure
    #[error("Render failed: {0}")]
    Runtime(String),
}

impl RenderError {
    /// Map a backend failure to the render taxonomy.
    ///
    /// This is the only place that decides which variant a failure becomes.
    pub fn classify(stage: Stage, failure: BackendError, url: &str, timeout_ms: u64) -> Self {
        match (stage, failure) {
            (Stage::Launch, failure) => RenderError::Initialization(failure.to_string()),
            (Stage::Navigate, BackendError::Timeout(_)) => RenderError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms,
            },
            (Stage::Navigate, BackendError::Failed(reason)) => RenderError::Navigation {
                url: url.to_string(),
                reason,
            },
            (Stage::Extract, failure) => RenderError::ContentExtraction(failure.to_string()),
            (Stage::Open | Stage::Prepare, failure) => RenderError::Runtime(failure.to_string()),
        }
    }

    /// Whether another attempt may be made after this error
    pub fn is_retryable(&self) -> bool {
        !matches!(self, RenderError::Initialization(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_timeout_classification() {
        let error = RenderError::classify(
            Stage::Navigate,
            BackendError::Timeout("network idle".to_string()),
            "https://example.com",
            6000,
        );
        assert_eq!(
            error,
            RenderError::NavigationTimeout {
                url: "https://example.com".to_string(),
                timeout_ms: 6000,
            }
        );
        assert!(error.is_retryable());
    }

    #[test]
    fn test_navigate_failure_classification() {
        let error = RenderError::classify(
            Stage::Navigate,
            BackendError::Failed("net::ERR_NAME_NOT_RESOLVED".to_string()),
            "https://nope.invalid",
            6000,
        );
        assert!(matches!(error, RenderError::Navigation { ref reason, .. } if reason.contains("ERR_NAME")));
    }

    #[test]
    fn test_launch_is_initialization_and_fatal() {
        let error = RenderError::classify(
            Stage::Launch,
            BackendError::Failed("no chrome".to_string()),
            "",
            0,
        );
        assert!(matches!(error, RenderError::Initialization(_)));
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_extract_and_runtime_are_retryable() {
        let extract = RenderError::classify(
            Stage::Extract,
            BackendError::Failed("detached".to_string()),
            "u",
            0,
        );
        let open = RenderError::classify(
            Stage::Open,
            BackendError::Timeout("target".to_string()),
            "u",
            0,
        );
        assert!(matches!(extract, RenderError::ContentExtraction(_)));
        assert!(matches!(open, RenderError::Runtime(_)));
        assert!(extract.is_retryable());
        assert!(open.is_retryable());
    }

    #[test]
    fn test_empty_page_message() {
        let error = RenderError::EmptyPage {
            url: "https://example.com".to_string(),
            html_len: 12,
        };
        assert!(error.to_string().contains("12 chars"));
        assert!(error.is_retryable());
    }
}
