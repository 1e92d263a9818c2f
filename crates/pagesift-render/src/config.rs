//! Configuration for the render session and the browser process

use crate::policy::ResourcePolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Flag that hides the `navigator.webdriver` automation signal
pub const AUTOMATION_CONTROLLED_FLAG: &str = "--disable-blink-features=AutomationControlled";

/// Page viewport in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for Viewport {
    /// Fixed desktop viewport, 1920x1080
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Per-request render settings
///
/// # Examples
///
/// ```
/// use pagesift_render::RenderConfig;
///
/// let config = RenderConfig::default();
/// assert_eq!(config.navigation_timeout_ms, 6000);
/// assert_eq!(config.max_attempts, 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Bound on navigation plus network-idle wait (milliseconds)
    pub navigation_timeout_ms: u64,

    /// Bound on waiting for `ready_selector` to be attached (milliseconds).
    /// Expiry is not an error.
    pub settle_timeout_ms: u64,

    /// Fixed delay after the ready element appears, for client-side hydration (milliseconds)
    pub settle_delay_ms: u64,

    /// Total number of attempts per `load` call
    pub max_attempts: u32,

    /// Delay between attempts (milliseconds)
    pub retry_delay_ms: u64,

    /// HTML shorter than this is treated as an empty page
    pub min_html_chars: usize,

    /// Visible text shorter than this is logged as a warning
    pub min_text_chars: usize,

    /// Baseline element that signals the DOM is usable
    pub ready_selector: String,

    /// Page viewport
    pub viewport: Viewport,

    /// Resource kinds aborted before they reach the network
    pub resource_policy: ResourcePolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 6000,
            settle_timeout_ms: 2000,
            settle_delay_ms: 500,
            max_attempts: 2,
            retry_delay_ms: 1000,
            min_html_chars: 100,
            min_text_chars: 50,
            ready_selector: "body".to_string(),
            viewport: Viewport::default(),
            resource_policy: ResourcePolicy::default(),
        }
    }
}

impl RenderConfig {
    /// Set the navigation timeout
    pub fn with_navigation_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.navigation_timeout_ms = timeout_ms;
        self
    }

    /// Navigation timeout as a Duration
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// Ready-element wait as a Duration
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    /// Hydration delay as a Duration
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Inter-attempt delay as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.navigation_timeout_ms == 0 {
            return Err("navigation_timeout_ms must be greater than 0".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.ready_selector.trim().is_empty() {
            return Err("ready_selector cannot be empty".to_string());
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err("viewport dimensions must be non-zero".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

/// How the browser process is launched
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Run without a visible window
    pub headless: bool,

    /// Keep the Chromium sandbox enabled (often unavailable in containers)
    pub sandbox: bool,

    /// Extra command-line arguments
    pub args: Vec<String>,

    /// Initial window size
    pub window: Viewport,

    /// Seconds without DevTools traffic before the connection is considered dead
    pub idle_browser_timeout_secs: u64,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: false,
            args: vec![AUTOMATION_CONTROLLED_FLAG.to_string()],
            window: Viewport::default(),
            idle_browser_timeout_secs: 24 * 60 * 60,
        }
    }
}

impl LaunchConfig {
    /// Idle timeout as a Duration
    pub fn idle_browser_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_browser_timeout_secs)
    }

    /// Arguments passed to Chromium, always including the automation countermeasure
    pub fn effective_args(&self) -> Vec<String> {
        let mut args = self.args.clone();
        if !args.iter().any(|arg| arg == AUTOMATION_CONTROLLED_FLAG) {
            args.push(AUTOMATION_CONTROLLED_FLAG.to_string());
        }
        args
    }
}
