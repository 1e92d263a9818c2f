//! Capability provider traits
//!
//! HTML-parsing capabilities are modelled as ranked lists of providers. The
//! reducer asks each provider in order and takes the first answer, so call
//! sites never branch on which backend happens to be compiled in.

use pagesift_domain::ReductionMethod;
use serde::{Deserialize, Serialize};

/// Extracts the primary content region of a page as plain text
pub trait MainContentBackend: Send + Sync {
    /// Method recorded in the reduction provenance
    fn method(&self) -> ReductionMethod;

    /// Main content as text, or `None` if nothing usable was found.
    ///
    /// `page_url` is the address the markup was rendered from, when known.
    fn main_content(&self, html: &str, page_url: Option<&str>) -> Option<String>;
}

/// Elements a cleaner removes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupProfile {
    /// script, style, img, svg and noscript
    #[default]
    Minimal,

    /// Minimal plus nav, footer, header, aside, meta and link
    Boilerplate,
}

impl CleanupProfile {
    /// Tag names removed under this profile
    pub fn tags(&self) -> &'static [&'static str] {
        match self {
            CleanupProfile::Minimal => &["script", "style", "img", "svg", "noscript"],
            CleanupProfile::Boilerplate => &[
                "script", "style", "img", "svg", "noscript", "nav", "footer", "header", "aside",
                "meta", "link",
            ],
        }
    }
}

/// Removes unwanted elements while keeping the rest of the markup
pub trait MarkupCleaner: Send + Sync {
    /// Method recorded in the reduction provenance
    fn method(&self) -> ReductionMethod;

    /// Cleaned markup, or `None` if this cleaner cannot handle the input
    fn clean(&self, html: &str, profile: CleanupProfile) -> Option<String>;
}
