//! Markup cleaners for light cleanup
//!
//! [`DomCleaner`] parses the document and detaches elements. [`PatternCleaner`]
//! is the degraded fallback that strips tags with regular expressions and
//! works on markup a parser would reject.

use crate::backend::{CleanupProfile, MarkupCleaner};
use crate::main_content::remove_matching;
use once_cell::sync::Lazy;
use pagesift_domain::ReductionMethod;
use regex::Regex;
use scraper::{Html, Selector};

/// Element removal on a parsed DOM
#[derive(Debug, Clone, Copy, Default)]
pub struct DomCleaner;

impl MarkupCleaner for DomCleaner {
    fn method(&self) -> ReductionMethod {
        ReductionMethod::LightCleanup
    }

    fn clean(&self, html: &str, profile: CleanupProfile) -> Option<String> {
        let selector = Selector::parse(&profile.tags().join(", ")).ok()?;
        let mut document = Html::parse_document(html);
        remove_matching(&mut document, &selector);
        Some(document.html())
    }
}

fn paired(tag: &str) -> Regex {
    Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).expect("paired tag pattern is valid")
}

fn void(tag: &str) -> Regex {
    Regex::new(&format!(r"(?i)<{tag}\b[^>]*/?>")).expect("void tag pattern is valid")
}

static MINIMAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        paired("script"),
        paired("style"),
        paired("svg"),
        paired("noscript"),
        void("img"),
    ]
});

static BOILERPLATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        paired("nav"),
        paired("footer"),
        paired("header"),
        paired("aside"),
        void("meta"),
        void("link"),
    ]
});

/// Literal tag stripping with regular expressions
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternCleaner;

impl PatternCleaner {
    fn patterns(profile: CleanupProfile) -> impl Iterator<Item = &'static Regex> {
        let extra: &'static [Regex] = match profile {
            CleanupProfile::Minimal => &[],
            CleanupProfile::Boilerplate => BOILERPLATE_PATTERNS.as_slice(),
        };
        MINIMAL_PATTERNS.iter().chain(extra.iter())
    }
}

impl MarkupCleaner for PatternCleaner {
    fn method(&self) -> ReductionMethod {
        ReductionMethod::PatternCleanup
    }

    fn clean(&self, html: &str, profile: CleanupProfile) -> Option<String> {
        let cleaned = Self::patterns(profile).fold(html.to_string(), |acc, pattern| {
            pattern.replace_all(&acc, "").into_owned()
        });
        Some(cleaned)
    }
}
