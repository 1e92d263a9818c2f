//! Main-content backends

use crate::backend::MainContentBackend;
use crate::text::normalize_whitespace;
use once_cell::sync::Lazy;
use pagesift_domain::ReductionMethod;
use scraper::{Html, Selector};

/// Elements that never carry main content
pub(crate) const BOILERPLATE_SELECTOR: &str = "script, style, nav, footer, header, aside, noscript";

/// Containers tried in document order
pub(crate) const CONTAINER_SELECTOR: &str = r#"main, article, [role="main"], .content, #content"#;

static BOILERPLATE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(BOILERPLATE_SELECTOR).expect("boilerplate selector is valid"));
static CONTAINERS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(CONTAINER_SELECTOR).expect("container selector is valid"));
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("body selector is valid"));

/// Detach every element matching `selector` from the document
pub(crate) fn remove_matching(document: &mut Html, selector: &Selector) {
    let ids: Vec<_> = document.select(selector).map(|element| element.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Structural boilerplate removal.
///
/// Deletes script, style, nav, footer, header, aside and noscript elements,
/// then returns the text of the first `main`, `article`, `[role="main"]`,
/// `.content` or `#content` element in document order, falling back to the
/// whole body.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralBackend;

impl MainContentBackend for StructuralBackend {
    fn method(&self) -> ReductionMethod {
        ReductionMethod::Structural
    }

    fn main_content(&self, html: &str, _page_url: Option<&str>) -> Option<String> {
        let mut document = Html::parse_document(html);
        remove_matching(&mut document, &BOILERPLATE);

        let root = document
            .select(&CONTAINERS)
            .next()
            .or_else(|| document.select(&BODY).next())?;

        let text = root.text().collect::<Vec<_>>().join(" ");
        Some(normalize_whitespace(&text))
    }
}

/// Article extraction using Mozilla's readability heuristics
#[cfg(feature = "readability")]
#[derive(Debug, Clone)]
pub struct ReadabilityBackend {
    base_url: url::Url,
}

#[cfg(feature = "readability")]
impl ReadabilityBackend {
    /// Create a backend resolving relative links against `base_url` when
    /// the page address is unknown or unparseable
    pub fn new(base_url: url::Url) -> Self {
        Self { base_url }
    }

    fn resolve_base(&self, page_url: Option<&str>) -> url::Url {
        page_url
            .and_then(|raw| url::Url::parse(raw).ok())
            .unwrap_or_else(|| self.base_url.clone())
    }
}

#[cfg(feature = "readability")]
impl Default for ReadabilityBackend {
    fn default() -> Self {
        static PLACEHOLDER: Lazy<url::Url> = Lazy::new(|| {
            url::Url::parse("http://localhost/").expect("placeholder url is valid")
        });
        Self::new(PLACEHOLDER.clone())
    }
}

#[cfg(feature = "readability")]
impl MainContentBackend for ReadabilityBackend {
    fn method(&self) -> ReductionMethod {
        ReductionMethod::Readability
    }

    fn main_content(&self, html: &str, page_url: Option<&str>) -> Option<String> {
        let base_url = self.resolve_base(page_url);
        let mut cursor = std::io::Cursor::new(html.as_bytes());
        match readability::extractor::extract(&mut cursor, &base_url) {
            Ok(product) => {
                let text = product.text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            Err(e) => {
                tracing::debug!(error = %e, "readability found no article");
                None
            }
        }
    }
}
