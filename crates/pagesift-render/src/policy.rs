//! Resource-blocking policy applied to every page context

use serde::{Deserialize, Serialize};

/// Kind of network resource a page requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Top-level or frame document
    Document,
    /// CSS
    Stylesheet,
    /// Images, including favicons
    Image,
    /// Audio and video
    Media,
    /// Web fonts
    Font,
    /// JavaScript
    Script,
    /// Anything else
    Other,
}

/// Declarative allow/block predicate over resource kinds.
///
/// Installed once per page context. Requests whose kind is blocked are
/// aborted before they reach the network; everything else proceeds
/// unmodified.
///
/// # Examples
///
/// ```
/// use pagesift_render::{ResourceKind, ResourcePolicy};
///
/// let policy = ResourcePolicy::default();
/// assert!(!policy.allows(ResourceKind::Image));
/// assert!(policy.allows(ResourceKind::Script));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePolicy {
    /// Resource kinds that are aborted
    pub blocked: Vec<ResourceKind>,
}

impl ResourcePolicy {
    /// Policy that blocks the given kinds
    pub fn blocking(kinds: impl IntoIterator<Item = ResourceKind>) -> Self {
        Self {
            blocked: kinds.into_iter().collect(),
        }
    }

    /// Whether a request of this kind may proceed
    pub fn allows(&self, kind: ResourceKind) -> bool {
        !self.blocked.contains(&kind)
    }
}

impl Default for ResourcePolicy {
    /// Blocks images, fonts, stylesheets and media
    fn default() -> Self {
        Self::blocking([
            ResourceKind::Image,
            ResourceKind::Font,
            ResourceKind::Stylesheet,
            ResourceKind::Media,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_blocks_heavy_resources() {
        let policy = ResourcePolicy::default();
        for kind in [
            ResourceKind::Image,
            ResourceKind::Font,
            ResourceKind::Stylesheet,
            ResourceKind::Media,
        ] {
            assert!(!policy.allows(kind), "{kind:?} should be blocked");
        }
    }

    #[test]
    fn test_default_allows_structure() {
        let policy = ResourcePolicy::default();
        for kind in [
            ResourceKind::Document,
            ResourceKind::Script,
            ResourceKind::Other,
        ] {
            assert!(policy.allows(kind), "{kind:?} should be allowed");
        }
    }

    #[test]
    fn test_empty_policy_allows_everything() {
        let policy = ResourcePolicy::blocking([]);
        assert!(policy.allows(ResourceKind::Image));
        assert!(policy.allows(ResourceKind::Font));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ResourcePolicy::blocking([ResourceKind::Font])).unwrap();
        assert_eq!(json, r#"{"blocked":["font"]}"#);
    }
}
