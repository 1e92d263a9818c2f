//! Rendered page content

/// Output of one successful page load.
///
/// Produced once per request by the render stage and consumed by the
/// reduction stage. Fields are private so the value stays immutable after
/// creation.
///
/// # Examples
///
/// ```
/// use pagesift_domain::RenderResult;
///
/// let page = RenderResult::new("<html><body>Hi</body></html>", "Hi");
/// assert_eq!(page.text(), "Hi");
/// assert!(page.html().contains("<body>"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    html: String,
    text: String,
}

impl RenderResult {
    /// Create a render result from serialized HTML and visible text
    pub fn new(html: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            text: text.into(),
        }
    }

    /// Full serialized HTML of the page
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Visible inner text of the page body
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the HTML in characters
    pub fn html_len(&self) -> usize {
        self.html.chars().count()
    }

    /// Length of the visible text in characters
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lengths_count_characters() {
        let page = RenderResult::new("<p>café</p>", "café");
        assert_eq!(page.text_len(), 4);
        assert_eq!(page.html_len(), 11);
    }
}
