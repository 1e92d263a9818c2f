//! Prompt assembly for extraction requests
//!
//! The system message is an operator-supplied template describing the
//! fields to extract. The user message wraps the reduced page content and
//! its source URL in fixed instructions.

use crate::error::ExtractorError;
use std::path::Path;

/// System instructions sent with every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    /// Use `text` as the system instructions
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read the template from a file
    ///
    /// # Errors
    ///
    /// Returns `ExtractorError::Config` if the file cannot be read or
    /// contains only whitespace.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ExtractorError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExtractorError::Config(format!(
                "Failed to read prompt file {}: {}",
                path.display(),
                e
            ))
        })?;

        if text.trim().is_empty() {
            return Err(ExtractorError::Config(format!(
                "Prompt file {} is empty",
                path.display()
            )));
        }

        Ok(Self::new(text))
    }

    /// Template text
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Builds the user message for one page
pub struct PromptBuilder<'a> {
    url: &'a str,
    content: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a builder for reduced `content` fetched from `url`
    pub fn new(url: &'a str, content: &'a str) -> Self {
        Self { url, content }
    }

    /// Build the user message
    pub fn build(&self) -> String {
        let mut prompt = String::with_capacity(self.content.len() + 256);
        prompt.push_str(USER_INSTRUCTIONS);
        prompt.push_str("\n\n");
        prompt.push_str(&format!("URL: {}\n\n", self.url));
        prompt.push_str("Content:\n");
        prompt.push_str(self.content);
        prompt.push_str("\n\n");
        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }
}

const USER_INSTRUCTIONS: &str =
    "Extract the requested data from the following web page content.";

const OUTPUT_FORMAT_REMINDER: &str =
    "Return the extracted data as valid JSON only, with no additional text or explanation.";

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_user_message_layout() {
        let prompt = PromptBuilder::new("https://example.com/fares", "[PRICE:$245.00]\n$245.00").build();
        assert_eq!(
            prompt,
            "Extract the requested data from the following web page content.\n\n\
             URL: https://example.com/fares\n\n\
             Content:\n[PRICE:$245.00]\n$245.00\n\n\
             Return the extracted data as valid JSON only, with no additional text or explanation."
        );
    }

    #[test]
    fn test_empty_content_still_builds() {
        let prompt = PromptBuilder::new("https://example.com", "").build();
        assert!(prompt.contains("Content:\n\n\nReturn"));
    }

    #[test]
    fn test_template_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Extract the cheapest fare as {{\"price\": string}}.").unwrap();

        let template = PromptTemplate::from_file(file.path()).unwrap();
        assert!(template.as_str().starts_with("Extract the cheapest fare"));
    }

    #[test]
    fn test_missing_template_is_config_error() {
        let result = PromptTemplate::from_file("/nonexistent/prompts/prompt.txt");
        assert!(matches!(result, Err(ExtractorError::Config(msg)) if msg.contains("prompt.txt")));
    }

    #[test]
    fn test_blank_template_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "   ").unwrap();
        assert!(matches!(
            PromptTemplate::from_file(file.path()),
            Err(ExtractorError::Config(_))
        ));
    }
}
