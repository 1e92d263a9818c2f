//! Pagesift Extractor
//!
//! Ties the content reducer to the LLM: reduces a rendered page, embeds the
//! result in a prompt with its source URL, and parses the reply as JSON.
//!
//! # Architecture
//!
//! ```text
//! RenderResult → ContentReducer → PromptBuilder → LLM → parse_json_reply → JSON
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use pagesift_domain::RenderResult;
//! use pagesift_extractor::{Extractor, ExtractorConfig, PromptTemplate};
//! use pagesift_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"title": "Example Domain"}"#);
//! let template = PromptTemplate::from_file("prompts/prompt.txt")?;
//! let extractor = Extractor::new(llm, template, ExtractorConfig::default());
//!
//! let page = RenderResult::new(
//!     "<html><body><h1>Example Domain</h1></body></html>".to_string(),
//!     "Example Domain".to_string(),
//! );
//! let value = extractor.extract(&page, "https://example.com").await?;
//! println!("{}", value);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod parser;
mod prompt;

pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use parser::parse_json_reply;
pub use prompt::{PromptBuilder, PromptTemplate};
