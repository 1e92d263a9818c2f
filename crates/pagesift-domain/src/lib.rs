//! Pagesift Domain Layer
//!
//! Data contracts shared by the render, reduction and extraction stages,
//! plus the trait boundary for the remote LLM. This crate has no external
//! dependencies.
//!
//! ## Key Concepts
//!
//! - **RenderResult**: HTML and visible text of one rendered page
//! - **ReductionResult**: the text sent downstream plus provenance metadata
//! - **LlmProvider**: the opaque remote function that turns a prompt into JSON
//!
//! ## Pipeline
//!
//! ```text
//! URL → render → RenderResult → reduce → ReductionResult → LLM → JSON
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod page;
pub mod reduction;
pub mod traits;

// Re-exports for convenience
pub use page::RenderResult;
pub use reduction::{ReductionMethod, ReductionResult};
pub use traits::{CompletionRequest, LlmProvider, ResponseFormat};
