//! Pagesift Reducer
//!
//! Shrinks a rendered page into LLM-sized input. Three interchangeable
//! strategies are available:
//!
//! - **Main content** removes page chrome and keeps the primary content
//!   region as text
//! - **Light cleanup** removes only script, style and media elements and
//!   keeps the markup, for when table or list layout matters
//! - **Targeted** keeps labelled windows of text around prices, times,
//!   codes and domain keywords
//!
//! HTML parsing is provided by ranked backends ([`MainContentBackend`],
//! [`MarkupCleaner`]); the reducer degrades to the next backend, and finally
//! to the raw input, instead of failing.

#![warn(missing_docs)]

mod backend;
mod cleanup;
mod main_content;
mod reducer;
mod targeted;
mod text;
pub mod vocabulary;

pub use backend::{CleanupProfile, MainContentBackend, MarkupCleaner};
pub use cleanup::{DomCleaner, PatternCleaner};
#[cfg(feature = "readability")]
pub use main_content::ReadabilityBackend;
pub use main_content::StructuralBackend;
pub use reducer::{
    default_cleaners, default_main_content_backends, ContentReducer, ReducerConfig,
    ReductionStrategy,
};
pub use targeted::{Match, Region, TargetedConfig, TargetedExtractor};
pub use text::normalize_whitespace;
