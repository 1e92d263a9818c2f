//! Reduction output and provenance

use std::fmt;

/// Which reduction strategy produced a [`ReductionResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReductionMethod {
    /// Readability-style article extraction
    Readability,

    /// Structural removal of boilerplate elements followed by container selection
    Structural,

    /// Visible text returned as-is because no HTML parsing was possible
    RawText,

    /// Markup kept, only script/style/media elements removed
    LightCleanup,

    /// Markup cleanup using literal tag patterns instead of a parser
    PatternCleanup,

    /// Keyword windows around tokens of interest
    Targeted,
}

impl ReductionMethod {
    /// Get the method name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ReductionMethod::Readability => "readability",
            ReductionMethod::Structural => "structural",
            ReductionMethod::RawText => "raw_text",
            ReductionMethod::LightCleanup => "light_cleanup",
            ReductionMethod::PatternCleanup => "pattern_cleanup",
            ReductionMethod::Targeted => "targeted",
        }
    }
}

impl fmt::Display for ReductionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reduced content ready for the LLM, with provenance metadata.
///
/// The metadata is observational only; nothing downstream feeds it back
/// into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionResult {
    /// Text ultimately sent downstream
    pub content: String,

    /// Strategy that produced `content`
    pub method: ReductionMethod,

    /// Length in characters of the input the strategy consumed
    pub original_len: usize,

    /// Length in characters of `content`
    pub final_len: usize,
}

impl ReductionResult {
    /// Create a result, computing `final_len` from `content`
    pub fn new(content: String, method: ReductionMethod, original_len: usize) -> Self {
        let final_len = content.chars().count();
        Self {
            content,
            method,
            original_len,
            final_len,
        }
    }

    /// Whether the reduction produced no content
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Fraction of the original length that was kept (0.0 when the input was empty)
    pub fn ratio(&self) -> f64 {
        if self.original_len == 0 {
            return 0.0;
        }
        self.final_len as f64 / self.original_len as f64
    }
}
