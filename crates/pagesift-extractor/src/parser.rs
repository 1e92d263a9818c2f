//! Parse LLM replies into JSON

use crate::error::ExtractorError;
use serde_json::Value;
use tracing::debug;

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Parse an LLM reply as JSON
///
/// The reply is parsed as-is first. If that fails, the body of the first
/// fenced code block is parsed instead. A block tagged `json` is preferred
/// over an untagged one.
///
/// # Errors
///
/// - `EmptyResponse` if the reply is blank
/// - `InvalidJson` if neither the reply nor a fenced block parses
///
/// # Examples
///
/// ```
/// use pagesift_extractor::parse_json_reply;
///
/// let value = parse_json_reply("```json\n{\"a\":1}\n```").unwrap();
/// assert_eq!(value["a"], 1);
/// ```
pub fn parse_json_reply(reply: &str) -> Result<Value, ExtractorError> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Err(ExtractorError::EmptyResponse);
    }

    let direct_error = match serde_json::from_str(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    match fenced_block(trimmed) {
        Some(block) => {
            debug!("reply is not bare JSON, parsing fenced block");
            serde_json::from_str(block).map_err(ExtractorError::from)
        }
        None => Err(ExtractorError::from(direct_error)),
    }
}

/// Body of the first fenced block, without the fences
fn fenced_block(reply: &str) -> Option<&str> {
    let start = match reply.find(JSON_FENCE) {
        Some(pos) => pos + JSON_FENCE.len(),
        None => reply.find(FENCE)? + FENCE.len(),
    };

    let rest = &reply[start..];
    let body = match rest.find(FENCE) {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(body.trim())
}
