//! Pull a JSON decision out of free-form model text

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// First ```json fenced block; the capture is the block body
static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json[ \t]*\r?\n(.*?)\r?\n\s*```").expect("Invalid fenced JSON regex"));

/// Outcome of scanning model text for a JSON object
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Parsed(Value),
    /// Nothing usable was found; `raw` is the full model text
    Unparseable { raw: String, reason: String },
}

impl Extracted {
    fn unparseable(raw: &str, reason: impl Into<String>) -> Self {
        Self::Unparseable {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

/// Extract the first JSON object from `text`.
///
/// A fenced ```json block wins over bare braces, and only the first fenced
/// block is considered. A fenced block that does not parse is unparseable.
pub fn extract_json(text: &str) -> Extracted {
    let fenced = FENCED_JSON.captures(text).and_then(|captures| captures.get(1));
    if let Some(block) = fenced {
        return match serde_json::from_str(block.as_str().trim()) {
            Ok(value) => Extracted::Parsed(value),
            Err(e) => Extracted::unparseable(text, format!("Invalid JSON in fenced block: {}", e)),
        };
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => match serde_json::from_str(&text[start..=end]) {
            Ok(value) => Extracted::Parsed(value),
            Err(e) => Extracted::unparseable(text, format!("Invalid JSON object: {}", e)),
        },
        _ => Extracted::unparseable(text, "No valid JSON found in response"),
    }
}
