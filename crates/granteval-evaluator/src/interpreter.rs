use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Which parsing tier produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseTier {
    /// The whole text was a JSON object
    Direct,
    /// A `{...}` block was cut out of surrounding prose
    Extracted,
}

impl std::fmt::Display for ParseTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseTier::Direct => write!(f, "direct"),
            ParseTier::Extracted => write!(f, "extracted"),
        }
    }
}

/// A parsed but not yet normalized JSON object from backend text
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    fields: Map<String, Value>,
    tier: ParseTier,
}

impl Candidate {
    pub fn new(fields: Map<String, Value>, tier: ParseTier) -> Self {
        Self { fields, tier }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn tier(&self) -> ParseTier {
        self.tier
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

#[derive(Error, Debug)]
pub enum InterpretError {
    #[error("No JSON object found in backend output")]
    NoJsonObject,

    #[error("Failed to parse extracted JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Turn raw backend text into a candidate object.
///
/// First the whole text is parsed as a JSON object. If that fails, the span
/// from the first `{` to the last `}` is parsed instead, which recovers
/// objects wrapped in prose or code fences.
pub fn interpret(text: &str) -> Result<Candidate, InterpretError> {
    debug!(text_len = text.len(), "Interpreting backend output");

    if let Some(fields) = parse_object(text.trim()).ok().flatten() {
        return Ok(Candidate::new(fields, ParseTier::Direct));
    }

    let block = extract_brace_block(text).ok_or(InterpretError::NoJsonObject)?;
    debug!(block_len = block.len(), "Found brace block");

    match parse_object(block)? {
        Some(fields) => Ok(Candidate::new(fields, ParseTier::Extracted)),
        None => Err(InterpretError::NoJsonObject),
    }
}

/// Parse text as JSON; `Ok(None)` when it is valid JSON but not an object
fn parse_object(text: &str) -> Result<Option<Map<String, Value>>, serde_json::Error> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(fields) => Ok(Some(fields)),
        _ => Ok(None),
    }
}

/// Greedy outer-brace match: first `{` through last `}`
fn extract_brace_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start < end {
        Some(&text[start..=end])
    } else {
        None
    }
}
