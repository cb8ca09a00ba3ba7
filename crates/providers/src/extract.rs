//! Response normalization.
//!
//! Provider responses are loosely documented and drift between versions, so
//! each adapter carries an ordered chain of [`ExtractStrategy`] values. The
//! first strategy that finds something wins; when none does, the whole
//! response is serialized back to JSON text.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized output of one provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutput {
    Text(String),
    Structured(Value),
}

impl AnalysisOutput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnalysisOutput::Text(text) => Some(text),
            AnalysisOutput::Structured(_) => None,
        }
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::String(text) => AnalysisOutput::Text(text.clone()),
            other => AnalysisOutput::Structured(other.clone()),
        }
    }
}

/// One step of an extraction chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractStrategy {
    /// Take a top-level key, e.g. `result` or `output`. A key that is
    /// present always hits, even when its value is `null`.
    Field { key: String },
    /// Take the first element of a top-level list and read its text field,
    /// e.g. `choices[0].text`. When the text is missing or JSON-falsy
    /// (`null`, `false`, `0`, `""`, `[]`, `{}`) the candidate itself is
    /// returned serialized as JSON.
    FirstCandidate { list: String, text: String },
    /// Serialize the whole response.
    Whole,
    /// Return the whole response untouched as structured JSON.
    Raw,
}

impl ExtractStrategy {
    pub fn field(key: impl Into<String>) -> Self {
        ExtractStrategy::Field { key: key.into() }
    }

    pub fn first_candidate(list: impl Into<String>, text: impl Into<String>) -> Self {
        ExtractStrategy::FirstCandidate {
            list: list.into(),
            text: text.into(),
        }
    }

    /// Apply this strategy alone. `None` means "try the next one".
    pub fn apply(&self, response: &Value) -> Option<AnalysisOutput> {
        match self {
            ExtractStrategy::Field { key } => response.get(key).map(AnalysisOutput::from_value),
            ExtractStrategy::FirstCandidate { list, text } => {
                let candidate = response.get(list)?.as_array()?.first()?;
                match candidate.get(text) {
                    Some(value) if is_truthy(value) => Some(AnalysisOutput::from_value(value)),
                    _ => Some(AnalysisOutput::Text(candidate.to_string())),
                }
            }
            ExtractStrategy::Whole => Some(AnalysisOutput::Text(response.to_string())),
            ExtractStrategy::Raw => Some(AnalysisOutput::Structured(response.clone())),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Run `chain` in order against `response`.
pub fn extract(chain: &[ExtractStrategy], response: &Value) -> AnalysisOutput {
    chain
        .iter()
        .find_map(|strategy| strategy.apply(response))
        .unwrap_or_else(|| AnalysisOutput::Text(response.to_string()))
}
