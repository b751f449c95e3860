//! Named extraction of text from a response's `output` list.
//!
//! Each extractor knows the shape it expects. When the shape is absent it
//! returns [`Extracted::Unexpected`] with a diagnostic instead of panicking on
//! an index; the caller decides whether that is fatal.

use super::types::ModelResponse;

/// Outcome of an extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted<'a> {
    /// The expected item was present.
    Text { id: &'a str, text: &'a str },
    /// The output did not have the expected shape.
    Unexpected(String),
}

impl<'a> Extracted<'a> {
    pub fn text(&self) -> Option<&'a str> {
        match self {
            Extracted::Text { text, .. } => Some(*text),
            Extracted::Unexpected(_) => None,
        }
    }
}

pub trait OutputExtractor {
    fn extract<'a>(&self, response: &'a ModelResponse) -> Extracted<'a>;
}

/// Text of `output[0]`: a plain completion without tool calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadingMessage;

/// Text of `output[1]`: the message the model writes after its web-search call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchAnswer;

impl OutputExtractor for LeadingMessage {
    fn extract<'a>(&self, response: &'a ModelResponse) -> Extracted<'a> {
        extract_at(response, 0)
    }
}

impl OutputExtractor for SearchAnswer {
    fn extract<'a>(&self, response: &'a ModelResponse) -> Extracted<'a> {
        extract_at(response, 1)
    }
}

fn extract_at(response: &ModelResponse, index: usize) -> Extracted<'_> {
    let item = response.output.get(index);
    match item.and_then(|i| Some((i.id.as_deref()?, i.first_text()?))) {
        Some((id, text)) => Extracted::Text { id, text },
        None => Extracted::Unexpected(format!(
            "Unexpected response format: {}",
            describe_output(response)
        )),
    }
}

/// Raw output list as JSON, used in diagnostics.
pub fn describe_output(response: &ModelResponse) -> String {
    serde_json::to_string(&response.output).unwrap_or_else(|_| format!("{:?}", response.output))
}
