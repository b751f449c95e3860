//! Wire types for the OpenAI Responses API (`POST /responses`).
//!
//! Only the fields this crate reads or writes are modelled. Unknown response
//! fields are kept in `extra` maps so a malformed output can be reported
//! verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of an input message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Developer,
    Assistant,
    User,
}

/// One `{role, content}` turn of a structured input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMessage {
    pub role: Role,
    pub content: String,
}

impl InputMessage {
    pub fn developer(content: impl Into<String>) -> Self {
        Self {
            role: Role::Developer,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request input: a bare prompt string or an ordered list of turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseInput {
    Text(String),
    Messages(Vec<InputMessage>),
}

impl From<String> for ResponseInput {
    fn from(text: String) -> Self {
        ResponseInput::Text(text)
    }
}

impl From<Vec<InputMessage>> for ResponseInput {
    fn from(messages: Vec<InputMessage>) -> Self {
        ResponseInput::Messages(messages)
    }
}

/// Hosted tools the model may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolSpec {
    /// Provider-side web search; serializes as `{"type":"web_search"}`.
    WebSearch,
}

/// Body of a "create response" call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseRequest {
    pub model: String,
    pub input: ResponseInput,
    pub instructions: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
}

impl ResponseRequest {
    pub fn new(
        model: impl Into<String>,
        input: impl Into<ResponseInput>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            instructions: instructions.into(),
            tools: Vec::new(),
            previous_response_id: None,
        }
    }

    pub fn with_tools(mut self, tools: &[ToolSpec]) -> Self {
        self.tools = tools.to_vec();
        self
    }

    /// Chain onto an earlier response. `None` leaves the request unchained.
    pub fn with_previous_response(mut self, id: Option<&str>) -> Self {
        self.previous_response_id = id.map(str::to_string);
        self
    }
}

/// A piece of content inside an output item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One element of the response's `output` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ContentPart>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OutputItem {
    /// Text of the first content part, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.as_ref()?.first()?.text.as_deref()
    }
}

/// Response object returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub id: String,
    #[serde(default)]
    pub output: Vec<OutputItem>,
}
