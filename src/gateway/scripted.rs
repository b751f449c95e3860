//! In-process `ResponsesApi` for unit tests: answers from a closure and
//! records every request it receives.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;

use super::{ModelResponse, ResponseInput, ResponseRequest, ResponsesApi};
use crate::error::GatewayError;

type Responder = Box<dyn Fn(&ResponseRequest) -> Result<ModelResponse, GatewayError> + Send + Sync>;

pub(crate) struct ScriptedGateway {
    responder: Responder,
    requests: Mutex<Vec<ResponseRequest>>,
}

impl ScriptedGateway {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&ResponseRequest) -> Result<ModelResponse, GatewayError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always reply with the same plain message.
    pub(crate) fn replying(id: &str, text: &str) -> Self {
        let (id, text) = (id.to_string(), text.to_string());
        Self::new(move |_| Ok(message_response(&id, &text)))
    }

    pub(crate) fn requests(&self) -> Vec<ResponseRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ResponsesApi for ScriptedGateway {
    async fn create_response(&self, request: &ResponseRequest) -> Result<ModelResponse, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }
}

/// `output[0]` is a message carrying `text`.
pub(crate) fn message_response(id: &str, text: &str) -> ModelResponse {
    serde_json::from_value(json!({
        "id": id,
        "output": [
            {"type": "message", "id": format!("msg_{}", id), "role": "assistant",
             "content": [{"type": "output_text", "text": text}]}
        ]
    }))
    .unwrap()
}

/// A web-search call followed by the answer message at `output[1]`.
pub(crate) fn search_response(id: &str, text: &str) -> ModelResponse {
    serde_json::from_value(json!({
        "id": id,
        "output": [
            {"type": "web_search_call", "id": format!("ws_{}", id), "status": "completed"},
            {"type": "message", "id": format!("msg_{}", id), "role": "assistant",
             "content": [{"type": "output_text", "text": text}]}
        ]
    }))
    .unwrap()
}

/// Flatten a request's input into one string for assertions.
pub(crate) fn input_text(request: &ResponseRequest) -> String {
    match &request.input {
        ResponseInput::Text(text) => text.clone(),
        ResponseInput::Messages(messages) => messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
