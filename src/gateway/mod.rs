//! # Language-Model Gateway
//!
//! The only path to the provider. Every research step builds a
//! [`ResponseRequest`] and sends it through a [`ResponsesApi`]; transport and
//! API failures come back as [`GatewayError`] and are never retried.

mod extract;
mod openai;
mod types;

#[cfg(test)]
pub(crate) mod scripted;

pub use extract::{describe_output, Extracted, LeadingMessage, OutputExtractor, SearchAnswer};
pub use openai::OpenAiGateway;
pub use types::{
    ContentPart, InputMessage, ModelResponse, OutputItem, ResponseInput, ResponseRequest, Role,
    ToolSpec,
};

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::GatewayError;

/// "Create response" against a Responses-style API.
///
/// Implemented by [`OpenAiGateway`] for real calls; tests substitute a
/// scripted provider.
#[async_trait]
pub trait ResponsesApi: Send + Sync {
    async fn create_response(&self, request: &ResponseRequest) -> Result<ModelResponse, GatewayError>;
}

#[async_trait]
impl<T: ResponsesApi + ?Sized> ResponsesApi for Arc<T> {
    async fn create_response(&self, request: &ResponseRequest) -> Result<ModelResponse, GatewayError> {
        (**self).create_response(request).await
    }
}
