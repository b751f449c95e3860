//! OpenAI Responses API client.
//!
//! A thin `reqwest` wrapper: one POST per call, bearer auth, JSON in and out.
//! Nothing is retried and no timeout is set beyond the transport's defaults.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use super::types::{ModelResponse, ResponseRequest};
use super::ResponsesApi;
use crate::credentials::Credential;
use crate::error::GatewayError;

static SHARED: OnceLock<Arc<OpenAiGateway>> = OnceLock::new();

/// Client bound to one API key and base URL.
pub struct OpenAiGateway {
    api_key: String,
    base_url: String,
    client: Client,
}

impl OpenAiGateway {
    /// Create a gateway for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Process-wide gateway. The first call builds it; later calls return the
    /// same instance and ignore their arguments.
    pub fn shared(credential: &Credential, base_url: &str) -> Arc<OpenAiGateway> {
        SHARED
            .get_or_init(|| Arc::new(OpenAiGateway::new(credential.api_key(), base_url)))
            .clone()
    }

    fn endpoint(&self) -> String {
        format!("{}/responses", self.base_url)
    }
}

#[async_trait]
impl ResponsesApi for OpenAiGateway {
    async fn create_response(&self, request: &ResponseRequest) -> Result<ModelResponse, GatewayError> {
        debug!(
            model = %request.model,
            tools = request.tools.len(),
            chained = request.previous_response_id.is_some(),
            "Creating response"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let body: ModelResponse = response
                .json()
                .await
                .map_err(|e| GatewayError::Decode(e.to_string()))?;
            debug!(response_id = %body.id, items = body.output.len(), "Response received");
            return Ok(body);
        }

        let error_text = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 => Err(GatewayError::Unauthorized),
            429 => Err(GatewayError::RateLimited),
            code => Err(GatewayError::Api {
                status: code,
                body: error_text,
            }),
        }
    }
}

/// HTTP tests against a mocked server.
#[cfg(test)]
mod http_tests {
    use super::*;
    use crate::credentials::CredentialOrigin;
    use crate::gateway::types::ToolSpec;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ResponseRequest {
        ResponseRequest::new("gpt-4.1", "search: rust".to_string(), "persona")
            .with_tools(&[ToolSpec::WebSearch])
    }

    #[tokio::test]
    async fn test_successful_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4.1",
                "tools": [{"type": "web_search"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "resp_1",
                "output": [
                    {"type": "web_search_call", "id": "ws_1", "status": "completed"},
                    {"type": "message", "id": "msg_1", "content": [{"type": "output_text", "text": "ok"}]}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = OpenAiGateway::new("sk-test", format!("{}/v1/", server.uri()));
        let response = gateway.create_response(&request()).await.unwrap();

        assert_eq!(response.id, "resp_1");
        assert_eq!(response.output[1].first_text(), Some("ok"));
    }

    #[test]
    fn test_shared_gateway_is_built_once() {
        let first = OpenAiGateway::shared(
            &Credential::new("sk-first", CredentialOrigin::Environment),
            "https://api.openai.com/v1",
        );
        let second = OpenAiGateway::shared(
            &Credential::new("sk-second", CredentialOrigin::SecretsFile),
            "http://localhost:9999/v1",
        );

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.api_key, first.api_key);
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let gateway = OpenAiGateway::new("sk-wrong", server.uri());
        let err = gateway.create_response(&request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized));
    }

    #[tokio::test]
    async fn test_rate_limited_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = OpenAiGateway::new("sk-test", server.uri());
        let err = gateway.create_response(&request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::RateLimited));
    }

    #[tokio::test]
    async fn test_server_error_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let gateway = OpenAiGateway::new("sk-test", server.uri());
        match gateway.create_response(&request()).await.unwrap_err() {
            GatewayError::Api { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let gateway = OpenAiGateway::new("sk-test", server.uri());
        let err = gateway.create_response(&request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }
}
