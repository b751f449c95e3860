//! # Error Types
//!
//! Typed errors for every stage of a research session. The binary wraps these
//! in `anyhow` for user-facing context; the library keeps them precise so
//! callers (and tests) can match on what went wrong.

use thiserror::Error;

use crate::research::session::SessionPhase;

// =============================================================================
// CREDENTIAL ERRORS
// =============================================================================
/// Failure to locate an API credential.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// None of the layered sources produced a non-empty key.
    #[error("OpenAI API key not found; checked {0}")]
    NotFound(String),
}

// =============================================================================
// GATEWAY ERRORS
// =============================================================================
/// Errors raised while talking to the language-model provider.
///
/// None of these are retried: they propagate straight to the caller.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized - check API key")]
    Unauthorized,

    #[error("Rate limited - too many requests")]
    RateLimited,

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            GatewayError::Connection(e.to_string())
        } else if e.is_decode() {
            GatewayError::Decode(e.to_string())
        } else {
            GatewayError::Network(e.to_string())
        }
    }
}

// =============================================================================
// RESEARCH ERRORS
// =============================================================================
/// Top-level error for the research pipeline.
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Research topic cannot be empty")]
    EmptyTopic,

    /// Planning needs one non-empty answer per clarifying question.
    #[error("Expected {expected} non-empty answers, got {provided} ({missing} missing)")]
    Answers {
        expected: usize,
        provided: usize,
        missing: usize,
    },

    #[error("Research plan is not valid JSON {{\"goal\", \"queries\"}}: {0}")]
    PlanFormat(String),

    #[error("Expansion queries are not a valid JSON array of strings: {0}")]
    ExpansionFormat(String),

    #[error("Invalid session transition from {from:?} to {to:?}")]
    InvalidTransition { from: SessionPhase, to: SessionPhase },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ResearchError {
    /// Whether this error ends the research session.
    ///
    /// Input problems (empty topic, missing answers) and out-of-order calls
    /// leave the session where it was so the caller can try again.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ResearchError::EmptyTopic
                | ResearchError::Answers { .. }
                | ResearchError::InvalidTransition { .. }
        )
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, ResearchError>;
