//! # Research Steps
//!
//! The guided research flow is a short, linear pipeline:
//!
//! ```text
//! topic ──▶ clarify ──▶ (user answers) ──▶ plan ──▶ search × N ──▶ evaluate
//!                                                                   │
//!                         ┌──────── insufficient (once) ◀───────────┤
//!                         ▼                                         │ sufficient
//!                       expand ──▶ search × M ──────────────────────┴──▶ report
//! ```
//!
//! Each step is a method on [`Researcher`]. Steps are memoized in a
//! [`StepCache`](crate::cache::StepCache) keyed by their inputs, so repeating a
//! step with identical arguments does not call the provider again.
//!
//! - `types` - data passed between steps
//! - `prompts` - prompt templates
//! - `session` - explicit per-session state machine
//! - `pipeline` - drives the steps against a session with progress callbacks

mod clarify;
mod coverage;
mod expand;
mod plan;
pub mod pipeline;
pub mod prompts;
mod report;
mod search;
pub mod session;
pub mod types;

pub use coverage::covers_goal;
pub use expand::parse_expansion;
pub use pipeline::{NoopObserver, ResearchObserver, ResearchPipeline};
pub use plan::parse_plan;
pub use session::{ResearchSession, SessionPhase};
pub use types::{
    validate_answers, Clarification, CollectedResults, PlannedResearch, ResearchPlan, SearchResult,
};

use crate::cache::StepCache;
use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::gateway::{Extracted, LeadingMessage, ModelResponse, OutputExtractor, ResponsesApi, ToolSpec};

/// Models, persona and counts shared by every step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSettings {
    pub model: String,
    pub mini_model: String,
    pub persona: String,
    pub question_count: usize,
    pub query_count: usize,
    pub tools: Vec<ToolSpec>,
}

impl From<&Config> for StepSettings {
    fn from(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            mini_model: config.mini_model.clone(),
            persona: config.persona.clone(),
            question_count: config.question_count,
            query_count: config.query_count,
            tools: vec![ToolSpec::WebSearch],
        }
    }
}

/// Runs individual research steps against a [`ResponsesApi`].
pub struct Researcher<G> {
    gateway: G,
    settings: StepSettings,
    cache: StepCache,
}

impl<G: ResponsesApi> Researcher<G> {
    pub fn new(gateway: G, settings: StepSettings) -> Self {
        Self {
            gateway,
            settings,
            cache: StepCache::new(),
        }
    }

    pub fn from_config(gateway: G, config: &Config) -> Self {
        Self::new(gateway, StepSettings::from(config))
    }

    pub fn cache(&self) -> &StepCache {
        &self.cache
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

/// `(response id, text of output[0])`, or a fatal error if the shape is off.
fn leading_text(response: &ModelResponse) -> Result<(String, String)> {
    match LeadingMessage.extract(response) {
        Extracted::Text { text, .. } => Ok((response.id.clone(), text.to_string())),
        Extracted::Unexpected(diagnostic) => Err(GatewayError::MalformedResponse(diagnostic).into()),
    }
}

/// Strip one surrounding markdown code fence (```` ```json ... ``` ````).
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  [\"a\"]  "), "[\"a\"]");
        assert_eq!(strip_code_fence("```json\n{\"goal\":\"g\"}\n```"), "{\"goal\":\"g\"}");
        assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("```[1]"), "```[1]");
    }

    #[test]
    fn test_settings_from_config_declare_web_search() {
        let settings = StepSettings::from(&Config::default());
        assert_eq!(settings.tools, vec![ToolSpec::WebSearch]);
        assert_eq!(settings.model, "gpt-4.1");
        assert_eq!(settings.mini_model, "gpt-4.1-mini");
    }
}
