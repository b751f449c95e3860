//! # Configuration Module
//!
//! Runtime settings for a research session: which models to call, where the
//! provider lives, how many questions and queries to ask for, and the persona
//! sent as `instructions` on every request.
//!
//! Settings come from environment variables (optionally seeded from a `.env`
//! file) and can be overridden from the command line.

use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use tracing::debug;

/// Fixed system persona sent as `instructions` with every provider call.
pub const DEFAULT_PERSONA: &str = "\
You are an expert Deep Researcher.
You provide complete and in depth research to the user.
";

/// Main model used for planning, searching, evaluating and reporting.
pub const DEFAULT_MODEL: &str = "gpt-4.1";

/// Smaller model used for the clarification step.
pub const DEFAULT_MINI_MODEL: &str = "gpt-4.1-mini";

/// Default OpenAI API base URL (without trailing slash).
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Upper bound for question/query counts accepted by `validate`.
const MAX_COUNT: usize = 10;

// =============================================================================
// CONFIGURATION STRUCT
// =============================================================================
/// Main configuration for the research assistant.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Model for everything except clarification (e.g. "gpt-4.1")
    pub model: String,

    /// Model for the clarification step (e.g. "gpt-4.1-mini")
    pub mini_model: String,

    /// Responses API base URL
    pub api_base_url: String,

    /// Number of clarifying questions to request
    pub question_count: usize,

    /// Number of search queries to request per planning/expansion round
    pub query_count: usize,

    /// Persona sent as `instructions`
    pub persona: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            mini_model: DEFAULT_MINI_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            question_count: 5,
            query_count: 5,
            persona: DEFAULT_PERSONA.to_string(),
        }
    }
}

// =============================================================================
// CONFIGURATION LOADING
// =============================================================================
impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first (silently ignored
    /// if missing). Variables already present in the process environment win
    /// over the file.
    ///
    /// # Example
    /// ```no_run
    /// let config = deep_research::Config::from_env()?;
    /// println!("Using model: {}", config.model);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`Config::from_env`], but seeds the environment from `path`
    /// instead of searching for `.env`.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        if let Err(e) = dotenvy::from_path(path) {
            debug!(path = %path.display(), error = %e, "No env file loaded");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests pass a map instead of touching the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(val) = lookup("RESEARCH_MODEL") {
            config.model = val;
        }

        if let Some(val) = lookup("RESEARCH_MINI_MODEL") {
            config.mini_model = val;
        }

        if let Some(val) = lookup("OPENAI_BASE_URL") {
            config.api_base_url = val.trim_end_matches('/').to_string();
        }

        if let Some(val) = lookup("RESEARCH_QUESTIONS") {
            config.question_count = val
                .parse()
                .context("RESEARCH_QUESTIONS must be a valid positive integer")?;
        }

        if let Some(val) = lookup("RESEARCH_QUERIES") {
            config.query_count = val
                .parse()
                .context("RESEARCH_QUERIES must be a valid positive integer")?;
        }

        if let Some(val) = lookup("RESEARCH_PERSONA") {
            config.persona = val;
        }

        Ok(config)
    }

    /// Validate the configuration before any provider call is made.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            anyhow::bail!("RESEARCH_MODEL cannot be empty");
        }

        if self.mini_model.trim().is_empty() {
            anyhow::bail!("RESEARCH_MINI_MODEL cannot be empty");
        }

        if !self.api_base_url.starts_with("http") {
            anyhow::bail!(
                "OPENAI_BASE_URL must be an http(s) URL, got: {}",
                self.api_base_url
            );
        }

        if !(1..=MAX_COUNT).contains(&self.question_count) {
            anyhow::bail!(
                "RESEARCH_QUESTIONS must be between 1 and {}, got: {}",
                MAX_COUNT,
                self.question_count
            );
        }

        if !(1..=MAX_COUNT).contains(&self.query_count) {
            anyhow::bail!(
                "RESEARCH_QUERIES must be between 1 and {}, got: {}",
                MAX_COUNT,
                self.query_count
            );
        }

        Ok(())
    }
}
