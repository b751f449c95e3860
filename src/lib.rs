//! deep-research: a guided deep-research assistant over the OpenAI Responses API
//!
//! A session clarifies the topic, derives a goal and search queries, runs one
//! provider-side web search per query, checks coverage, expands the search at
//! most once and writes a cited report.
//!
//! - `CredentialResolver`: secrets file → environment → `.env` lookup
//! - `ResponsesApi`: the single provider seam (`OpenAiGateway` in production)
//! - `Researcher`: the individual, memoized research steps
//! - `ResearchPipeline` + `ResearchSession`: ordered execution with progress callbacks
//!
//! ```rust,no_run
//! use deep_research::{Config, CredentialResolver, OpenAiGateway, ResearchPipeline, ResearchSession};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let credential = CredentialResolver::standard("secrets.toml", ".env").resolve()?;
//! let config = Config::from_env()?;
//! let gateway = OpenAiGateway::shared(&credential, &config.api_base_url);
//!
//! let pipeline = ResearchPipeline::from_config(gateway, &config);
//! let mut session = ResearchSession::new();
//! pipeline.clarify(&mut session, "electric vehicle adoption trends").await?;
//! let answers = session.questions().iter().map(|_| "Global, 2020-2024".to_string()).collect();
//! pipeline.plan(&mut session, answers).await?;
//! let report = pipeline.research(&mut session).await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod render;
pub mod research;

// Re-exports for convenience
pub use cache::{CacheKey, StepCache};
pub use config::Config;
pub use credentials::{Credential, CredentialOrigin, CredentialResolver, CredentialSource};
pub use error::{CredentialError, GatewayError, ResearchError, Result};
pub use gateway::{ModelResponse, OpenAiGateway, ResponseRequest, ResponsesApi, ToolSpec};
pub use render::render_markdown;
pub use research::{
    Clarification, CollectedResults, NoopObserver, ResearchObserver, ResearchPipeline,
    ResearchPlan, ResearchSession, Researcher, SearchResult, SessionPhase, StepSettings,
};
