//! Search step: one provider web search per query.
//!
//! This is the only step that degrades instead of failing. If the provider
//! output does not have the expected shape, the result is kept with a
//! diagnostic in place of the research text.

use tracing::{info, warn};

use super::types::SearchResult;
use super::{prompts, Researcher};
use crate::error::{ResearchError, Result};
use crate::gateway::{Extracted, OutputExtractor, ResponseRequest, ResponsesApi, SearchAnswer, ToolSpec};

impl<G: ResponsesApi> Researcher<G> {
    /// Run one web search for `query`.
    ///
    /// Transport and API errors still propagate. Memoized by
    /// `(query, persona, model, tools)`.
    pub async fn search(&self, query: &str) -> Result<SearchResult> {
        let settings = &self.settings;
        if !settings.tools.contains(&ToolSpec::WebSearch) {
            return Err(ResearchError::Config(
                "search requires the web_search tool to be declared".to_string(),
            ));
        }

        let key = (query, &settings.persona, &settings.model, &settings.tools);

        self.cache
            .get_or_compute("search", &key, || async {
                info!(query = %query, "Running web search");

                let request = ResponseRequest::new(
                    settings.model.as_str(),
                    prompts::search(query),
                    settings.persona.as_str(),
                )
                .with_tools(&settings.tools);

                let response = self.gateway.create_response(&request).await?;
                Ok::<_, ResearchError>(search_result(query, &response))
            })
            .await
    }
}

/// Build a [`SearchResult`] from a web-search response, never failing.
pub(crate) fn search_result(query: &str, response: &crate::gateway::ModelResponse) -> SearchResult {
    match SearchAnswer.extract(response) {
        Extracted::Text { id, text } => SearchResult {
            query: query.to_string(),
            resp_id: Some(id.to_string()),
            research_output: text.to_string(),
        },
        Extracted::Unexpected(diagnostic) => {
            warn!(query = %query, "Search returned an unexpected output shape");
            SearchResult {
                query: query.to_string(),
                resp_id: None,
                research_output: format!("Error: {}", diagnostic),
            }
        }
    }
}
