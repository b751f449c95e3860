//! Query expansion: ask for more searches when coverage is insufficient.
//!
//! Unlike planning, the reply is a bare JSON array of strings. New queries are
//! not deduplicated against earlier ones.

use tracing::info;

use super::types::CollectedResults;
use super::{leading_text, prompts, strip_code_fence, Researcher};
use crate::error::{ResearchError, Result};
use crate::gateway::{ResponseRequest, ResponsesApi};

impl<G: ResponsesApi> Researcher<G> {
    /// Request up to `query_count` additional queries, chained onto the
    /// planning response.
    pub async fn expand(
        &self,
        collected: &CollectedResults,
        goal: &str,
        plan_response_id: Option<&str>,
    ) -> Result<Vec<String>> {
        let settings = &self.settings;
        let key = (
            collected,
            goal,
            &settings.persona,
            &settings.model,
            plan_response_id,
            settings.query_count,
        );

        self.cache
            .get_or_compute("expand", &key, || async {
                info!(goal = %goal, "Requesting additional queries");

                let input = prompts::expand(goal, &collected.to_json()?, settings.query_count);
                let request =
                    ResponseRequest::new(settings.model.as_str(), input, settings.persona.as_str())
                        .with_previous_response(plan_response_id);

                let response = self.gateway.create_response(&request).await?;
                let (_, text) = leading_text(&response)?;

                let mut queries = parse_expansion(&text)?;
                queries.truncate(settings.query_count);

                info!(count = queries.len(), "Additional queries ready");
                Ok::<_, ResearchError>(queries)
            })
            .await
    }
}

/// Parse a bare JSON array of strings, tolerating one code fence.
pub fn parse_expansion(text: &str) -> Result<Vec<String>> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| ResearchError::ExpansionFormat(format!("{} in {:?}", e, text)))
}
