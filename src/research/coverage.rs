//! Coverage evaluator: a coarse yes/no gate on the collected results.

use tracing::info;

use super::types::CollectedResults;
use super::{leading_text, prompts, Researcher};
use crate::error::{ResearchError, Result};
use crate::gateway::{ResponseRequest, ResponsesApi};

impl<G: ResponsesApi> Researcher<G> {
    /// Ask whether `collected` fully satisfies `goal`.
    pub async fn evaluate(&self, collected: &CollectedResults, goal: &str) -> Result<bool> {
        let settings = &self.settings;
        let key = (collected, goal, &settings.persona, &settings.model);

        self.cache
            .get_or_compute("evaluate", &key, || async {
                let input = prompts::coverage(goal, &collected.to_json()?);
                let request =
                    ResponseRequest::new(settings.model.as_str(), input, settings.persona.as_str());

                let response = self.gateway.create_response(&request).await?;
                let (_, text) = leading_text(&response)?;
                let sufficient = covers_goal(&text);

                info!(results = collected.len(), sufficient, "Coverage evaluated");
                Ok::<_, ResearchError>(sufficient)
            })
            .await
    }
}

/// True iff the lowercased answer contains `"yes"` anywhere.
pub fn covers_goal(answer: &str) -> bool {
    answer.to_lowercase().contains("yes")
}
