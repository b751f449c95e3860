//! Report writer: synthesize the collected results into a cited report.

use tracing::info;

use super::types::CollectedResults;
use super::{leading_text, prompts, Researcher};
use crate::error::{ResearchError, Result};
use crate::gateway::{ResponseRequest, ResponsesApi};

impl<G: ResponsesApi> Researcher<G> {
    /// Write the final report. The model's text is returned unmodified;
    /// citations and URLs are not checked.
    pub async fn write_report(&self, collected: &CollectedResults, goal: &str) -> Result<String> {
        let settings = &self.settings;
        let key = (collected, goal, &settings.persona, &settings.model);

        self.cache
            .get_or_compute("report", &key, || async {
                info!(results = collected.len(), "Writing final research report");

                let input = prompts::report(goal, &collected.to_json()?);
                let request =
                    ResponseRequest::new(settings.model.as_str(), input, settings.persona.as_str());

                let response = self.gateway.create_response(&request).await?;
                let (_, text) = leading_text(&response)?;
                Ok::<_, ResearchError>(text)
            })
            .await
    }
}
