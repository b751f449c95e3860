//! Planning step: answers + questions → research goal and search queries.

use tracing::info;

use super::types::{validate_answers, Clarification, PlannedResearch, ResearchPlan};
use super::{leading_text, prompts, strip_code_fence, Researcher};
use crate::error::{ResearchError, Result};
use crate::gateway::{ResponseRequest, ResponsesApi};

impl<G: ResponsesApi> Researcher<G> {
    /// Derive a goal and initial queries, chained onto the clarification call.
    ///
    /// Refuses to run until every question has a non-empty answer. A reply that
    /// is not a `{"goal", "queries"}` JSON object is a fatal error.
    pub async fn plan(
        &self,
        topic: &str,
        clarification: &Clarification,
        answers: &[String],
    ) -> Result<PlannedResearch> {
        validate_answers(&clarification.questions, answers)?;

        let settings = &self.settings;
        let key = (
            answers,
            &clarification.questions,
            topic,
            &settings.persona,
            &settings.model,
            &clarification.response_id,
            settings.query_count,
        );

        self.cache
            .get_or_compute("plan", &key, || async {
                info!(topic = %topic, model = %settings.model, "Generating research goal and queries");

                let prompt = prompts::plan(
                    &serde_json::to_string(answers)?,
                    &serde_json::to_string(&clarification.questions)?,
                    topic,
                    settings.query_count,
                );
                let request = ResponseRequest::new(
                    settings.model.as_str(),
                    prompt,
                    settings.persona.as_str(),
                )
                .with_previous_response(Some(&clarification.response_id));

                let response = self.gateway.create_response(&request).await?;
                let (response_id, text) = leading_text(&response)?;
                let plan = parse_plan(&text)?;

                info!(goal = %plan.goal, queries = plan.queries.len(), "Research plan ready");
                Ok::<_, ResearchError>(PlannedResearch { plan, response_id })
            })
            .await
    }
}

/// Parse `{"goal": "...", "queries": [...]}`, tolerating one code fence.
pub fn parse_plan(text: &str) -> Result<ResearchPlan> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| ResearchError::PlanFormat(format!("{} in {:?}", e, text)))
}
