//! Clarification step: turn a topic into numbered clarifying questions.

use tracing::{debug, info};

use super::types::Clarification;
use super::{leading_text, prompts, Researcher};
use crate::error::{GatewayError, ResearchError, Result};
use crate::gateway::{ResponseRequest, ResponsesApi};

impl<G: ResponsesApi> Researcher<G> {
    /// Ask the mini model for clarifying questions about `topic`.
    ///
    /// The reply is split into one question per non-blank line; a reply with
    /// no questions is a malformed response. Memoized by
    /// `(topic, persona, mini model, question count)`.
    pub async fn clarify(&self, topic: &str) -> Result<Clarification> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ResearchError::EmptyTopic);
        }

        let settings = &self.settings;
        let key = (
            topic,
            &settings.persona,
            &settings.mini_model,
            settings.question_count,
        );

        self.cache
            .get_or_compute("clarify", &key, || async {
                info!(topic = %topic, model = %settings.mini_model, "Generating clarifying questions");

                let request = ResponseRequest::new(
                    settings.mini_model.as_str(),
                    prompts::clarify(topic, settings.question_count),
                    settings.persona.as_str(),
                );
                let response = self.gateway.create_response(&request).await?;
                let (response_id, text) = leading_text(&response)?;

                let questions = split_questions(&text);
                if questions.is_empty() {
                    return Err(ResearchError::Gateway(GatewayError::MalformedResponse(
                        "clarification reply contains no questions".to_string(),
                    )));
                }
                debug!(count = questions.len(), "Clarifying questions received");

                Ok::<_, ResearchError>(Clarification {
                    questions,
                    response_id,
                })
            })
            .await
    }
}

/// One question per line; blank lines are dropped and lines trimmed.
pub(crate) fn split_questions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
