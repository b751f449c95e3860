//! Data carried between research steps.

use serde::{Deserialize, Serialize};

use crate::error::{ResearchError, Result};

/// Output of the clarification step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clarification {
    /// Ordered questions, one per non-blank line of the model's reply.
    pub questions: Vec<String>,
    /// Provider response id, used to chain the planning call.
    pub response_id: String,
}

/// Research goal plus the queries that should reach it.
///
/// Deserializes from exactly `{"goal": "...", "queries": ["..."]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResearchPlan {
    pub goal: String,
    pub queries: Vec<String>,
}

/// Output of the planning step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedResearch {
    pub plan: ResearchPlan,
    /// Provider response id, used to chain the expansion call.
    pub response_id: String,
}

/// Result of one web search.
///
/// When the provider output had an unexpected shape `resp_id` is `None` and
/// `research_output` holds an `Error: Unexpected response format: ...`
/// diagnostic. Such results are kept so every query has exactly one result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    pub resp_id: Option<String>,
    pub research_output: String,
}

impl SearchResult {
    pub fn is_error(&self) -> bool {
        self.resp_id.is_none()
    }
}

/// Append-only, ordered list of search results.
///
/// Entries are never removed, reordered or deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectedResults(Vec<SearchResult>);

impl CollectedResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: SearchResult) {
        self.0.push(result);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchResult> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[SearchResult] {
        &self.0
    }

    /// JSON array of `{query, resp_id, research_output}` objects, as handed to
    /// the model.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }
}

impl Extend<SearchResult> for CollectedResults {
    fn extend<I: IntoIterator<Item = SearchResult>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a CollectedResults {
    type Item = &'a SearchResult;
    type IntoIter = std::slice::Iter<'a, SearchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Every question needs a non-empty answer before planning can start.
pub fn validate_answers(questions: &[String], answers: &[String]) -> Result<()> {
    let missing = answers.iter().filter(|a| a.trim().is_empty()).count()
        + questions.len().saturating_sub(answers.len());

    if answers.len() != questions.len() || missing > 0 {
        return Err(ResearchError::Answers {
            expected: questions.len(),
            provided: answers.len(),
            missing,
        });
    }
    Ok(())
}
