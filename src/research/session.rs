//! # Research Session
//!
//! Explicit state for one guided research run. Every mutation goes through a
//! validated phase transition, so steps cannot run out of order:
//!
//! ```text
//! Empty → TopicSet → Clarified → Planned → Searching ─┬─▶ Evaluated ─────────────────────────┬─▶ ReportWritten
//!                                                     └─▶ EvaluatedInsufficient → ExpandedSearching ┘
//! ```
//!
//! Any fatal step error moves the session to [`SessionPhase::Failed`]. No
//! phase is revisited; starting over means building a new session.

use serde::{Deserialize, Serialize};

use super::types::{Clarification, CollectedResults, PlannedResearch, ResearchPlan, SearchResult};
use crate::error::{ResearchError, Result};

/// Where a [`ResearchSession`] currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Nothing submitted yet
    #[default]
    Empty,
    /// Topic accepted, clarifying questions requested
    TopicSet,
    /// Questions available, waiting for answers
    Clarified,
    /// Goal and queries derived
    Planned,
    /// Initial search round in progress
    Searching,
    /// Coverage judged sufficient
    Evaluated,
    /// Coverage judged insufficient, expansion pending
    EvaluatedInsufficient,
    /// Expansion search round in progress
    ExpandedSearching,
    /// Final report available
    ReportWritten,
    /// A fatal step error ended the session
    Failed,
}

impl SessionPhase {
    /// Whether `self → to` is a legal transition.
    pub fn can_advance_to(self, to: SessionPhase) -> bool {
        use SessionPhase::*;

        if to == Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, to),
            (Empty, TopicSet)
                | (TopicSet, Clarified)
                | (Clarified, Planned)
                | (Planned, Searching)
                | (Searching, Evaluated)
                | (Searching, EvaluatedInsufficient)
                | (EvaluatedInsufficient, ExpandedSearching)
                | (Evaluated, ReportWritten)
                | (ExpandedSearching, ReportWritten)
        )
    }

    /// Check if this is a terminal phase
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::ReportWritten | Self::Failed)
    }

    /// Phases in which search results may be appended.
    pub fn is_searching(self) -> bool {
        matches!(self, Self::Searching | Self::ExpandedSearching)
    }
}

/// All state owned by one research run.
#[derive(Debug, Clone, Default)]
pub struct ResearchSession {
    phase: SessionPhase,
    topic: Option<String>,
    clarification: Option<Clarification>,
    answers: Vec<String>,
    planned: Option<PlannedResearch>,
    collected: CollectedResults,
    sufficient: Option<bool>,
    expansion: Vec<String>,
    report: Option<String>,
}

impl ResearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Clarifying questions, empty until the session is clarified.
    pub fn questions(&self) -> &[String] {
        self.clarification
            .as_ref()
            .map(|c| c.questions.as_slice())
            .unwrap_or(&[])
    }

    pub fn clarification(&self) -> Option<&Clarification> {
        self.clarification.as_ref()
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// Goal and queries. After an expansion round, `queries` also holds the
    /// expansion queries in the order they were searched.
    pub fn plan(&self) -> Option<&ResearchPlan> {
        self.planned.as_ref().map(|p| &p.plan)
    }

    pub fn plan_response_id(&self) -> Option<&str> {
        self.planned.as_ref().map(|p| p.response_id.as_str())
    }

    pub fn collected(&self) -> &CollectedResults {
        &self.collected
    }

    /// Coverage verdict, once evaluated.
    pub fn coverage(&self) -> Option<bool> {
        self.sufficient
    }

    /// Queries added by the expansion round, if one ran.
    pub fn expansion_queries(&self) -> &[String] {
        &self.expansion
    }

    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    /// `Ok(())` if the session may move to `to`.
    pub fn ensure_can_advance(&self, to: SessionPhase) -> Result<()> {
        if self.phase.can_advance_to(to) {
            Ok(())
        } else {
            Err(ResearchError::InvalidTransition {
                from: self.phase,
                to,
            })
        }
    }

    fn advance(&mut self, to: SessionPhase) -> Result<()> {
        self.ensure_can_advance(to)?;
        self.phase = to;
        Ok(())
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    pub(crate) fn set_topic(&mut self, topic: &str) -> Result<()> {
        self.advance(SessionPhase::TopicSet)?;
        self.topic = Some(topic.to_string());
        Ok(())
    }

    pub(crate) fn record_clarification(&mut self, clarification: Clarification) -> Result<()> {
        self.advance(SessionPhase::Clarified)?;
        self.clarification = Some(clarification);
        Ok(())
    }

    pub(crate) fn record_plan(&mut self, answers: Vec<String>, planned: PlannedResearch) -> Result<()> {
        self.advance(SessionPhase::Planned)?;
        self.answers = answers;
        self.planned = Some(planned);
        Ok(())
    }

    pub(crate) fn begin_search(&mut self) -> Result<()> {
        self.advance(SessionPhase::Searching)
    }

    pub(crate) fn push_result(&mut self, result: SearchResult) -> Result<()> {
        if !self.phase.is_searching() {
            return Err(ResearchError::InvalidTransition {
                from: self.phase,
                to: SessionPhase::Searching,
            });
        }
        self.collected.push(result);
        Ok(())
    }

    pub(crate) fn record_coverage(&mut self, sufficient: bool) -> Result<()> {
        let to = if sufficient {
            SessionPhase::Evaluated
        } else {
            SessionPhase::EvaluatedInsufficient
        };
        self.advance(to)?;
        self.sufficient = Some(sufficient);
        Ok(())
    }

    pub(crate) fn record_expansion(&mut self, queries: Vec<String>) -> Result<()> {
        self.advance(SessionPhase::ExpandedSearching)?;
        if let Some(planned) = self.planned.as_mut() {
            planned.plan.queries.extend(queries.iter().cloned());
        }
        self.expansion = queries;
        Ok(())
    }

    pub(crate) fn record_report(&mut self, report: String) -> Result<()> {
        self.advance(SessionPhase::ReportWritten)?;
        self.report = Some(report);
        Ok(())
    }

    /// Mark the session failed. Terminal sessions are left alone.
    pub(crate) fn fail(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = SessionPhase::Failed;
        }
    }
}
