//! # Research Pipeline
//!
//! Drives the individual steps of a [`Researcher`] against a
//! [`ResearchSession`], reporting progress through a [`ResearchObserver`].
//!
//! Execution is strictly sequential: each provider call is awaited before the
//! next one starts.

use tracing::{info, warn};

use super::session::{ResearchSession, SessionPhase};
use super::types::{ResearchPlan, SearchResult};
use super::Researcher;
use crate::config::Config;
use crate::error::{ResearchError, Result};
use crate::gateway::ResponsesApi;

// =============================================================================
// OBSERVER
// =============================================================================

/// Progress callbacks for a presentation layer. Every method defaults to a
/// no-op.
///
/// Search indices are 1-based and `total` is the size of the current round
/// (initial or expansion).
pub trait ResearchObserver: Send + Sync {
    fn questions_ready(&self, _questions: &[String]) {}

    fn plan_ready(&self, _plan: &ResearchPlan) {}

    fn search_started(&self, _index: usize, _total: usize, _query: &str) {}

    fn search_finished(&self, _index: usize, _total: usize, _result: &SearchResult) {}

    fn coverage_evaluated(&self, _sufficient: bool) {}

    fn expansion_ready(&self, _queries: &[String]) {}

    fn report_ready(&self, _report: &str) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ResearchObserver for NoopObserver {}

// =============================================================================
// PIPELINE
// =============================================================================

pub struct ResearchPipeline<G> {
    researcher: Researcher<G>,
    observer: Box<dyn ResearchObserver>,
}

impl<G: ResponsesApi> ResearchPipeline<G> {
    pub fn new(researcher: Researcher<G>) -> Self {
        Self {
            researcher,
            observer: Box::new(NoopObserver),
        }
    }

    pub fn from_config(gateway: G, config: &Config) -> Self {
        Self::new(Researcher::from_config(gateway, config))
    }

    pub fn with_observer(mut self, observer: impl ResearchObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn researcher(&self) -> &Researcher<G> {
        &self.researcher
    }

    /// Submit `topic` and fetch clarifying questions.
    ///
    /// An empty topic is rejected without touching the session.
    pub async fn clarify(&self, session: &mut ResearchSession, topic: &str) -> Result<()> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ResearchError::EmptyTopic);
        }
        session.set_topic(topic)?;

        let result = self.researcher.clarify(topic).await;
        let clarification = fail_on_fatal(session, result)?;

        self.observer.questions_ready(&clarification.questions);
        session.record_clarification(clarification)
    }

    /// Record the user's answers and derive the research plan.
    ///
    /// Missing answers leave the session in [`SessionPhase::Clarified`].
    pub async fn plan(&self, session: &mut ResearchSession, answers: Vec<String>) -> Result<()> {
        session.ensure_can_advance(SessionPhase::Planned)?;
        let (topic, clarification) = match (session.topic(), session.clarification()) {
            (Some(topic), Some(clarification)) => (topic.to_string(), clarification.clone()),
            _ => {
                return Err(ResearchError::InvalidTransition {
                    from: session.phase(),
                    to: SessionPhase::Planned,
                })
            }
        };

        let result = self.researcher.plan(&topic, &clarification, &answers).await;
        let planned = fail_on_fatal(session, result)?;

        self.observer.plan_ready(&planned.plan);
        session.record_plan(answers, planned)
    }

    /// Search, evaluate, expand at most once, then write the report.
    pub async fn research(&self, session: &mut ResearchSession) -> Result<String> {
        session.ensure_can_advance(SessionPhase::Searching)?;
        let plan = match session.plan() {
            Some(plan) => plan.clone(),
            None => {
                return Err(ResearchError::InvalidTransition {
                    from: session.phase(),
                    to: SessionPhase::Searching,
                })
            }
        };
        let plan_response_id = session.plan_response_id().map(str::to_string);

        session.begin_search()?;
        self.search_round(session, &plan.queries).await?;

        let result = self.researcher.evaluate(session.collected(), &plan.goal).await;
        let sufficient = fail_on_fatal(session, result)?;
        self.observer.coverage_evaluated(sufficient);
        session.record_coverage(sufficient)?;

        if !sufficient {
            info!("Coverage insufficient; expanding search once");
            let result = self
                .researcher
                .expand(session.collected(), &plan.goal, plan_response_id.as_deref())
                .await;
            let more = fail_on_fatal(session, result)?;

            self.observer.expansion_ready(&more);
            session.record_expansion(more.clone())?;
            self.search_round(session, &more).await?;
        }

        let result = self
            .researcher
            .write_report(session.collected(), &plan.goal)
            .await;
        let report = fail_on_fatal(session, result)?;

        self.observer.report_ready(&report);
        session.record_report(report.clone())?;
        Ok(report)
    }

    async fn search_round(&self, session: &mut ResearchSession, queries: &[String]) -> Result<()> {
        let total = queries.len();
        for (i, query) in queries.iter().enumerate() {
            self.observer.search_started(i + 1, total, query);

            let result = self.researcher.search(query).await;
            let result = fail_on_fatal(session, result)?;

            self.observer.search_finished(i + 1, total, &result);
            session.push_result(result)?;
        }
        Ok(())
    }
}

/// Move the session to `Failed` when a step returns a fatal error.
fn fail_on_fatal<T>(session: &mut ResearchSession, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        if e.is_fatal() {
            warn!(error = %e, phase = ?session.phase(), "Research session failed");
            session.fail();
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::scripted::{input_text, message_response, search_response, ScriptedGateway};
    use crate::gateway::ResponseRequest;
    use std::sync::{Arc, Mutex};

    const QUESTIONS: &str = "1. Which region?\n\n2. Which period?\n";
    const PLAN: &str = r#"{"goal": "Assess EV adoption drivers 2020-2024", "queries": ["EV sales statistics 2024", "EV charging infrastructure growth", "EV incentives by country", "EV battery cost trends", "consumer attitudes to EVs"]}"#;
    const MORE: &str = r#"["EV resale values", "EV insurance costs", "EV sales statistics 2024", "grid capacity for EVs", "EV fleet adoption"]"#;

    /// Route each request by the marker its prompt carries.
    fn scripted(coverage: &'static str) -> ScriptedGateway {
        ScriptedGateway::new(move |request: &ResponseRequest| {
            let input = input_text(request);
            if input.contains("clarifying questions") {
                Ok(message_response("resp_clarify", QUESTIONS))
            } else if input.contains("goal sentence") {
                Ok(message_response("resp_plan", PLAN))
            } else if let Some(query) = input.strip_prefix("search: ") {
                Ok(search_response(&format!("resp_{}", query.len()), &format!("found: {}", query)))
            } else if input.contains("Answer Yes or No only") {
                Ok(message_response("resp_eval", coverage))
            } else if input.contains("other web searches") {
                Ok(message_response("resp_more", MORE))
            } else if input.contains("Write a complete and detailed report") {
                Ok(message_response("resp_report", "EVs grew [1].\n\n[1] https://iea.org"))
            } else {
                Err(GatewayError::Api {
                    status: 400,
                    body: format!("unexpected request: {}", input),
                })
            }
        })
    }

    #[derive(Default, Clone)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }

        fn push(&self, event: String) {
            self.0.lock().unwrap().push(event);
        }
    }

    impl ResearchObserver for Recorder {
        fn questions_ready(&self, questions: &[String]) {
            self.push(format!("questions:{}", questions.len()));
        }

        fn search_finished(&self, index: usize, total: usize, _result: &SearchResult) {
            self.push(format!("search:{}/{}", index, total));
        }

        fn coverage_evaluated(&self, sufficient: bool) {
            self.push(format!("coverage:{}", sufficient));
        }

        fn expansion_ready(&self, queries: &[String]) {
            self.push(format!("expansion:{}", queries.len()));
        }

        fn report_ready(&self, _report: &str) {
            self.push("report".to_string());
        }
    }

    fn pipeline(coverage: &'static str, recorder: &Recorder) -> ResearchPipeline<ScriptedGateway> {
        ResearchPipeline::from_config(scripted(coverage), &Config::default())
            .with_observer(recorder.clone())
    }

    fn answers() -> Vec<String> {
        vec!["Global".into(), "2020-2024".into()]
    }

    #[tokio::test]
    async fn test_sufficient_coverage_skips_expansion() {
        let recorder = Recorder::default();
        let pipeline = pipeline("Yes, fully covered.", &recorder);
        let mut session = ResearchSession::new();

        pipeline.clarify(&mut session, "  EV adoption ").await.unwrap();
        assert_eq!(session.topic(), Some("EV adoption"));
        assert_eq!(session.questions(), ["1. Which region?", "2. Which period?"]);

        pipeline.plan(&mut session, answers()).await.unwrap();
        let report = pipeline.research(&mut session).await.unwrap();

        assert_eq!(report, "EVs grew [1].\n\n[1] https://iea.org");
        assert_eq!(session.phase(), SessionPhase::ReportWritten);
        assert_eq!(session.collected().len(), 5);
        assert!(session.expansion_queries().is_empty());

        let events = recorder.events();
        assert_eq!(events.first().map(String::as_str), Some("questions:2"));
        assert!(events.contains(&"search:5/5".to_string()));
        assert!(!events.iter().any(|e| e.starts_with("expansion")));
        assert_eq!(events.last().map(String::as_str), Some("report"));

        // clarify + plan + 5 searches + evaluate + report
        assert_eq!(pipeline.researcher().gateway().call_count(), 9);
    }

    #[tokio::test]
    async fn test_insufficient_coverage_expands_exactly_once() {
        let recorder = Recorder::default();
        let pipeline = pipeline("No, missing charging data", &recorder);
        let mut session = ResearchSession::new();

        pipeline.clarify(&mut session, "EV adoption").await.unwrap();
        pipeline.plan(&mut session, answers()).await.unwrap();
        pipeline.research(&mut session).await.unwrap();

        assert_eq!(session.phase(), SessionPhase::ReportWritten);
        assert_eq!(session.coverage(), Some(false));

        let queries: Vec<_> = session.collected().iter().map(|r| r.query.as_str()).collect();
        assert_eq!(
            queries,
            vec![
                "EV sales statistics 2024",
                "EV charging infrastructure growth",
                "EV incentives by country",
                "EV battery cost trends",
                "consumer attitudes to EVs",
                "EV resale values",
                "EV insurance costs",
                "EV sales statistics 2024",
                "grid capacity for EVs",
                "EV fleet adoption",
            ]
        );
        assert_eq!(session.plan().unwrap().queries, queries);

        let requests = pipeline.researcher().gateway().requests();
        let expansions: Vec<_> = requests
            .iter()
            .filter(|r| input_text(r).contains("other web searches"))
            .collect();
        assert_eq!(expansions.len(), 1);
        assert_eq!(expansions[0].previous_response_id.as_deref(), Some("resp_plan"));

        let evaluations = requests
            .iter()
            .filter(|r| input_text(r).contains("Answer Yes or No only"))
            .count();
        assert_eq!(evaluations, 1);

        let events = recorder.events();
        assert!(events.contains(&"expansion:5".to_string()));
        assert_eq!(events.iter().filter(|e| *e == "search:5/5").count(), 2);
    }

    #[tokio::test]
    async fn test_missing_answers_keep_session_clarified() {
        let recorder = Recorder::default();
        let pipeline = pipeline("Yes", &recorder);
        let mut session = ResearchSession::new();
        pipeline.clarify(&mut session, "EV adoption").await.unwrap();

        let err = pipeline
            .plan(&mut session, vec!["Global".into(), "".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, ResearchError::Answers { .. }));
        assert_eq!(session.phase(), SessionPhase::Clarified);

        pipeline.plan(&mut session, answers()).await.unwrap();
        assert_eq!(session.phase(), SessionPhase::Planned);
        assert_eq!(session.answers(), answers().as_slice());
    }

    #[tokio::test]
    async fn test_empty_topic_is_rejected() {
        let pipeline = pipeline("Yes", &Recorder::default());
        let mut session = ResearchSession::new();

        let err = pipeline.clarify(&mut session, "   ").await.unwrap_err();
        assert!(matches!(err, ResearchError::EmptyTopic));
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert_eq!(pipeline.researcher().gateway().call_count(), 0);
    }

    #[tokio::test]
    async fn test_research_before_planning_is_rejected() {
        let pipeline = pipeline("Yes", &Recorder::default());
        let mut session = ResearchSession::new();

        let err = pipeline.research(&mut session).await.unwrap_err();
        assert!(matches!(err, ResearchError::InvalidTransition { .. }));
        assert_eq!(session.phase(), SessionPhase::Empty);
    }

    #[tokio::test]
    async fn test_fatal_plan_error_fails_session() {
        let gateway = ScriptedGateway::new(|request: &ResponseRequest| {
            if input_text(request).contains("clarifying questions") {
                Ok(message_response("resp_clarify", QUESTIONS))
            } else {
                Ok(message_response("resp_plan", "Sure! Here is a plan: ..."))
            }
        });
        let pipeline = ResearchPipeline::from_config(gateway, &Config::default());
        let mut session = ResearchSession::new();

        pipeline.clarify(&mut session, "EV adoption").await.unwrap();
        let err = pipeline.plan(&mut session, answers()).await.unwrap_err();

        assert!(matches!(err, ResearchError::PlanFormat(_)));
        assert_eq!(session.phase(), SessionPhase::Failed);
        assert!(pipeline.research(&mut session).await.is_err());
    }

    #[tokio::test]
    async fn test_search_transport_error_fails_session() {
        let gateway = ScriptedGateway::new(|request: &ResponseRequest| {
            let input = input_text(request);
            if input.contains("clarifying questions") {
                Ok(message_response("resp_clarify", QUESTIONS))
            } else if input.contains("goal sentence") {
                Ok(message_response("resp_plan", PLAN))
            } else {
                Err(GatewayError::Unauthorized)
            }
        });
        let pipeline = ResearchPipeline::from_config(gateway, &Config::default());
        let mut session = ResearchSession::new();

        pipeline.clarify(&mut session, "EV adoption").await.unwrap();
        pipeline.plan(&mut session, answers()).await.unwrap();
        let err = pipeline.research(&mut session).await.unwrap_err();

        assert!(matches!(err, ResearchError::Gateway(GatewayError::Unauthorized)));
        assert_eq!(session.phase(), SessionPhase::Failed);
        assert!(session.collected().is_empty());
    }
}
