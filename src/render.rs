//! Markdown rendering of a finished research session.
//!
//! Layout: topic heading, goal, the queries that were searched, the
//! clarifying questions with their answers, then the report itself.

use std::fmt::Write;

use crate::research::ResearchSession;

/// Render the Q&A summary and the final report as one markdown document.
///
/// Sections whose data is missing (no plan yet, no report yet) are skipped.
pub fn render_markdown(session: &ResearchSession) -> String {
    let mut out = String::new();

    if let Some(topic) = session.topic() {
        let _ = writeln!(out, "# Research Topic: {}\n", topic);
    }

    if let Some(plan) = session.plan() {
        let _ = writeln!(out, "**Research Goal:** {}\n", plan.goal);
        out.push_str("### Web Search Queries\n\n");
        for query in &plan.queries {
            let _ = writeln!(out, "- {}", query);
        }
        out.push('\n');
    }

    if !session.questions().is_empty() {
        out.push_str("### Clarifying Questions and Answers\n\n");
        for (i, (question, answer)) in session.questions().iter().zip(session.answers()).enumerate() {
            // Two trailing spaces force a markdown line break.
            let _ = writeln!(out, "**Q{}: {}**  ", i + 1, question);
            let _ = writeln!(out, "**A{}:** {}\n", i + 1, answer);
        }
    }

    if let Some(report) = session.report() {
        out.push_str("### Final Research Report\n\n");
        out.push_str(report.trim_end());
        out.push('\n');
    }

    out
}
