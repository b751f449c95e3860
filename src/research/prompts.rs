//! Prompt templates for each research step.
//!
//! Prompts are plain functions so tests can assert on exact wording. JSON
//! payloads (answers, questions, collected results) are embedded as compact
//! JSON strings.

use crate::gateway::InputMessage;

/// Prefix for the per-query web-search input.
pub const SEARCH_PREFIX: &str = "search: ";

/// Final user turn of the coverage evaluation.
pub const COVERAGE_QUESTION: &str =
    "Does this information fully satisfy the goal? Answer Yes or No only!";

/// Ask for `count` numbered clarifying questions about `topic`.
pub fn clarify(topic: &str, count: usize) -> String {
    format!(
        "\nAsk {count} numbered clarifying questions to the user about the topic: {topic}.\n\
         The goal of the questions is to understand the intended purpose of the research.\n\
         Reply only with the questions, one per line.\n"
    )
}

/// Ask for a goal sentence plus `count` queries as a JSON object.
pub fn plan(answers_json: &str, questions_json: &str, topic: &str, count: usize) -> String {
    format!(
        "\nUsing the user answers {answers_json} to questions {questions_json}, write a goal sentence \
         and {count} web search queries for the research about {topic}\n\
         Output: A json list of {count} web search queries and a goal sentence that will reach it\n\
         Format: {{\"goal\":\"...\", \"queries\":[\"q1\",.....]}}\n"
    )
}

pub fn search(query: &str) -> String {
    format!("{SEARCH_PREFIX}{query}")
}

/// Developer goal, collected data as the assistant turn, strict yes/no user turn.
pub fn coverage(goal: &str, collected_json: &str) -> Vec<InputMessage> {
    vec![
        InputMessage::developer(format!("Research goal: {goal}")),
        InputMessage::assistant(collected_json),
        InputMessage::user(COVERAGE_QUESTION),
    ]
}

/// Ask for `count` more queries as a bare JSON array.
pub fn expand(goal: &str, collected_json: &str, count: usize) -> Vec<InputMessage> {
    vec![
        InputMessage::assistant(format!("Current data: {collected_json}")),
        InputMessage::developer(format!(
            "Research goal: {goal}. write {count} other web searches to achieve the goal. \
             Reply only with a JSON array of strings: [\"q1\", ...]"
        )),
    ]
}

/// Ask for the final cited report.
pub fn report(goal: &str, collected_json: &str) -> Vec<InputMessage> {
    vec![
        InputMessage::developer(format!(
            "Write a complete and detailed report about research goal: {goal} \
             Cite sources inline using [n] and append a reference list mapping [n] to url"
        )),
        InputMessage::assistant(collected_json),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Role;

    #[test]
    fn test_clarify_prompt() {
        let prompt = clarify("electric vehicle adoption trends", 5);
        assert!(prompt.contains("Ask 5 numbered clarifying questions"));
        assert!(prompt.contains("topic: electric vehicle adoption trends."));
    }

    #[test]
    fn test_plan_prompt_embeds_format() {
        let prompt = plan(r#"["a"]"#, r#"["q?"]"#, "EVs", 5);
        assert!(prompt.contains(r#"Using the user answers ["a"] to questions ["q?"]"#));
        assert!(prompt.contains(r#"Format: {"goal":"...", "queries":["q1",.....]}"#));
    }

    #[test]
    fn test_search_input() {
        assert_eq!(search("EV sales statistics 2024"), "search: EV sales statistics 2024");
    }

    #[test]
    fn test_coverage_turn_order() {
        let turns = coverage("goal", "[]");
        let roles: Vec<Role> = turns.iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::Developer, Role::Assistant, Role::User]);
        assert_eq!(turns[0].content, "Research goal: goal");
        assert_eq!(turns[1].content, "[]");
        assert_eq!(turns[2].content, COVERAGE_QUESTION);
    }

    #[test]
    fn test_expand_and_report_turns() {
        let expand = expand("goal", "[]", 5);
        assert_eq!(expand[0].role, Role::Assistant);
        assert_eq!(expand[0].content, "Current data: []");
        assert!(expand[1].content.contains("write 5 other web searches"));

        let report = report("goal", "[]");
        assert_eq!(report[0].role, Role::Developer);
        assert!(report[0].content.contains("Cite sources inline using [n]"));
        assert_eq!(report[1].role, Role::Assistant);
    }
}
