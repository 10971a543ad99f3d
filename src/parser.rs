//! Parser agent
//!
//! Turns confirmed extraction text into a [`StructuredProblem`]:
//! - cleans the text into the canonical form used by every later stage
//! - detects the topic from keyword sets (first match wins)
//! - extracts single-letter variables and the two supported constraints
//! - asks for human review when the statement looks ambiguous

use crate::models::{Gate, ParserInput, ReviewStage, StructuredProblem, Topic};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::{debug, warn};

const CALCULUS_KEYWORDS: &[&str] = &["integral", "derivative", "limit"];
const LINEAR_ALGEBRA_KEYWORDS: &[&str] = &["matrix", "determinant", "eigen"];
const PROBABILITY_KEYWORDS: &[&str] = &["probability", "dice", "coin", "random"];

/// Topic rules, checked top to bottom; algebra when none match
const TOPIC_RULES: &[(&[&str], Topic)] = &[
    (CALCULUS_KEYWORDS, Topic::Calculus),
    (LINEAR_ALGEBRA_KEYWORDS, Topic::LinearAlgebra),
    (PROBABILITY_KEYWORDS, Topic::Probability),
];

/// Hedge words in report order
const HEDGE_WORDS: &[&str] = &["something", "approx", "around", "etc"];

const MIN_PROBLEM_CHARS: usize = 10;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref SINGLE_LETTER: Regex = Regex::new(r"\b[a-zA-Z]\b").unwrap();
}

/// Parser agent (stateless)
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserAgent;

impl ParserAgent {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, input: &ParserInput) -> Gate<StructuredProblem> {
        let text = clean_text(&input.extracted_text);

        if let Some(reason) = detect_ambiguity(&text) {
            warn!(reason = %reason, "Parser: statement needs clarification");
            return Gate::needs_human(ReviewStage::Parser, reason);
        }

        let problem = StructuredProblem {
            topic: detect_topic(&text),
            variables: extract_variables(&text),
            constraints: extract_constraints(&text),
            problem_text: text,
            needs_clarification: false,
            clarification_reason: None,
        };

        debug!(
            topic = %problem.topic,
            variables = ?problem.variables,
            constraints = ?problem.constraints,
            "Parser: structured problem built"
        );

        Gate::Proceed(problem)
    }
}

/// Canonical cleaned form: ASCII operators, single spaces, trimmed
pub fn clean_text(text: &str) -> String {
    let text = text.replace('÷', "/").replace('×', "*");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

pub fn detect_topic(text: &str) -> Topic {
    let lowered = text.to_lowercase();

    TOPIC_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(_, topic)| *topic)
        .unwrap_or(Topic::Algebra)
}

/// Sorted, deduplicated single-letter tokens
pub fn extract_variables(text: &str) -> Vec<String> {
    SINGLE_LETTER
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn extract_constraints(text: &str) -> Vec<String> {
    let mut constraints = Vec::new();

    if text.contains("x > 0") {
        constraints.push("x > 0".to_string());
    }
    if text.contains("x >= 0") || text.contains("x ≥ 0") {
        constraints.push("x >= 0".to_string());
    }

    constraints
}

/// Reason for review, if the statement is ambiguous
pub fn detect_ambiguity(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();

    if let Some(word) = HEDGE_WORDS.iter().find(|w| lowered.contains(**w)) {
        return Some(format!("Ambiguous phrase detected: '{}'", word));
    }

    if text.trim().chars().count() < MIN_PROBLEM_CHARS {
        return Some("Problem statement too short".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InputType, OriginalInput};

    fn confirmed(text: &str) -> ParserInput {
        ParserInput {
            input_type: InputType::Text,
            original_input: OriginalInput::Text(text.to_string()),
            extracted_text: text.to_string(),
            confidence: 1.0,
            user_confirmed: true,
        }
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  6 ÷ 2   ×\n x \t"), "6 / 2 * x");
    }

    #[test]
    fn test_topic_priority() {
        let cases = vec![
            ("find the derivative of the matrix", Topic::Calculus),
            ("Determinant of a random matrix", Topic::LinearAlgebra),
            ("Probability that a coin lands heads", Topic::Probability),
            ("Solve x^2 - 4 = 0", Topic::Algebra),
            ("LIMIT of x as x goes to 0", Topic::Calculus),
        ];

        for (text, topic) in cases {
            assert_eq!(detect_topic(text), topic, "{}", text);
        }
    }

    #[test]
    fn test_variables_are_single_letters_only() {
        let vars = extract_variables("f(x) = a*x^2 + b, where speed y and x");
        assert_eq!(vars, vec!["a", "b", "f", "x", "y"]);
    }

    #[test]
    fn test_constraints() {
        assert_eq!(extract_constraints("minimize x^2 for x > 0"), vec!["x > 0"]);
        assert_eq!(extract_constraints("x ≥ 0 and y = x"), vec!["x >= 0"]);
        assert!(extract_constraints("x < 0").is_empty());
    }

    #[test]
    fn test_hedge_words_need_human() {
        for word in HEDGE_WORDS {
            let text = format!("solve x^2 + 2x + 1 = 0 {} please", word);
            let gate = ParserAgent::new().parse(&confirmed(&text));
            let review = gate.review().expect("hedge word must need review");
            assert_eq!(review.stage, ReviewStage::Parser);
            assert!(review.reason.contains(word));
        }
    }

    #[test]
    fn test_first_hedge_word_in_list_order_is_reported() {
        let reason = detect_ambiguity("around something like x^2 etc").unwrap();
        assert_eq!(reason, "Ambiguous phrase detected: 'something'");
    }

    #[test]
    fn test_short_statement_needs_human() {
        let gate = ParserAgent::new().parse(&confirmed("x = 2"));
        assert_eq!(gate.review().unwrap().reason, "Problem statement too short");
    }

    #[test]
    fn test_parse_success() {
        let gate = ParserAgent::new().parse(&confirmed("Solve   x^2 - 4 = 0"));
        let problem = gate.into_proceed().unwrap();
        assert_eq!(problem.problem_text, "Solve x^2 - 4 = 0");
        assert_eq!(problem.topic, Topic::Algebra);
        assert_eq!(problem.variables, vec!["x"]);
        assert!(!problem.needs_clarification);
        assert!(problem.clarification_reason.is_none());
    }

    #[test]
    fn test_something_in_function_definition() {
        let gate = ParserAgent::new().parse(&confirmed("f(x) = x^2 + 2x + something"));
        assert!(gate.review().unwrap().reason.contains("something"));
    }
}
