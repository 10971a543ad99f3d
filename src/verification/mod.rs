//! Verification engine for solver output
//!
//! Conservative: rules only reject unambiguous failure signatures and never
//! try to re-derive the answer. Rules run in order; the first failing rule
//! decides the reason.

use crate::models::{Solution, StructuredProblem, VerificationResult};
use tracing::{debug, info};

/// Trait for verification rules
pub trait VerificationRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Some(reason)` when the solution is rejected
    fn check(&self, problem: &StructuredProblem, solution: &Solution) -> Option<String>;
}

/// Verification engine that enforces rules
pub struct VerificationEngine {
    rules: Vec<Box<dyn VerificationRule>>,
}

impl VerificationEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: Box<dyn VerificationRule>) {
        self.rules.push(rule);
    }

    pub fn verify(&self, problem: &StructuredProblem, solution: &Solution) -> VerificationResult {
        for rule in &self.rules {
            if let Some(reason) = rule.check(problem, solution) {
                info!(rule = rule.name(), reason = %reason, "Verification rejected solution");
                return VerificationResult::invalid(reason);
            }
            debug!(rule = rule.name(), "Verification rule passed");
        }

        info!(rule_count = self.rules.len(), "Verification passed");
        VerificationResult::valid()
    }
}

impl Default for VerificationEngine {
    fn default() -> Self {
        Self::new()
    }
}

//
// ========== Verification Rules ==========
//

/// Rule: the final answer must not be empty
pub struct NonEmptyAnswerRule;

impl VerificationRule for NonEmptyAnswerRule {
    fn name(&self) -> &'static str {
        "non_empty_answer"
    }

    fn check(&self, _problem: &StructuredProblem, solution: &Solution) -> Option<String> {
        if solution.final_answer.trim().is_empty() {
            Some("Empty solution.".to_string())
        } else {
            None
        }
    }
}

/// Rule: the solver must not have flagged its own answer format
pub struct AnswerFormatRule;

impl VerificationRule for AnswerFormatRule {
    fn name(&self) -> &'static str {
        "answer_format"
    }

    fn check(&self, _problem: &StructuredProblem, solution: &Solution) -> Option<String> {
        if solution
            .final_answer
            .to_lowercase()
            .contains("invalid answer format")
        {
            Some("Solver produced an answer inconsistent with problem intent.".to_string())
        } else {
            None
        }
    }
}

/// Rule: "Could not ..." answers are computation failures
pub struct ComputationFailureRule;

impl VerificationRule for ComputationFailureRule {
    fn name(&self) -> &'static str {
        "computation_failure"
    }

    fn check(&self, _problem: &StructuredProblem, solution: &Solution) -> Option<String> {
        if solution.final_answer.to_lowercase().contains("could not") {
            Some("Solver failed to compute solution.".to_string())
        } else {
            None
        }
    }
}

/// Create a default verification engine with standard rules
pub fn create_default_verification_engine() -> VerificationEngine {
    let mut engine = VerificationEngine::new();
    engine.add_rule(Box::new(NonEmptyAnswerRule));
    engine.add_rule(Box::new(AnswerFormatRule));
    engine.add_rule(Box::new(ComputationFailureRule));
    engine
}

//
// ================= Tests =================
//
