//! Core data models for the math mentor pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::PipelineError;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Image,
    Audio,
    Text,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Calculus,
    LinearAlgebra,
    Probability,
    Algebra,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    QuadraticEquation,
    QuadraticOptimization,
    ExpressionAnalysis,
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserFeedback {
    #[default]
    Unknown,
    Correct,
    Incorrect,
}

/// Pipeline stage that asked for human review
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStage {
    ConfidenceGate,
    Parser,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.9 {
            ConfidenceBand::High
        } else if confidence >= 0.75 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

//
// ================= Human-in-the-loop =================
//

/// Why the pipeline stopped for a human
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HumanReview {
    pub stage: ReviewStage,
    /// User-facing; surfaced verbatim
    pub reason: String,
}

/// Outcome of a stage that may need a human before going further
#[derive(Debug, Clone, PartialEq)]
pub enum Gate<T> {
    Proceed(T),
    NeedsHuman(HumanReview),
}

impl<T> Gate<T> {
    pub fn needs_human(stage: ReviewStage, reason: impl Into<String>) -> Self {
        Gate::NeedsHuman(HumanReview {
            stage,
            reason: reason.into(),
        })
    }

    pub fn is_proceed(&self) -> bool {
        matches!(self, Gate::Proceed(_))
    }

    pub fn review(&self) -> Option<&HumanReview> {
        match self {
            Gate::Proceed(_) => None,
            Gate::NeedsHuman(review) => Some(review),
        }
    }

    pub fn into_proceed(self) -> Option<T> {
        match self {
            Gate::Proceed(value) => Some(value),
            Gate::NeedsHuman(_) => None,
        }
    }
}

//
// ================= Parser Input =================
//

/// What the extraction collaborator was given
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum OriginalInput {
    Text(String),
    File(PathBuf),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParserInput {
    pub input_type: InputType,
    pub original_input: OriginalInput,
    pub extracted_text: String,
    pub confidence: f64,
    pub user_confirmed: bool,
}

//
// ================= Structured Problem =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructuredProblem {
    pub problem_text: String,
    pub topic: Topic,
    pub variables: Vec<String>,
    pub constraints: Vec<String>,
    pub needs_clarification: bool,
    pub clarification_reason: Option<String>,
}

//
// ================= Solution =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Solution {
    pub final_answer: String,
    pub steps: Vec<String>,
    pub used_context: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Solution {
    pub fn answered(final_answer: impl Into<String>, steps: Vec<String>, context: &[String]) -> Self {
        Self {
            final_answer: final_answer.into(),
            steps,
            used_context: context.to_vec(),
            error: None,
        }
    }

    /// A computation that failed; the answer text starts with "Could not"
    pub fn failed(
        final_answer: impl Into<String>,
        detail: impl Into<String>,
        steps: Vec<String>,
        context: &[String],
    ) -> Self {
        Self {
            final_answer: final_answer.into(),
            steps,
            used_context: context.to_vec(),
            error: Some(detail.into()),
        }
    }
}

//
// ================= Verification =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationResult {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerificationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            reason: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason.into()),
        }
    }
}

//
// ================= Memory Record =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    pub problem_text: String,
    pub route: Route,
    pub final_answer: String,
    pub steps: Vec<String>,
    pub verified: bool,
    pub user_feedback: UserFeedback,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction: Option<String>,
}

impl MemoryRecord {
    /// Record written right after a verified solve
    pub fn verified(problem: &StructuredProblem, route: Route, solution: &Solution) -> Self {
        Self {
            problem_text: problem.problem_text.clone(),
            route,
            final_answer: solution.final_answer.clone(),
            steps: solution.steps.clone(),
            verified: true,
            user_feedback: UserFeedback::Unknown,
            correction: None,
        }
    }
}

//
// ================= Pipeline I/O =================
//

/// One user submission, as collected by the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub input_type: InputType,
    pub original_input: OriginalInput,
    pub extracted_text: String,
    pub confidence: f64,
    pub user_confirmed: bool,
    /// Reuse a similar remembered solution instead of solving again
    #[serde(default)]
    pub reuse_previous: bool,
}

impl Submission {
    /// Typed input; confidence is fixed at 1.0
    pub fn text(text: impl Into<String>, user_confirmed: bool) -> Self {
        let text = text.into();
        Self {
            input_type: InputType::Text,
            original_input: OriginalInput::Text(text.clone()),
            extracted_text: text,
            confidence: 1.0,
            user_confirmed,
            reuse_previous: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    NeedsHuman {
        review: HumanReview,
    },
    Unroutable {
        problem: StructuredProblem,
    },
    Recalled {
        problem: StructuredProblem,
        route: Route,
        record: MemoryRecord,
    },
    Rejected {
        problem: StructuredProblem,
        route: Route,
        solution: Solution,
        verification: VerificationResult,
    },
    Solved {
        problem: StructuredProblem,
        route: Route,
        solution: Solution,
        verification: VerificationResult,
        similar: Option<MemoryRecord>,
    },
}

impl PipelineOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineOutcome::NeedsHuman { .. } => "needs_human",
            PipelineOutcome::Unroutable { .. } => "unroutable",
            PipelineOutcome::Recalled { .. } => "recalled",
            PipelineOutcome::Rejected { .. } => "rejected",
            PipelineOutcome::Solved { .. } => "solved",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub confidence_band: ConfidenceBand,
    pub trace: Vec<String>,
    pub outcome: PipelineOutcome,
}

/// User verdict on a solved problem
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "feedback", rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Incorrect { correction: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub problem_text: String,
    pub route: Route,
    pub final_answer: String,
    pub steps: Vec<String>,
    #[serde(flatten)]
    pub verdict: Verdict,
}

//
// ================= Display / Parsing =================
//

impl FromStr for InputType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(InputType::Image),
            "audio" => Ok(InputType::Audio),
            "text" => Ok(InputType::Text),
            other => Err(PipelineError::InvalidInput(format!(
                "Invalid input_type '{}': expected image, audio or text",
                other
            ))),
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InputType::Image => "image",
            InputType::Audio => "audio",
            InputType::Text => "text",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Topic::Calculus => "calculus",
            Topic::LinearAlgebra => "linear_algebra",
            Topic::Probability => "probability",
            Topic::Algebra => "algebra",
        };
        write!(f, "{}", s)
    }
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::QuadraticEquation => "quadratic_equation",
            Route::QuadraticOptimization => "quadratic_optimization",
            Route::ExpressionAnalysis => "expression_analysis",
            Route::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Route {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quadratic_equation" => Ok(Route::QuadraticEquation),
            "quadratic_optimization" => Ok(Route::QuadraticOptimization),
            "expression_analysis" => Ok(Route::ExpressionAnalysis),
            "unknown" => Ok(Route::Unknown),
            other => Err(PipelineError::InvalidInput(format!("Unknown route '{}'", other))),
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfidenceBand::High => "High",
            ConfidenceBand::Medium => "Medium",
            ConfidenceBand::Low => "Low",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_serializes_snake_case() {
        let json = serde_json::to_string(&Route::QuadraticOptimization).unwrap();
        assert_eq!(json, "\"quadratic_optimization\"");
        assert_eq!("expression_analysis".parse::<Route>().unwrap(), Route::ExpressionAnalysis);
    }

    #[test]
    fn test_input_type_rejects_unknown() {
        assert!("video".parse::<InputType>().is_err());
        assert_eq!("audio".parse::<InputType>().unwrap(), InputType::Audio);
    }

    #[test]
    fn test_memory_record_omits_missing_correction() {
        let record = MemoryRecord {
            problem_text: "x^2 - 4 = 0".to_string(),
            route: Route::QuadraticEquation,
            final_answer: "x = -2, 2".to_string(),
            steps: vec![],
            verified: true,
            user_feedback: UserFeedback::Unknown,
            correction: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("correction").is_none());
        assert_eq!(value["user_feedback"], "unknown");
        assert_eq!(value["route"], "quadratic_equation");
    }

    #[test]
    fn test_confidence_bands() {
        assert_eq!(ConfidenceBand::from_confidence(0.95), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_confidence(0.75), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_confidence(0.5), ConfidenceBand::Low);
    }
}
