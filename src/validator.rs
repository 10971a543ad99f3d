//! Answer-shape validation
//!
//! Checks that a final answer looks like what its route should produce.
//! Pure and stateless.

use crate::models::Route;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SOLVED_FOR_X: Regex = Regex::new(r"x\s*(=|∈)").unwrap();
}

const OPTIMIZATION_MARKERS: &[&str] = &["k =", "minimum", "maximum"];
const SOLVED_MARKERS: &[&str] = &["x =", "k ="];

pub struct AnswerValidator;

impl AnswerValidator {
    pub fn validate(route: Route, final_answer: &str) -> bool {
        if final_answer.is_empty() {
            return false;
        }

        let answer = final_answer.to_lowercase();
        match route {
            Route::QuadraticEquation => SOLVED_FOR_X.is_match(&answer),
            Route::QuadraticOptimization => OPTIMIZATION_MARKERS
                .iter()
                .any(|marker| answer.contains(marker)),
            Route::ExpressionAnalysis => !SOLVED_MARKERS
                .iter()
                .any(|marker| answer.contains(marker)),
            Route::Unknown => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equation_answers() {
        assert!(AnswerValidator::validate(Route::QuadraticEquation, "x = -2, 2"));
        assert!(AnswerValidator::validate(Route::QuadraticEquation, "X=3"));
        assert!(AnswerValidator::validate(Route::QuadraticEquation, "x ∈ {}"));
        assert!(!AnswerValidator::validate(Route::QuadraticEquation, "No real solutions."));
        assert!(!AnswerValidator::validate(Route::QuadraticEquation, ""));
    }

    #[test]
    fn test_optimization_answers() {
        assert!(AnswerValidator::validate(Route::QuadraticOptimization, "k = 4"));
        assert!(AnswerValidator::validate(Route::QuadraticOptimization, "maximum is 4"));
        assert!(!AnswerValidator::validate(Route::QuadraticOptimization, "Extremum value = 4"));
    }

    #[test]
    fn test_case_is_ignored_on_every_route() {
        assert!(AnswerValidator::validate(Route::QuadraticEquation, "X = 3"));
        assert!(AnswerValidator::validate(Route::QuadraticOptimization, "Minimum value is 3"));
        assert!(AnswerValidator::validate(Route::QuadraticOptimization, "K = -4"));
        assert!(!AnswerValidator::validate(Route::ExpressionAnalysis, "X = 3"));
        assert!(!AnswerValidator::validate(Route::ExpressionAnalysis, "K = 1"));
        assert!(AnswerValidator::validate(Route::ExpressionAnalysis, "Factored form: X**2 + 1"));
    }

    #[test]
    fn test_expression_answers() {
        assert!(AnswerValidator::validate(
            Route::ExpressionAnalysis,
            "Factored form: (x-2)*(x-3)"
        ));
        assert!(!AnswerValidator::validate(Route::ExpressionAnalysis, "x = 3"));
        assert!(!AnswerValidator::validate(Route::ExpressionAnalysis, "k = 1"));
    }

    #[test]
    fn test_unknown_route_never_validates() {
        assert!(!AnswerValidator::validate(Route::Unknown, "Unsupported problem type."));
        assert!(!AnswerValidator::validate(Route::Unknown, "x = 1"));
    }

    #[test]
    fn test_validation_is_repeatable() {
        let answer = "x = 2, 3";
        let first = AnswerValidator::validate(Route::QuadraticEquation, answer);
        let second = AnswerValidator::validate(Route::QuadraticEquation, answer);
        assert_eq!(first, second);
    }
}
