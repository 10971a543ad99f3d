//! Polynomial equations in `x`

use super::{finish, SolvingStrategy, StrategyFailure};
use crate::math::{normalize_math_text, parse_polynomial, real_roots, MathError, Poly};
use crate::models::{Route, Solution, StructuredProblem};

const PARSE_FAILURE: &str = "Could not parse the equation.";
const SOLVE_FAILURE: &str = "Could not solve the equation.";
const NO_REAL_SOLUTIONS: &str = "No real solutions.";

pub struct EquationStrategy;

impl EquationStrategy {
    fn parse(text: &str, steps: &mut Vec<String>) -> Result<Poly, MathError> {
        let (lhs, rhs) = text
            .split_once('=')
            .ok_or_else(|| MathError::Parse("no '=' in equation".to_string()))?;
        let lhs = normalize_math_text(lhs);
        let rhs = normalize_math_text(rhs);
        steps.push(format!("Normalized equation: {} = {}", lhs, rhs));

        let difference = parse_polynomial(&lhs)?.checked_sub(&parse_polynomial(&rhs)?)?;
        steps.push(format!("Moved all terms to one side: {} = 0", difference));
        Ok(difference)
    }

    fn run(text: &str, steps: &mut Vec<String>) -> Result<String, StrategyFailure> {
        let difference =
            Self::parse(text, steps).map_err(|e| StrategyFailure::new(PARSE_FAILURE, e))?;

        let coeffs = difference.univariate('x').ok_or_else(|| {
            StrategyFailure::new(
                SOLVE_FAILURE,
                MathError::Unsolvable("equation has symbols other than x".to_string()),
            )
        })?;
        let roots = real_roots(&coeffs).map_err(|e| StrategyFailure::new(SOLVE_FAILURE, e))?;
        steps.push(format!("Solved for x: {} real solution(s)", roots.len()));

        if roots.is_empty() {
            return Ok(NO_REAL_SOLUTIONS.to_string());
        }
        let values: Vec<String> = roots.iter().map(ToString::to_string).collect();
        Ok(format!("x = {}", values.join(", ")))
    }
}

impl SolvingStrategy for EquationStrategy {
    fn name(&self) -> &'static str {
        "quadratic_equation"
    }

    fn route(&self) -> Route {
        Route::QuadraticEquation
    }

    fn solve(&self, problem: &StructuredProblem, context: &[String]) -> Solution {
        let mut steps = Vec::new();
        let outcome = Self::run(&problem.problem_text, &mut steps);
        finish(outcome, steps, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::tests::problem;

    fn solve(text: &str) -> Solution {
        EquationStrategy.solve(&problem(text), &[])
    }

    #[test]
    fn test_factorable_quadratic() {
        let solution = solve("x^2 - 5x + 6 = 0");
        assert_eq!(solution.final_answer, "x = 2, 3");
        assert!(solution.error.is_none());
        assert_eq!(solution.steps[0], "Normalized equation: x**2-5*x+6 = 0");
    }

    #[test]
    fn test_prose_around_equation() {
        assert_eq!(solve("Solve x^2 - 4 = 0").final_answer, "x = -2, 2");
        assert_eq!(solve("Solve 2x + 1 = 3x - 4.").final_answer, "x = 5");
        assert_eq!(solve("Find a root of x^2 - 4 = 0").final_answer, "x = -2, 2");
    }

    #[test]
    fn test_irrational_roots() {
        assert_eq!(
            solve("x^2 - 2 = 0").final_answer,
            "x = -sqrt(2), sqrt(2)"
        );
    }

    #[test]
    fn test_no_real_solutions() {
        let solution = solve("x^2 + 1 = 0");
        assert_eq!(solution.final_answer, "No real solutions.");
        assert!(solution.error.is_none());
        assert_eq!(solve("3 = 4").final_answer, "No real solutions.");
    }

    #[test]
    fn test_failures() {
        let unparsable = solve("sin(x) = 0");
        assert_eq!(unparsable.final_answer, "Could not parse the equation.");
        assert!(unparsable.error.is_some());

        let extra_symbol = solve("x^2 + k = 0");
        assert_eq!(extra_symbol.final_answer, "Could not solve the equation.");
        assert_eq!(extra_symbol.steps.len(), 2);

        let missing_sign = solve("x^2 - 4");
        assert_eq!(missing_sign.final_answer, "Could not parse the equation.");
    }

    #[test]
    fn test_context_is_passed_through() {
        let context = vec!["Quadratic formula".to_string()];
        let solution = EquationStrategy.solve(&problem("x - 1 = 0"), &context);
        assert_eq!(solution.used_context, context);
    }
}
