//! Factoring a single expression

use super::{finish, SolvingStrategy, StrategyFailure};
use crate::math::{factor_univariate, normalize_math_text, parse_polynomial, MathError};
use crate::models::{Route, Solution, StructuredProblem};

const ANALYSIS_FAILURE: &str = "Could not analyze the expression.";

pub struct ExpressionStrategy;

impl ExpressionStrategy {
    fn factored(text: &str, steps: &mut Vec<String>) -> Result<String, MathError> {
        let normalized = normalize_math_text(text);
        steps.push(format!("Normalized expression: {}", normalized));

        let poly = parse_polynomial(&normalized)?;
        steps.push(format!("Expanded: {}", poly));

        match poly.univariate('x') {
            Some(coeffs) if poly.symbols().contains(&'x') => {
                let factorization = factor_univariate(&coeffs, 'x')?;
                steps.push(format!(
                    "Factored over the rationals into {} factor(s)",
                    factorization.factor_count()
                ));
                Ok(factorization.to_string())
            }
            _ => Ok(poly.to_string()),
        }
    }
}

impl SolvingStrategy for ExpressionStrategy {
    fn name(&self) -> &'static str {
        "expression_analysis"
    }

    fn route(&self) -> Route {
        Route::ExpressionAnalysis
    }

    fn solve(&self, problem: &StructuredProblem, context: &[String]) -> Solution {
        let mut steps = Vec::new();
        let outcome = Self::factored(&problem.problem_text, &mut steps)
            .map(|form| format!("Factored form: {}", form))
            .map_err(|e| StrategyFailure::new(ANALYSIS_FAILURE, e));
        finish(outcome, steps, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::tests::problem;

    fn answer(text: &str) -> String {
        ExpressionStrategy.solve(&problem(text), &[]).final_answer
    }

    #[test]
    fn test_factors_quadratic() {
        assert_eq!(answer("Factor x^2 - 5x + 6"), "Factored form: (x - 2)*(x - 3)");
        assert_eq!(answer("2x^2 - 2"), "Factored form: 2*(x + 1)*(x - 1)");
    }

    #[test]
    fn test_expands_products_first() {
        assert_eq!(answer("(x + 1)(x + 1)"), "Factored form: (x + 1)**2");
    }

    #[test]
    fn test_multivariate_stays_expanded() {
        assert_eq!(answer("x^2 + kx"), "Factored form: x**2 + k*x");
    }

    #[test]
    fn test_failure() {
        let solution = ExpressionStrategy.solve(&problem("x > 0"), &[]);
        assert_eq!(solution.final_answer, "Could not analyze the expression.");
        assert_eq!(solution.steps.len(), 1);
        assert!(solution.error.is_some());
    }
}
