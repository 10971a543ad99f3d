//! Extremum of a polynomial `f(x)`
//!
//! The critical point is the first real root of `f'(x)`; a derivative that
//! is linear in `x` with a constant slope also yields a parametric point such
//! as `x = -k/2`. A "minimum value = N" phrase turns the extremum into an
//! equation for the one remaining free symbol.

use super::{finish, SolvingStrategy, StrategyFailure};
use crate::math::{normalize_math_text, parse_polynomial, real_roots, MathError, Poly, Rational, Surd};
use crate::models::{Route, Solution, StructuredProblem};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

const PARSE_FAILURE: &str = "Could not parse the function f(x).";
const CRITICAL_POINT_FAILURE: &str = "Could not find a critical point.";
const EVALUATION_FAILURE: &str = "Could not evaluate f(x) at the critical point.";
const TARGET_FAILURE: &str = "Could not solve for the target value.";
const NO_CRITICAL_POINT: &str = "No critical point found.";

lazy_static! {
    static ref TARGET_VALUE: Regex =
        Regex::new(r"(minimum|maximum)\s+value\s*=?\s*(-?\d+(?:\.\d+)?)").unwrap();
}

#[derive(Debug, Clone)]
enum CriticalPoint {
    Exact(Surd),
    Parametric(Poly),
}

impl CriticalPoint {
    /// The point as a polynomial, unless it is irrational
    fn as_poly(&self) -> Option<Poly> {
        match self {
            CriticalPoint::Exact(surd) => surd.as_rational().map(Poly::constant),
            CriticalPoint::Parametric(poly) => Some(poly.clone()),
        }
    }
}

impl fmt::Display for CriticalPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriticalPoint::Exact(surd) => write!(f, "{}", surd),
            CriticalPoint::Parametric(poly) => write!(f, "{}", poly),
        }
    }
}

#[derive(Debug, Clone)]
enum Value {
    Exact(Surd),
    Symbolic(Poly),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Exact(surd) => write!(f, "{}", surd),
            Value::Symbolic(poly) => write!(f, "{}", poly),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Extremum {
    Minimum,
    Maximum,
}

impl Extremum {
    fn from_sign(sign: i32) -> Option<Self> {
        match sign {
            s if s > 0 => Some(Extremum::Minimum),
            s if s < 0 => Some(Extremum::Maximum),
            _ => None,
        }
    }
}

impl fmt::Display for Extremum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extremum::Minimum => write!(f, "minimum"),
            Extremum::Maximum => write!(f, "maximum"),
        }
    }
}

/// Text after the first `=` of the part before the first comma
fn function_expression(text: &str) -> &str {
    let definition = text.split(',').next().unwrap_or(text);
    definition.split('=').nth(1).unwrap_or(definition)
}

fn critical_point(derivative: &Poly) -> Result<Option<CriticalPoint>, MathError> {
    if derivative.is_zero() {
        return Ok(None);
    }

    if let Some(coeffs) = derivative.univariate('x') {
        let roots = real_roots(&coeffs)?;
        return Ok(roots.first().copied().map(CriticalPoint::Exact));
    }

    let coeffs = derivative.coefficients_in('x');
    match coeffs.as_slice() {
        [_] => Ok(None),
        [constant, slope] => {
            let slope = slope
                .as_constant()
                .filter(|s| !s.is_zero())
                .ok_or_else(|| MathError::Unsolvable("slope of f'(x) is symbolic".to_string()))?;
            let point = constant.scale(&slope.recip()?)?.negate();
            Ok(Some(CriticalPoint::Parametric(point)))
        }
        _ => Err(MathError::Unsolvable(
            "symbolic derivative of degree above one".to_string(),
        )),
    }
}

fn evaluate(f: &Poly, point: &CriticalPoint) -> Result<Value, MathError> {
    if let Some(at) = point.as_poly() {
        return Ok(Value::Symbolic(f.substitute('x', &at)?));
    }
    match (point, f.univariate('x')) {
        (CriticalPoint::Exact(surd), Some(coeffs)) => Ok(Value::Exact(surd.evaluate(&coeffs)?)),
        _ => Err(MathError::Unsolvable(
            "symbolic function at an irrational point".to_string(),
        )),
    }
}

/// Second-derivative test; `None` when the sign is unknown or zero
fn classify(second: &Poly, point: &CriticalPoint) -> Result<Option<Extremum>, MathError> {
    if let Some(at) = point.as_poly() {
        let curvature = second.substitute('x', &at)?;
        return Ok(curvature
            .as_constant()
            .and_then(|c| Extremum::from_sign(c.signum() as i32)));
    }
    match (point, second.univariate('x')) {
        (CriticalPoint::Exact(surd), Some(coeffs)) => {
            Ok(Extremum::from_sign(surd.evaluate(&coeffs)?.signum()))
        }
        _ => Ok(None),
    }
}

/// `(kind, value)` of a "minimum value = N" phrase
fn target_value(text: &str) -> Result<Option<(String, Rational)>, MathError> {
    let lowered = text.to_lowercase();
    let captures = match TARGET_VALUE.captures(&lowered) {
        Some(captures) => captures,
        None => return Ok(None),
    };
    let literal = &captures[2];
    let magnitude = Rational::parse_decimal(literal.trim_start_matches('-'))?;
    let value = if literal.starts_with('-') {
        magnitude.neg()
    } else {
        magnitude
    };
    Ok(Some((captures[1].to_string(), value)))
}

pub struct OptimizationStrategy;

impl OptimizationStrategy {
    fn parse_function(text: &str, steps: &mut Vec<String>) -> Result<Poly, MathError> {
        let normalized = normalize_math_text(function_expression(text));
        let f = parse_polynomial(&normalized)?;
        steps.push(format!("Function: f(x) = {}", f));
        Ok(f)
    }

    fn solve_for_target(
        value: &Poly,
        symbol: char,
        target: &Rational,
        steps: &mut Vec<String>,
    ) -> Result<String, MathError> {
        let equation = value.checked_sub(&Poly::constant(*target))?;
        steps.push(format!("Set the extremum equal to {}: {} = 0", target, equation));

        let coeffs = equation
            .univariate(symbol)
            .ok_or_else(|| MathError::Unsolvable(format!("expected only {}", symbol)))?;
        let roots = real_roots(&coeffs)?;
        let first = roots.first().ok_or_else(|| {
            MathError::Unsolvable(format!("no real {} reaches the target", symbol))
        })?;
        steps.push(format!("Solved for {}", symbol));
        Ok(format!("{} = {}", symbol, first))
    }

    fn run(text: &str, steps: &mut Vec<String>) -> Result<String, StrategyFailure> {
        let f = Self::parse_function(text, steps)
            .map_err(|e| StrategyFailure::new(PARSE_FAILURE, e))?;

        let derivative = f
            .derivative('x')
            .map_err(|e| StrategyFailure::new(CRITICAL_POINT_FAILURE, e))?;
        steps.push(format!("Derivative: f'(x) = {}", derivative));

        let point = match critical_point(&derivative)
            .map_err(|e| StrategyFailure::new(CRITICAL_POINT_FAILURE, e))?
        {
            Some(point) => point,
            None => return Ok(NO_CRITICAL_POINT.to_string()),
        };
        steps.push(format!("Critical point: x = {}", point));

        let value =
            evaluate(&f, &point).map_err(|e| StrategyFailure::new(EVALUATION_FAILURE, e))?;
        steps.push(format!("Value at the critical point: {}", value));

        let kind = derivative
            .derivative('x')
            .and_then(|second| classify(&second, &point))
            .map_err(|e| StrategyFailure::new(EVALUATION_FAILURE, e))?;

        let target = target_value(text).map_err(|e| StrategyFailure::new(TARGET_FAILURE, e))?;
        if let (Some((phrase, target)), Value::Symbolic(poly)) = (&target, &value) {
            let symbols = poly.symbols();
            if let (1, Some(symbol)) = (symbols.len(), symbols.iter().next()) {
                steps.push(format!("Target {} value: {}", phrase, target));
                return Self::solve_for_target(poly, *symbol, target, steps)
                    .map_err(|e| StrategyFailure::new(TARGET_FAILURE, e));
            }
        }

        if let Some(kind) = kind {
            steps.push(format!("Second derivative test: {} at x = {}", kind, point));
        }
        Ok(format!("Extremum value = {}", value))
    }
}

impl SolvingStrategy for OptimizationStrategy {
    fn name(&self) -> &'static str {
        "quadratic_optimization"
    }

    fn route(&self) -> Route {
        Route::QuadraticOptimization
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

    fn answer(text: &str) -> String {
        OptimizationStrategy.solve(&problem(text), &[]).final_answer
    }

    #[test]
    fn test_maximum_with_trailing_condition() {
        assert_eq!(
            answer("find the maximum of f(x) = -x^2 + 4, given that f(x) = 5"),
            "Extremum value = 4"
        );
    }

    #[test]
    fn test_minimum_of_quadratic() {
        assert_eq!(
            answer("Find the minimum of f(x) = x^2 - 4x + 1"),
            "Extremum value = -3"
        );
        assert_eq!(
            answer("minimum of f(x) = 2x^2 + 2x"),
            "Extremum value = -1/2"
        );
    }

    #[test]
    fn test_classification_is_a_step() {
        let solution =
            OptimizationStrategy.solve(&problem("Find the minimum of f(x) = x^2 - 4x + 1"), &[]);
        assert_eq!(solution.final_answer, "Extremum value = -3");
        assert_eq!(
            solution.steps.last().map(String::as_str),
            Some("Second derivative test: minimum at x = 2")
        );
    }

    #[test]
    fn test_parametric_extremum() {
        assert_eq!(
            answer("Find the minimum of f(x) = x^2 + kx + 5"),
            "Extremum value = -k**2/4 + 5"
        );
    }

    #[test]
    fn test_target_value_solves_for_parameter() {
        let solution = OptimizationStrategy.solve(
            &problem("f(x) = x^2 + kx + 5, minimum value = 1"),
            &[],
        );
        assert_eq!(solution.final_answer, "k = -4");
        assert!(solution.steps.iter().any(|s| s == "Target minimum value: 1"));
    }

    #[test]
    fn test_cubic_uses_first_critical_point() {
        // f'(x) = 3x^2 - 3 -> x = -1 first, f(-1) = 2, f''(-1) = -6
        assert_eq!(
            answer("maximum of f(x) = x^3 - 3x"),
            "Extremum value = 2"
        );
    }

    #[test]
    fn test_without_critical_point() {
        assert_eq!(answer("maximum of f(x) = 3x + 1"), "No critical point found.");
    }

    #[test]
    fn test_unparsable_function() {
        let solution = OptimizationStrategy.solve(&problem("maximum of f(x) = sin(x)"), &[]);
        assert_eq!(solution.final_answer, "Could not parse the function f(x).");
        assert!(solution.error.is_some());
    }
}
