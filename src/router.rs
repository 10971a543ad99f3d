//! Router agent
//!
//! Routes on the surface structure of the problem, not its wording.
//! Rules are evaluated top to bottom and the first match wins; optimization
//! has to stay ahead of the `=` rule so "f(x) = ..." maxima are not solved
//! as equations.

use crate::models::{Route, StructuredProblem};
use tracing::debug;

type RoutePredicate = fn(&str) -> bool;

const ROUTE_RULES: &[(RoutePredicate, Route)] = &[
    (mentions_extremum, Route::QuadraticOptimization),
    (has_equals_sign, Route::QuadraticEquation),
    (mentions_x, Route::ExpressionAnalysis),
];

fn mentions_extremum(text: &str) -> bool {
    let lowered = text.to_lowercase();
    lowered.contains("minimum") || lowered.contains("maximum")
}

fn has_equals_sign(text: &str) -> bool {
    text.contains('=')
}

fn mentions_x(text: &str) -> bool {
    text.contains('x')
}

/// Router agent (stateless, total)
#[derive(Debug, Clone, Copy, Default)]
pub struct RouterAgent;

impl RouterAgent {
    pub fn new() -> Self {
        Self
    }

    pub fn route(&self, problem: &StructuredProblem) -> Route {
        let route = route_text(&problem.problem_text);
        debug!(%route, "Router: route selected");
        route
    }
}

pub fn route_text(text: &str) -> Route {
    ROUTE_RULES
        .iter()
        .find(|(predicate, _)| predicate(text))
        .map(|(_, route)| *route)
        .unwrap_or(Route::Unknown)
}
