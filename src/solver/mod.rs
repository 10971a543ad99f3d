//! Solver agent and strategy registry
//!
//! Each route maps to one [`SolvingStrategy`]. Strategies never fail: a
//! symbolic error becomes a "Could not ..." [`Solution`] carrying the detail
//! in `error`. Computed answers are then checked by the
//! [`AnswerValidator`] for the route they were solved under.

mod equation;
mod expression;
mod optimization;

pub use equation::EquationStrategy;
pub use expression::ExpressionStrategy;
pub use optimization::OptimizationStrategy;

use crate::math::MathError;
use crate::models::{Route, Solution, StructuredProblem};
use crate::validator::AnswerValidator;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const UNSUPPORTED_ANSWER: &str = "Unsupported problem type.";
pub const MISMATCH_ANSWER: &str =
    "The computed result does not match the expected answer type for this problem.";
pub const MISMATCH_ERROR: &str = "Answer-type validation failed";
pub const TIMEOUT_ANSWER: &str = "Could not compute a solution within the time limit.";

/// One symbolic procedure, bound to a single route
pub trait SolvingStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn route(&self) -> Route;
    fn solve(&self, problem: &StructuredProblem, context: &[String]) -> Solution;
}

/// A symbolic failure and the user-facing answer it is reported as
#[derive(Debug)]
pub(crate) struct StrategyFailure {
    answer: &'static str,
    source: MathError,
}

impl StrategyFailure {
    pub(crate) fn new(answer: &'static str, source: MathError) -> Self {
        Self { answer, source }
    }
}

/// Turn a strategy's outcome into a [`Solution`]
pub(crate) fn finish(
    outcome: std::result::Result<String, StrategyFailure>,
    steps: Vec<String>,
    context: &[String],
) -> Solution {
    match outcome {
        Ok(answer) => Solution::answered(answer, steps, context),
        Err(failure) => {
            debug!(error = %failure.source, answer = failure.answer, "Strategy failed");
            Solution::failed(failure.answer, failure.source.to_string(), steps, context)
        }
    }
}

/// Strategy registry for looking up a route's procedure
pub struct StrategyRegistry {
    strategies: HashMap<Route, Arc<dyn SolvingStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    pub fn register(&mut self, strategy: Arc<dyn SolvingStrategy>) {
        self.strategies.insert(strategy.route(), strategy);
    }

    pub fn get(&self, route: Route) -> Option<Arc<dyn SolvingStrategy>> {
        self.strategies.get(&route).cloned()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.strategies.keys().copied().collect()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry with the three built-in strategies
pub fn create_default_registry() -> StrategyRegistry {
    let mut registry = StrategyRegistry::new();
    registry.register(Arc::new(EquationStrategy));
    registry.register(Arc::new(OptimizationStrategy));
    registry.register(Arc::new(ExpressionStrategy));
    registry
}

#[derive(Clone)]
pub struct SolverAgent {
    registry: Arc<StrategyRegistry>,
    timeout: Duration,
}

impl SolverAgent {
    pub fn new(registry: StrategyRegistry, timeout: Duration) -> Self {
        Self {
            registry: Arc::new(registry),
            timeout,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(create_default_registry(), timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Dispatch to the route's strategy and validate the answer shape
    pub fn solve(&self, problem: &StructuredProblem, context: &[String], route: Route) -> Solution {
        let strategy = match self.registry.get(route) {
            Some(strategy) => strategy,
            None => {
                info!(%route, "Solver: no strategy for route");
                return Solution::answered(UNSUPPORTED_ANSWER, Vec::new(), &[]);
            }
        };

        let solution = strategy.solve(problem, context);
        info!(
            strategy = strategy.name(),
            answer = %solution.final_answer,
            steps = solution.steps.len(),
            "Solver: strategy finished"
        );

        if solution.steps.is_empty() {
            return solution;
        }

        if AnswerValidator::validate(route, &solution.final_answer) {
            solution
        } else {
            warn!(%route, answer = %solution.final_answer, "Solver: answer has the wrong shape");
            Solution {
                final_answer: MISMATCH_ANSWER.to_string(),
                error: Some(MISMATCH_ERROR.to_string()),
                ..solution
            }
        }
    }

    /// [`SolverAgent::solve`] on the blocking pool, bounded by the timeout
    pub async fn solve_with_timeout(
        &self,
        problem: &StructuredProblem,
        context: &[String],
        route: Route,
    ) -> Solution {
        let agent = self.clone();
        let owned_problem = problem.clone();
        let owned_context = context.to_vec();
        let task = tokio::task::spawn_blocking(move || {
            agent.solve(&owned_problem, &owned_context, route)
        });

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(solution)) => solution,
            Ok(Err(join_error)) => {
                warn!(error = %join_error, "Solver: task aborted");
                Solution::failed(
                    "Could not compute a solution.",
                    join_error.to_string(),
                    Vec::new(),
                    context,
                )
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Solver: timed out");
                Solution::failed(
                    TIMEOUT_ANSWER,
                    format!("solver exceeded {} ms", self.timeout.as_millis()),
                    Vec::new(),
                    context,
                )
            }
        }
    }
}

impl Default for SolverAgent {
    fn default() -> Self {
        Self::with_timeout(Duration::from_millis(crate::config::DEFAULT_SOLVER_TIMEOUT_MS))
    }
}
