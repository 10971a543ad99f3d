//! Main orchestrator - runs one submission through the pipeline
//!
//! INPUT → GATE → PARSE → ROUTE → RECALL? → RETRIEVE → SOLVE → VERIFY → SAVE
//!
//! Human review and unroutable problems end the run early with an explicit
//! outcome. Every run, whatever its outcome, lands in the audit log.

use crate::audit::{AuditLog, RunRecord};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::gate::ConfidenceGate;
use crate::memory::{JsonFileMemoryStore, MemoryStore};
use crate::models::{
    ConfidenceBand, Feedback, Gate, MemoryRecord, PipelineOutcome, PipelineReport, Route,
    Submission, UserFeedback, Verdict,
};
use crate::parser::ParserAgent;
use crate::retrieval::{retriever_from_config, Retriever};
use crate::router::RouterAgent;
use crate::solver::SolverAgent;
use crate::verification::{create_default_verification_engine, VerificationEngine};
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Everything a run knows when it ends
struct RunSummary<'a> {
    run_id: Uuid,
    started: Instant,
    problem_text: &'a str,
    route: Option<Route>,
    confidence_band: ConfidenceBand,
}

/// Pipeline orchestrator
pub struct MathMentor {
    gate: ConfidenceGate,
    parser: ParserAgent,
    router: RouterAgent,
    solver: SolverAgent,
    verification_engine: VerificationEngine,
    memory: Arc<dyn MemoryStore>,
    retriever: Arc<dyn Retriever>,
    retrieval_k: usize,
    audit_log: AuditLog,
}

impl MathMentor {
    pub fn new(
        config: &PipelineConfig,
        memory: Arc<dyn MemoryStore>,
        retriever: Arc<dyn Retriever>,
    ) -> Self {
        Self {
            gate: ConfidenceGate::new(config.confidence_threshold),
            parser: ParserAgent::new(),
            router: RouterAgent::new(),
            solver: SolverAgent::with_timeout(config.solver_timeout),
            verification_engine: create_default_verification_engine(),
            memory,
            retriever,
            retrieval_k: config.retrieval_k,
            audit_log: AuditLog::with_capacity(config.audit_capacity),
        }
    }

    /// JSON memory log and the configured retriever
    pub async fn from_config(config: &PipelineConfig) -> Result<Self> {
        let memory = JsonFileMemoryStore::open(&config.memory_path).await?;
        let retriever = retriever_from_config(config).await?;
        info!(
            memory = %config.memory_path.display(),
            retriever = retriever.name(),
            "Math mentor initialised"
        );
        Ok(Self::new(config, Arc::new(memory), retriever))
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit_log
    }

    pub fn memory(&self) -> &Arc<dyn MemoryStore> {
        &self.memory
    }

    /// Run the whole pipeline for one submission
    pub async fn run(&self, submission: Submission) -> Result<PipelineReport> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let mut trace = Vec::new();
        let confidence_band = ConfidenceBand::from_confidence(submission.confidence);

        info!(
            run_id = %run_id,
            input_type = %submission.input_type,
            confidence = submission.confidence,
            "Mentor: starting run"
        );
        trace.push(format!(
            "INPUT: {} submission, confidence {:.2} ({})",
            submission.input_type, submission.confidence, confidence_band
        ));

        let raw_text = submission.extracted_text.clone();
        let mut summary = RunSummary {
            run_id,
            started,
            problem_text: &raw_text,
            route: None,
            confidence_band,
        };

        // === GATE ===
        let input = match self.gate.admit(
            submission.input_type,
            submission.original_input,
            submission.extracted_text,
            submission.confidence,
            submission.user_confirmed,
        )? {
            Gate::Proceed(input) => input,
            Gate::NeedsHuman(review) => {
                trace.push(format!("GATE: needs human review - {}", review.reason));
                return self
                    .finish(summary, trace, PipelineOutcome::NeedsHuman { review })
                    .await;
            }
        };
        trace.push("GATE: extraction accepted".to_string());

        // === PARSE ===
        let problem = match self.parser.parse(&input) {
            Gate::Proceed(problem) => problem,
            Gate::NeedsHuman(review) => {
                trace.push(format!("PARSE: needs human review - {}", review.reason));
                return self
                    .finish(summary, trace, PipelineOutcome::NeedsHuman { review })
                    .await;
            }
        };
        trace.push(format!(
            "PARSE: topic {}, variables [{}]",
            problem.topic,
            problem.variables.join(", ")
        ));
        summary.problem_text = &problem.problem_text;

        // === ROUTE ===
        let route = self.router.route(&problem);
        summary.route = Some(route);
        trace.push(format!("ROUTE: {}", route));

        if route == Route::Unknown {
            warn!(run_id = %run_id, "Mentor: no strategy matches, asking for a rephrase");
            let outcome = PipelineOutcome::Unroutable {
                problem: problem.clone(),
            };
            return self.finish(summary, trace, outcome).await;
        }

        // === RECALL ===
        let similar = self.memory.find_similar(&problem.problem_text).await?;
        if let Some(record) = &similar {
            trace.push(format!("MEMORY: similar problem found ({})", record.final_answer));
            if submission.reuse_previous {
                info!(run_id = %run_id, "Mentor: reusing remembered solution");
                let outcome = PipelineOutcome::Recalled {
                    problem: problem.clone(),
                    route,
                    record: record.clone(),
                };
                return self.finish(summary, trace, outcome).await;
            }
        }

        // === RETRIEVE ===
        let context = match self
            .retriever
            .retrieve(&problem.problem_text, self.retrieval_k)
            .await
        {
            Ok(context) => context,
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "Mentor: retrieval failed, continuing without context");
                Vec::new()
            }
        };
        trace.push(format!("RETRIEVE: {} context(s)", context.len()));

        // === SOLVE ===
        let solution = self.solver.solve_with_timeout(&problem, &context, route).await;
        trace.push(format!("SOLVE: {}", solution.final_answer));
        debug!(run_id = %run_id, steps = ?solution.steps, "Mentor: solution steps");

        // === VERIFY ===
        let verification = self.verification_engine.verify(&problem, &solution);
        if !verification.is_valid {
            trace.push(format!(
                "VERIFY: rejected - {}",
                verification.reason.as_deref().unwrap_or("no reason given")
            ));
            warn!(run_id = %run_id, reason = ?verification.reason, "Mentor: solution rejected");
            let outcome = PipelineOutcome::Rejected {
                problem: problem.clone(),
                route,
                solution,
                verification,
            };
            return self.finish(summary, trace, outcome).await;
        }
        trace.push("VERIFY: passed".to_string());

        // === SAVE ===
        self.memory
            .save(MemoryRecord::verified(&problem, route, &solution))
            .await?;
        trace.push("MEMORY: solution saved".to_string());

        let outcome = PipelineOutcome::Solved {
            problem: problem.clone(),
            route,
            solution,
            verification,
            similar,
        };
        self.finish(summary, trace, outcome).await
    }

    /// Append a feedback-labelled copy of a solution to memory
    pub async fn record_feedback(&self, feedback: Feedback) -> Result<MemoryRecord> {
        let (verified, user_feedback, correction) = match feedback.verdict {
            Verdict::Correct => (true, UserFeedback::Correct, None),
            Verdict::Incorrect { correction } => {
                if correction.trim().is_empty() {
                    return Err(PipelineError::InvalidInput(
                        "a correction is required when marking a solution incorrect".to_string(),
                    ));
                }
                (false, UserFeedback::Incorrect, Some(correction))
            }
        };

        let record = MemoryRecord {
            problem_text: feedback.problem_text,
            route: feedback.route,
            final_answer: feedback.final_answer,
            steps: feedback.steps,
            verified,
            user_feedback,
            correction,
        };
        self.memory.save(record.clone()).await?;

        info!(
            route = %record.route,
            feedback = ?record.user_feedback,
            "Mentor: feedback recorded"
        );
        Ok(record)
    }

    async fn finish(
        &self,
        summary: RunSummary<'_>,
        trace: Vec<String>,
        outcome: PipelineOutcome,
    ) -> Result<PipelineReport> {
        let elapsed_ms = summary.started.elapsed().as_millis() as u64;

        info!(
            run_id = %summary.run_id,
            outcome = outcome.kind(),
            elapsed_ms,
            "Mentor: run complete"
        );

        let record = RunRecord::new(
            summary.run_id,
            summary.problem_text,
            summary.route,
            outcome.clone(),
            trace.clone(),
            elapsed_ms,
        );
        self.audit_log.record(record).await?;

        Ok(PipelineReport {
            run_id: summary.run_id,
            confidence_band: summary.confidence_band,
            trace,
            outcome,
        })
    }
}
