//! Pipeline configuration
//!
//! Everything is read from the environment (after `.env` is loaded by the
//! binaries) so deployments only differ by their environment.

use crate::error::PipelineError;
use crate::Result;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MEMORY_PATH: &str = "memory/memory.json";
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.75;
pub const DEFAULT_SOLVER_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_RETRIEVAL_K: usize = 3;
pub const DEFAULT_AUDIT_CAPACITY: usize = 1_000;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Location of the persisted memory log
    pub memory_path: PathBuf,
    /// Minimum extraction confidence accepted by the gate (inclusive)
    pub confidence_threshold: f64,
    /// Hard limit on a single symbolic solve
    pub solver_timeout: Duration,
    /// Number of contexts requested from the retriever
    pub retrieval_k: usize,
    pub retriever_url: Option<String>,
    pub knowledge_base_dir: Option<PathBuf>,
    /// Runs kept in the in-memory audit log
    pub audit_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            memory_path: PathBuf::from(DEFAULT_MEMORY_PATH),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            solver_timeout: Duration::from_millis(DEFAULT_SOLVER_TIMEOUT_MS),
            retrieval_k: DEFAULT_RETRIEVAL_K,
            retriever_url: None,
            knowledge_base_dir: None,
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let confidence_threshold =
            parse_var("MENTOR_CONFIDENCE_THRESHOLD")?.unwrap_or(defaults.confidence_threshold);
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(PipelineError::Config(format!(
                "MENTOR_CONFIDENCE_THRESHOLD must be within [0, 1], got {}",
                confidence_threshold
            )));
        }

        let solver_timeout = parse_var::<u64>("MENTOR_SOLVER_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.solver_timeout);

        let audit_capacity =
            parse_var::<usize>("MENTOR_AUDIT_CAPACITY")?.unwrap_or(defaults.audit_capacity);
        if audit_capacity == 0 {
            return Err(PipelineError::Config(
                "MENTOR_AUDIT_CAPACITY must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            memory_path: non_empty_var("MENTOR_MEMORY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.memory_path),
            confidence_threshold,
            solver_timeout,
            retrieval_k: parse_var("MENTOR_RETRIEVAL_K")?.unwrap_or(defaults.retrieval_k),
            retriever_url: non_empty_var("MENTOR_RETRIEVER_URL"),
            knowledge_base_dir: non_empty_var("MENTOR_KNOWLEDGE_BASE").map(PathBuf::from),
            audit_capacity,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match non_empty_var(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| PipelineError::Config(format!("{} has an invalid value: '{}'", name, raw))),
    }
}
