//! Audit log of pipeline runs
//!
//! Every run is kept with its trace and outcome, plus hashes of the problem
//! text and the outcome so a stored run can be checked later. The log holds a
//! bounded number of runs and drops the oldest when full.

use crate::models::{PipelineOutcome, Route};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Hex SHA-256 of the cleaned problem text
    pub problem_hash: String,
    pub outcome_hash: String,
    pub route: Option<Route>,
    pub outcome: PipelineOutcome,
    pub trace: Vec<String>,
    pub elapsed_ms: u64,
}

impl RunRecord {
    pub fn new(
        run_id: Uuid,
        problem_text: &str,
        route: Option<Route>,
        outcome: PipelineOutcome,
        trace: Vec<String>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            run_id,
            created_at: Utc::now(),
            problem_hash: hash_text(problem_text),
            outcome_hash: compute_outcome_hash(&outcome),
            route,
            outcome,
            trace,
            elapsed_ms,
        }
    }
}

/// Audit trail storage, oldest run at the front
pub struct AuditLog {
    records: Arc<RwLock<VecDeque<RunRecord>>>,
    capacity: usize,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::with_capacity(crate::config::DEFAULT_AUDIT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn record(&self, record: RunRecord) -> Result<Uuid> {
        let run_id = record.run_id;
        let mut records = self.records.write().await;
        while records.len() >= self.capacity {
            if let Some(evicted) = records.pop_front() {
                debug!(run_id = %evicted.run_id, "Audit: evicted oldest run");
            }
        }
        records.push_back(record);
        Ok(run_id)
    }

    pub async fn get(&self, run_id: Uuid) -> Result<Option<RunRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.run_id == run_id).cloned())
    }

    /// The `n` most recent runs, newest first
    pub async fn recent(&self, n: usize) -> Result<Vec<RunRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().rev().take(n).cloned().collect())
    }

    /// True when `problem_text` and the stored outcome still match their hashes
    pub async fn verify_integrity(&self, run_id: Uuid, problem_text: &str) -> Result<bool> {
        let records = self.records.read().await;

        Ok(records
            .iter()
            .find(|r| r.run_id == run_id)
            .map_or(false, |record| {
                record.problem_hash == hash_text(problem_text)
                    && record.outcome_hash == compute_outcome_hash(&record.outcome)
            }))
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

pub fn hash_text(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// SHA-256 of the outcome's JSON, streamed into the hasher
pub fn compute_outcome_hash(outcome: &PipelineOutcome) -> String {
    let mut hasher = Sha256::new();

    if serde_json::to_writer(&mut HashWriter(&mut hasher), outcome).is_err() {
        return String::new();
    }

    hex::encode(hasher.finalize())
}

/// Adapter to allow writing into Sha256 via std::io::Write
struct HashWriter<'a, H: Digest>(&'a mut H);

impl<'a, H: Digest> Write for HashWriter<'a, H> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
