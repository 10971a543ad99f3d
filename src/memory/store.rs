//! JSON file persistence for the memory log
//!
//! The whole log is one JSON array. Every save rewrites it through a temp
//! file and a rename, so a crash never leaves a half-written log behind.
//! Writers within the process are serialized; separate processes sharing
//! one file are not.

use super::{first_similar, MemoryStore};
use crate::error::PipelineError;
use crate::models::MemoryRecord;
use crate::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub struct JsonFileMemoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileMemoryStore {
    /// Open the log at `path`, creating it (and its directory) when absent
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if fs::metadata(&path).await.is_err() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&path, "[]").await?;
            info!(path = %path.display(), "Created memory log");
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<MemoryRecord>> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&text).map_err(|e| {
            PipelineError::Memory(format!(
                "memory log {} is not a valid record list: {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn write_all(&self, records: &[MemoryRecord]) -> Result<()> {
        let body = serde_json::to_vec_pretty(records)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, body).await?;
        fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl MemoryStore for JsonFileMemoryStore {
    async fn save(&self, record: MemoryRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.load().await?;
        records.push(record);
        self.write_all(&records).await?;

        debug!(path = %self.path.display(), records = records.len(), "Memory record saved");
        Ok(())
    }

    async fn records(&self) -> Result<Vec<MemoryRecord>> {
        self.load().await
    }

    async fn find_similar(&self, problem_text: &str) -> Result<Option<MemoryRecord>> {
        let records = self.load().await?;
        Ok(first_similar(&records, problem_text).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Route, UserFeedback};
    use tempfile::tempdir;

    fn record(text: &str) -> MemoryRecord {
        MemoryRecord {
            problem_text: text.to_string(),
            route: Route::ExpressionAnalysis,
            final_answer: "Factored form: (x - 2)*(x - 3)".to_string(),
            steps: vec!["Normalized expression: x**2-5*x+6".to_string()],
            verified: true,
            user_feedback: UserFeedback::Unknown,
            correction: None,
        }
    }

    #[tokio::test]
    async fn test_open_creates_empty_log() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("memory.json");

        let store = JsonFileMemoryStore::open(&path).await.unwrap();
        assert!(path.exists());
        assert!(store.records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memory.json");

        let store = JsonFileMemoryStore::open(&path).await.unwrap();
        store.save(record("x^2 - 5x + 6")).await.unwrap();
        store.save(record("x^2 - 1")).await.unwrap();
        drop(store);

        let reopened = JsonFileMemoryStore::open(&path).await.unwrap();
        let records = reopened.records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].problem_text, "x^2 - 1");

        let found = reopened.find_similar("x^2 - 5x + 6").await.unwrap().unwrap();
        assert_eq!(found.final_answer, "Factored form: (x - 2)*(x - 3)");
    }

    #[tokio::test]
    async fn test_persisted_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memory.json");

        let store = JsonFileMemoryStore::open(&path).await.unwrap();
        store.save(record("x^2 - 5x + 6")).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let first = &raw[0];
        assert_eq!(first["route"], "expression_analysis");
        assert_eq!(first["user_feedback"], "unknown");
        assert_eq!(first["verified"], true);
        assert!(first.get("correction").is_none());
    }

    #[tokio::test]
    async fn test_corrupt_log_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memory.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileMemoryStore::open(&path).await.unwrap();
        assert!(matches!(
            store.records().await,
            Err(PipelineError::Memory(_))
        ));
    }
}
