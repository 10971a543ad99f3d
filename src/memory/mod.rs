//! Solution memory
//!
//! An append-only log of [`MemoryRecord`]s used to recall earlier solutions
//! and to collect user feedback. Records are never changed once written.
//!
//! Recall is a linear scan with symmetric substring matching: the first
//! stored record whose text contains the query, or is contained in it, wins.
//! Short or generic texts can therefore match unrelated records.

pub mod store;

pub use store::JsonFileMemoryStore;

use crate::models::MemoryRecord;
use crate::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Trait for memory persistence
#[async_trait::async_trait]
pub trait MemoryStore: Send + Sync {
    async fn save(&self, record: MemoryRecord) -> Result<()>;
    async fn records(&self) -> Result<Vec<MemoryRecord>>;

    async fn find_similar(&self, problem_text: &str) -> Result<Option<MemoryRecord>> {
        Ok(first_similar(&self.records().await?, problem_text).cloned())
    }
}

/// First record in storage order whose text overlaps `problem_text`
pub fn first_similar<'a>(records: &'a [MemoryRecord], problem_text: &str) -> Option<&'a MemoryRecord> {
    records.iter().find(|record| {
        problem_text.contains(record.problem_text.as_str())
            || record.problem_text.contains(problem_text)
    })
}

/// In-memory store for tests and ephemeral runs
pub struct InMemoryMemoryStore {
    records: Arc<RwLock<Vec<MemoryRecord>>>,
}

impl InMemoryMemoryStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MemoryStore for InMemoryMemoryStore {
    async fn save(&self, record: MemoryRecord) -> Result<()> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn records(&self) -> Result<Vec<MemoryRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn find_similar(&self, problem_text: &str) -> Result<Option<MemoryRecord>> {
        let records = self.records.read().await;
        Ok(first_similar(&records, problem_text).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Route, UserFeedback};

    fn record(text: &str, answer: &str) -> MemoryRecord {
        MemoryRecord {
            problem_text: text.to_string(),
            route: Route::QuadraticEquation,
            final_answer: answer.to_string(),
            steps: vec![],
            verified: true,
            user_feedback: UserFeedback::Unknown,
            correction: None,
        }
    }

    #[tokio::test]
    async fn test_save_then_find() {
        let store = InMemoryMemoryStore::new();
        store.save(record("x^2 - 4 = 0", "x = -2, 2")).await.unwrap();

        let found = store.find_similar("x^2 - 4 = 0").await.unwrap().unwrap();
        assert_eq!(found.final_answer, "x = -2, 2");
    }

    #[tokio::test]
    async fn test_match_is_symmetric_and_first_wins() {
        let store = InMemoryMemoryStore::new();
        store.save(record("x^2 - 4 = 0", "first")).await.unwrap();
        store.save(record("Solve x^2 - 4 = 0", "second")).await.unwrap();

        // stored text inside the query
        let found = store.find_similar("Please solve x^2 - 4 = 0").await.unwrap().unwrap();
        assert_eq!(found.final_answer, "first");

        // query inside the stored text
        let found = store.find_similar("4 = 0").await.unwrap().unwrap();
        assert_eq!(found.final_answer, "first");

        assert!(store.find_similar("x + 1").await.unwrap().is_none());
    }

    #[test]
    fn test_empty_store_finds_nothing() {
        let store = InMemoryMemoryStore::new();
        let found = tokio_test::block_on(store.find_similar("x^2 - 4 = 0")).unwrap();
        assert!(found.is_none());
        assert!(tokio_test::block_on(store.records()).unwrap().is_empty());
    }
}
