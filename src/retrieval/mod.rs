//! Knowledge retrieval
//!
//! Retrieved strings travel with the solution as `used_context`; no solving
//! strategy reads them. Implementations:
//! - [`NoopRetriever`]: always empty
//! - [`KnowledgeBaseRetriever`]: keyword overlap over local documents
//! - [`HttpRetriever`]: an external retrieval service

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    fn name(&self) -> &'static str;

    /// Up to `k` context strings, best first
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>>;
}

pub struct NoopRetriever;

#[async_trait::async_trait]
impl Retriever for NoopRetriever {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn retrieve(&self, _query: &str, _k: usize) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

//
// ================= Knowledge Base =================
//

fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Documents scored by the number of distinct lowercase words they share
/// with the query. Ties keep load order; documents sharing nothing are
/// never returned.
pub struct KnowledgeBaseRetriever {
    documents: Vec<String>,
}

impl KnowledgeBaseRetriever {
    pub fn new(documents: Vec<String>) -> Self {
        Self { documents }
    }

    /// Load every `.md` and `.txt` file of `dir`, sorted by file name
    pub async fn load(dir: &Path) -> Result<Self> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let supported = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("txt"))
                .unwrap_or(false);
            if supported {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let text = tokio::fs::read_to_string(&path).await?;
            if !text.trim().is_empty() {
                documents.push(text.trim().to_string());
            }
        }

        info!(dir = %dir.display(), documents = documents.len(), "Knowledge base loaded");
        Ok(Self::new(documents))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait::async_trait]
impl Retriever for KnowledgeBaseRetriever {
    fn name(&self) -> &'static str {
        "knowledge_base"
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let query_words = words(query);

        let mut scored: Vec<(usize, usize)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(index, doc)| (words(doc).intersection(&query_words).count(), index))
            .filter(|(score, _)| *score > 0)
            .collect();
        // stable sort keeps load order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let contexts: Vec<String> = scored
            .into_iter()
            .take(k)
            .map(|(_, index)| self.documents[index].clone())
            .collect();
        debug!(query, hits = contexts.len(), "Knowledge base retrieval");
        Ok(contexts)
    }
}

//
// ================= HTTP Service =================
//

#[derive(Debug, Serialize)]
struct RetrieveRequest<'a> {
    query: &'a str,
    k: usize,
}

#[derive(Debug, Deserialize)]
struct RetrieveResponse {
    #[serde(default)]
    contexts: Vec<String>,
}

/// POSTs `{query, k}` to `{base_url}/retrieve`, expects `{contexts: [...]}`
pub struct HttpRetriever {
    client: Client,
    base_url: String,
}

impl HttpRetriever {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Retriever for HttpRetriever {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let url = format!("{}/retrieve", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&RetrieveRequest { query, k })
            .send()
            .await
            .map_err(|e| PipelineError::Retrieval(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Retrieval(format!(
                "retrieval service returned {}",
                status
            )));
        }

        let body: RetrieveResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Retrieval(format!("invalid response body: {}", e)))?;

        Ok(body.contexts.into_iter().take(k).collect())
    }
}

/// Pick the retriever the configuration asks for (HTTP first)
pub async fn retriever_from_config(config: &PipelineConfig) -> Result<Arc<dyn Retriever>> {
    if let Some(url) = &config.retriever_url {
        info!(url = %url, "Using HTTP retriever");
        return Ok(Arc::new(HttpRetriever::new(url)?));
    }
    if let Some(dir) = &config.knowledge_base_dir {
        return Ok(Arc::new(KnowledgeBaseRetriever::load(dir).await?));
    }
    Ok(Arc::new(NoopRetriever))
}
