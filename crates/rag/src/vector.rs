//! Passage retrieval from the document index.

use crate::store::VectorStore;
use crate::timeouts::store_call;
use counsel_core::AppResult;
use std::sync::Arc;
use std::time::Duration;

/// Looks up passages for the question text as-is, without synonym expansion.
pub struct VectorRetriever {
    store: Arc<dyn VectorStore>,
    timeout: Duration,
}

impl VectorRetriever {
    pub fn new(store: Arc<dyn VectorStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn retrieve(&self, question: &str) -> AppResult<Vec<String>> {
        let passages = store_call(
            "similarity search",
            self.timeout,
            self.store.similarity_search(question),
        )
        .await?;

        tracing::info!(passages = passages.len(), "Vector retrieval complete");
        Ok(passages)
    }
}
