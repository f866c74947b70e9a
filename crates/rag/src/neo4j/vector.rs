//! Hybrid passage search: vector index plus keyword index.

use super::client::{cell_text, Neo4jClient};
use crate::fulltext::remove_lucene_chars;
use crate::store::VectorStore;
use async_trait::async_trait;
use counsel_core::config::VectorConfig;
use counsel_core::{AppError, AppResult};
use counsel_llm::Embedder;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

const VECTOR_QUERY: &str = "CALL db.index.vector.queryNodes($index, $k, $embedding) \
     YIELD node, score \
     RETURN elementId(node) AS id, node[$text] AS text, score";

const KEYWORD_QUERY: &str = "CALL db.index.fulltext.queryNodes($index, $query, {limit: $k}) \
     YIELD node, score \
     RETURN elementId(node) AS id, node[$text] AS text, score";

/// A passage with its raw index score.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoredPassage {
    pub id: String,
    pub text: String,
    pub score: f64,
}

/// [`VectorStore`] over document nodes carrying text and an embedding.
///
/// Each index's scores are divided by that index's best score, the two
/// lists are merged keeping the higher score per node, and the top `k`
/// passages are returned.
pub struct Neo4jVectorStore {
    client: Arc<Neo4jClient>,
    embedder: Arc<dyn Embedder>,
    config: VectorConfig,
}

impl Neo4jVectorStore {
    pub fn new(client: Arc<Neo4jClient>, embedder: Arc<dyn Embedder>, config: VectorConfig) -> Self {
        Self {
            client,
            embedder,
            config,
        }
    }

    async fn vector_hits(&self, query: &str) -> AppResult<Vec<ScoredPassage>> {
        let embedding = self.embedder.embed(query).await.map_err(|e| {
            AppError::Retrieval(format!(
                "Failed to embed query with {}: {}",
                self.embedder.model_name(),
                e
            ))
        })?;

        let rows = self
            .client
            .run(
                VECTOR_QUERY,
                json!({
                    "index": self.config.index_name,
                    "k": self.config.top_k,
                    "embedding": embedding,
                    "text": self.config.text_property,
                }),
            )
            .await?;
        Ok(scored_passages(&rows))
    }

    async fn keyword_hits(&self, query: &str) -> AppResult<Vec<ScoredPassage>> {
        let cleaned = remove_lucene_chars(query);
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self
            .client
            .run(
                KEYWORD_QUERY,
                json!({
                    "index": self.config.keyword_index,
                    "query": cleaned,
                    "k": self.config.top_k,
                    "text": self.config.text_property,
                }),
            )
            .await?;
        Ok(scored_passages(&rows))
    }
}

#[async_trait]
impl VectorStore for Neo4jVectorStore {
    async fn similarity_search(&self, query: &str) -> AppResult<Vec<String>> {
        let (vector, keyword) =
            tokio::try_join!(self.vector_hits(query), self.keyword_hits(query))?;

        tracing::debug!(
            vector = vector.len(),
            keyword = keyword.len(),
            "Hybrid search hits"
        );
        Ok(merge_hybrid(vector, keyword, self.config.top_k))
    }
}

fn scored_passages(rows: &[Vec<Value>]) -> Vec<ScoredPassage> {
    rows.iter()
        .filter_map(|row| {
            Some(ScoredPassage {
                id: row.first().and_then(cell_text)?,
                text: row.get(1).and_then(cell_text)?,
                score: row.get(2).and_then(Value::as_f64).unwrap_or(0.0),
            })
        })
        .collect()
}

fn normalize(mut hits: Vec<ScoredPassage>) -> Vec<ScoredPassage> {
    let max = hits.iter().map(|h| h.score).fold(0.0_f64, f64::max);
    if max > 0.0 {
        for hit in &mut hits {
            hit.score /= max;
        }
    }
    hits
}

/// Merge normalized hits, best first; ties keep first-seen order.
pub(crate) fn merge_hybrid(
    vector: Vec<ScoredPassage>,
    keyword: Vec<ScoredPassage>,
    k: usize,
) -> Vec<String> {
    let mut merged: Vec<ScoredPassage> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for hit in normalize(vector).into_iter().chain(normalize(keyword)) {
        match positions.get(&hit.id) {
            Some(&i) => {
                if hit.score > merged[i].score {
                    merged[i].score = hit.score;
                }
            }
            None => {
                positions.insert(hit.id.clone(), merged.len());
                merged.push(hit);
            }
        }
    }

    // stable sort keeps first-seen order among equal scores
    merged.sort_by(|a, b| b.score.total_cmp(&a.score));
    merged.into_iter().take(k).map(|hit| hit.text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, score: f64) -> ScoredPassage {
        ScoredPassage {
            id: id.to_string(),
            text: format!("text {id}"),
            score,
        }
    }

    #[test]
    fn test_merge_normalizes_each_list() {
        // keyword scores are on a different scale than cosine similarity
        let vector = vec![hit("a", 0.9), hit("b", 0.45)];
        let keyword = vec![hit("c", 8.0), hit("d", 2.0)];

        let merged = merge_hybrid(vector, keyword, 4);
        assert_eq!(merged, vec!["text a", "text c", "text b", "text d"]);
    }

    #[test]
    fn test_merge_keeps_best_score_per_node() {
        let vector = vec![hit("a", 1.0), hit("b", 0.2)];
        let keyword = vec![hit("b", 5.0)];

        let merged = merge_hybrid(vector, keyword, 4);
        assert_eq!(merged, vec!["text a", "text b"]);
    }

    #[test]
    fn test_merge_truncates_to_k() {
        let vector = vec![hit("a", 0.9), hit("b", 0.8), hit("c", 0.7)];
        assert_eq!(merge_hybrid(vector, Vec::new(), 2).len(), 2);
    }

    #[test]
    fn test_scored_passages_skip_rows_without_text() {
        let rows = vec![
            vec![json!("4:x:1"), json!("Điều 1"), json!(0.8)],
            vec![json!("4:x:2"), Value::Null, json!(0.7)],
        ];
        let hits = scored_passages(&rows);
        assert_eq!(hits, vec![ScoredPassage {
            id: "4:x:1".to_string(),
            text: "Điều 1".to_string(),
            score: 0.8,
        }]);
    }

    #[test]
    fn test_queries_read_configured_text_property() {
        assert!(VECTOR_QUERY.contains("node[$text] AS text"));
        assert!(KEYWORD_QUERY.contains("{limit: $k}"));
    }
}
