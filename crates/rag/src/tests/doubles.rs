//! In-memory graph and vector stores.

use crate::store::{Direction, GraphStore, Neighbor, NodeMatch, VectorStore};
use async_trait::async_trait;
use counsel_core::{AppError, AppResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Graph whose full-text index matches a node when its id contains any query term.
#[derive(Default)]
pub struct FakeGraph {
    nodes: Vec<String>,
    edges: Vec<(String, String, String)>,
    failing_terms: Vec<String>,
    slow_terms: Vec<(String, Duration)>,
    fail_all: bool,
    searches: AtomicUsize,
    traversals: AtomicUsize,
}

impl FakeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `id` findable through the full-text index.
    pub fn node(mut self, id: &str) -> Self {
        self.nodes.push(id.to_string());
        self
    }

    pub fn edge(mut self, subject: &str, relation: &str, object: &str) -> Self {
        self.edges
            .push((subject.to_string(), relation.to_string(), object.to_string()));
        self
    }

    /// Fail searches whose query mentions `term`.
    pub fn fail_search_containing(mut self, term: &str) -> Self {
        self.failing_terms.push(term.to_string());
        self
    }

    /// Delay searches whose lower-cased query mentions `term`.
    pub fn delay_search_containing(mut self, term: &str, delay: Duration) -> Self {
        self.slow_terms.push((term.to_lowercase(), delay));
        self
    }

    pub fn fail_all(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn traversal_count(&self) -> usize {
        self.traversals.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphStore for FakeGraph {
    async fn full_text_search(
        &self,
        _index: &str,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<NodeMatch>> {
        self.searches.fetch_add(1, Ordering::SeqCst);

        let lower = query.to_lowercase();
        let slow = self.slow_terms.iter().find(|(t, _)| lower.contains(t.as_str()));
        if let Some((_, delay)) = slow {
            tokio::time::sleep(*delay).await;
        }

        if self.fail_all || self.failing_terms.iter().any(|t| query.contains(t.as_str())) {
            return Err(AppError::Retrieval("connection refused".to_string()));
        }

        let terms: Vec<String> = query
            .split(" OR ")
            .map(|t| t.trim_end_matches("~2").to_lowercase())
            .collect();

        Ok(self
            .nodes
            .iter()
            .filter(|id| {
                let id = id.to_lowercase();
                terms.iter().any(|t| id.contains(t.as_str()))
            })
            .take(limit)
            .map(|id| NodeMatch {
                node_id: id.clone(),
                score: 1.0,
            })
            .collect())
    }

    async fn traverse_one_hop(
        &self,
        node_id: &str,
        exclude_relation: &str,
        direction: Direction,
        limit: usize,
    ) -> AppResult<Vec<Neighbor>> {
        self.traversals.fetch_add(1, Ordering::SeqCst);

        if self.fail_all {
            return Err(AppError::Retrieval("connection refused".to_string()));
        }

        Ok(self
            .edges
            .iter()
            .filter(|(_, relation, _)| relation != exclude_relation)
            .filter_map(|(subject, relation, object)| {
                let other = match direction {
                    Direction::Outgoing if subject == node_id => object,
                    Direction::Incoming if object == node_id => subject,
                    _ => return None,
                };
                Some(Neighbor {
                    node_id: other.clone(),
                    relation_type: relation.clone(),
                })
            })
            .take(limit)
            .collect())
    }
}

/// Vector store returning fixed passages and recording every query.
#[derive(Default)]
pub struct FakeVectorStore {
    passages: Vec<String>,
    fail: bool,
    queries: Mutex<Vec<String>>,
}

impl FakeVectorStore {
    pub fn new(passages: &[&str]) -> Self {
        Self {
            passages: passages.iter().map(|p| p.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorStore for FakeVectorStore {
    async fn similarity_search(&self, query: &str) -> AppResult<Vec<String>> {
        self.queries.lock().unwrap().push(query.to_string());

        if self.fail {
            return Err(AppError::Retrieval("vector index offline".to_string()));
        }
        Ok(self.passages.clone())
    }
}
