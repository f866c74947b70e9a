//! Graph and vector store capabilities consumed by the retrievers.

use async_trait::async_trait;
use counsel_core::AppResult;
use serde::{Deserialize, Serialize};

/// A node returned by a full-text index lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMatch {
    pub node_id: String,
    pub score: f64,
}

/// The far end of an edge, as seen from the node it was reached from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    pub node_id: String,
    pub relation_type: String,
}

/// Edge direction relative to the starting node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
}

impl Direction {
    /// Both directions, outgoing first.
    pub const BOTH: [Direction; 2] = [Direction::Outgoing, Direction::Incoming];
}

/// Read-only access to the knowledge graph.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Look up nodes in a full-text index, best match first.
    async fn full_text_search(
        &self,
        index: &str,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<NodeMatch>>;

    /// Follow edges one hop from `node_id`, skipping `exclude_relation`.
    async fn traverse_one_hop(
        &self,
        node_id: &str,
        exclude_relation: &str,
        direction: Direction,
        limit: usize,
    ) -> AppResult<Vec<Neighbor>>;
}

/// Passage search over the document index.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Passages most similar to `query`, best first, using the store's top-k.
    async fn similarity_search(&self, query: &str) -> AppResult<Vec<String>>;
}
