//! Knowledge-graph lookups in Cypher.

use super::client::{cell_text, Neo4jClient};
use super::quote_identifier;
use crate::store::{Direction, GraphStore, Neighbor, NodeMatch};
use async_trait::async_trait;
use counsel_core::AppResult;
use serde_json::json;
use std::sync::Arc;

const FULL_TEXT_QUERY: &str = "CALL db.index.fulltext.queryNodes($index, $query, {limit: $limit}) \
     YIELD node, score \
     RETURN node.id AS id, score";

/// [`GraphStore`] over entity nodes identified by their `id` property.
pub struct Neo4jGraphStore {
    client: Arc<Neo4jClient>,
    entity_label: String,
}

impl Neo4jGraphStore {
    pub fn new(client: Arc<Neo4jClient>, entity_label: impl Into<String>) -> Self {
        Self {
            client,
            entity_label: entity_label.into(),
        }
    }

    /// Create the full-text index over entity ids if it does not exist yet.
    pub async fn ensure_entity_index(&self, index: &str) -> AppResult<()> {
        let statement = entity_index_statement(index, &self.entity_label);
        tracing::info!("Ensuring full-text index {} on {}", index, self.entity_label);
        self.client.run(&statement, json!({})).await?;
        Ok(())
    }

    fn traversal_statement(&self, direction: Direction) -> String {
        let label = quote_identifier(&self.entity_label);
        let pattern = match direction {
            Direction::Outgoing => "-[r]->",
            Direction::Incoming => "<-[r]-",
        };
        format!(
            "MATCH (node:{label} {{id: $id}}){pattern}(neighbor) \
             WHERE type(r) <> $excluded \
             RETURN neighbor.id AS id, type(r) AS relation \
             LIMIT $limit"
        )
    }
}

fn entity_index_statement(index: &str, label: &str) -> String {
    format!(
        "CREATE FULLTEXT INDEX {} IF NOT EXISTS FOR (e:{}) ON EACH [e.id]",
        quote_identifier(index),
        quote_identifier(label)
    )
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn full_text_search(
        &self,
        index: &str,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<NodeMatch>> {
        let rows = self
            .client
            .run(
                FULL_TEXT_QUERY,
                json!({"index": index, "query": query, "limit": limit}),
            )
            .await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let node_id = row.first().and_then(cell_text)?;
                let score = row.get(1).and_then(|v| v.as_f64()).unwrap_or(0.0);
                Some(NodeMatch { node_id, score })
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
        let rows = self
            .client
            .run(
                &self.traversal_statement(direction),
                json!({"id": node_id, "excluded": exclude_relation, "limit": limit}),
            )
            .await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                Some(Neighbor {
                    node_id: row.first().and_then(cell_text)?,
                    relation_type: row.get(1).and_then(cell_text)?,
                })
            })
            .collect())
    }
}
