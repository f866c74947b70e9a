//! Graph facts around the entities a question mentions.

use crate::extract::EntityExtractor;
use crate::fulltext::FullTextQueryBuilder;
use crate::store::{Direction, GraphStore};
use crate::timeouts::store_call;
use crate::types::{EntitySet, FactTriple, QuestionAnalysis};
use counsel_core::{AppError, AppResult};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Labor-law terms added as entities whenever the question contains them.
pub const LABOR_KEYWORDS: &[&str] = &[
    "thời giờ",
    "làm việc",
    "lao động",
    "giờ làm",
    "nghỉ phép",
    "nghỉ lễ",
    "lương",
    "không lương",
    "vi phạm",
    "phạt",
    "chế tài",
    "khiếu nại",
    "quyền lợi",
    "bảo hiểm",
    "hợp đồng",
    "chấm dứt hợp đồng",
];

/// Keywords found in the lower-cased question, in list order.
pub fn matched_keywords(question: &str) -> Vec<&'static str> {
    let lower = question.to_lowercase();
    LABOR_KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| lower.contains(keyword))
        .collect()
}

/// Graph lookup parameters.
#[derive(Debug, Clone)]
pub struct GraphLookup {
    /// Full-text index over entity ids
    pub index: String,
    /// Relation linking documents to entities; never reported as a fact
    pub excluded_relation: String,
    /// Matched nodes kept per entity
    pub match_limit: usize,
    /// Fact rows kept per entity, across both directions and all nodes
    pub row_limit: usize,
    pub timeout: Duration,
}

impl Default for GraphLookup {
    fn default() -> Self {
        Self {
            index: "entity".to_string(),
            excluded_relation: "MENTIONS".to_string(),
            match_limit: 5,
            row_limit: 50,
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct StructuredRetriever {
    extractor: EntityExtractor,
    graph: Arc<dyn GraphStore>,
    queries: FullTextQueryBuilder,
    lookup: GraphLookup,
}

impl StructuredRetriever {
    pub fn new(
        extractor: EntityExtractor,
        graph: Arc<dyn GraphStore>,
        queries: FullTextQueryBuilder,
        lookup: GraphLookup,
    ) -> Self {
        Self {
            extractor,
            graph,
            queries,
            lookup,
        }
    }

    /// Run the entity extraction step on its own.
    pub async fn extract_entities(&self, question: &str) -> AppResult<Vec<String>> {
        self.extractor.extract(question).await
    }

    /// Extract entities from `question`, then collect their graph facts.
    pub async fn retrieve(
        &self,
        question: &str,
        analysis: Option<&QuestionAnalysis>,
    ) -> AppResult<String> {
        let extracted = self.extract_entities(question).await?;
        self.retrieve_with_entities(question, extracted, analysis).await
    }

    /// Collect graph facts for already-extracted entities.
    ///
    /// Rows are newline-separated and grouped by entity in set order. An
    /// entity whose lookup fails is skipped; if every lookup fails the graph
    /// is treated as unavailable.
    pub async fn retrieve_with_entities(
        &self,
        question: &str,
        extracted: Vec<String>,
        analysis: Option<&QuestionAnalysis>,
    ) -> AppResult<String> {
        let entities = entity_set(question, extracted, analysis);
        if entities.is_empty() {
            tracing::info!("No entities to look up in the graph");
            return Ok(String::new());
        }

        tracing::debug!(
            count = entities.len(),
            "Graph entities: {:?}",
            entities.iter().collect::<Vec<_>>()
        );

        let results = join_all(entities.iter().map(|entity| self.facts_for(entity))).await;

        let mut rows = Vec::new();
        let mut failures = Vec::new();
        let mut attempted = 0;
        for (entity, result) in entities.iter().zip(results) {
            match result {
                Ok(None) => tracing::debug!(entity, "Entity has no searchable terms"),
                Ok(Some(facts)) => {
                    attempted += 1;
                    rows.extend(facts.iter().map(ToString::to_string));
                }
                Err(err) => {
                    attempted += 1;
                    tracing::warn!(entity, "Graph lookup failed, skipping entity: {}", err);
                    failures.push(err);
                }
            }
        }

        // only entities that reached the graph count towards an outage
        if attempted > 0 && failures.len() == attempted {
            let detail = failures
                .last()
                .map(ToString::to_string)
                .unwrap_or_default();
            return Err(AppError::Retrieval(format!(
                "Graph lookup failed for all {} searched entities: {}",
                attempted, detail
            )));
        }

        tracing::info!(
            entities = entities.len(),
            facts = rows.len(),
            "Structured retrieval complete"
        );
        Ok(rows.join("\n"))
    }

    /// Facts around `entity`, or `None` when it yields no full-text query.
    async fn facts_for(&self, entity: &str) -> AppResult<Option<Vec<FactTriple>>> {
        let query = self.queries.build(entity);
        if query.is_empty() {
            return Ok(None);
        }

        let matches = store_call(
            "full-text search",
            self.lookup.timeout,
            self.graph
                .full_text_search(&self.lookup.index, &query, self.lookup.match_limit),
        )
        .await?;

        let mut facts = Vec::new();
        'nodes: for node in matches.iter().take(self.lookup.match_limit) {
            for direction in Direction::BOTH {
                let remaining = self.lookup.row_limit.saturating_sub(facts.len());
                if remaining == 0 {
                    break 'nodes;
                }

                let neighbors = store_call(
                    "one-hop traversal",
                    self.lookup.timeout,
                    self.graph.traverse_one_hop(
                        &node.node_id,
                        &self.lookup.excluded_relation,
                        direction,
                        remaining,
                    ),
                )
                .await?;

                facts.extend(neighbors.into_iter().take(remaining).map(|n| match direction {
                    Direction::Outgoing => FactTriple::new(&node.node_id, n.relation_type, n.node_id),
                    Direction::Incoming => FactTriple::new(n.node_id, n.relation_type, &node.node_id),
                }));
            }
        }

        Ok(Some(facts))
    }
}

/// Extracted names, then analysis concepts, then matched keywords.
pub fn entity_set(
    question: &str,
    extracted: Vec<String>,
    analysis: Option<&QuestionAnalysis>,
) -> EntitySet {
    let mut entities: EntitySet = extracted.into_iter().collect();
    if let Some(analysis) = analysis {
        entities.extend(&analysis.key_legal_concepts);
    }
    entities.extend(matched_keywords(question));
    entities
}
