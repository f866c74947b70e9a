//! Retrieval-augmented answering over a Vietnamese labor-law knowledge graph.
//!
//! A request flows through:
//! 1. [`ConversationResolver`] turns a follow-up into a standalone question
//! 2. [`QuestionAnalyzer`], [`EntityExtractor`] and [`VectorRetriever`] run concurrently
//! 3. [`StructuredRetriever`] walks one hop around every matched graph entity
//! 4. [`ContextAssembler`] renders analysis, facts and passages into one block
//! 5. [`AnswerPipeline`] drafts an answer and then refines it
//!
//! External systems are reached only through [`LlmClient`](counsel_llm::LlmClient),
//! [`GraphStore`] and [`VectorStore`], bundled in [`Services`].

pub mod answer;
pub mod context;
pub mod extract;
pub mod fulltext;
pub mod neo4j;
pub mod pipeline;
pub mod resolver;
pub mod stage;
pub mod store;
pub mod structured;
pub mod synonyms;
pub mod timeouts;
pub mod types;
pub mod vector;

#[cfg(test)]
mod tests;

pub use answer::AnswerPipeline;
pub use context::ContextAssembler;
pub use extract::{EntityExtractor, QuestionAnalyzer};
pub use fulltext::{generate_full_text_query, remove_lucene_chars, FullTextQueryBuilder};
pub use neo4j::{Neo4jClient, Neo4jGraphStore, Neo4jVectorStore};
pub use pipeline::{LegalAdvisor, PipelineSettings, Services};
pub use resolver::{ConversationResolver, Resolution};
pub use stage::LlmStage;
pub use store::{Direction, GraphStore, Neighbor, NodeMatch, VectorStore};
pub use structured::{StructuredRetriever, LABOR_KEYWORDS};
pub use synonyms::SynonymTable;
pub use types::{
    AssembledContext, ConversationTurn, Entities, EntitySet, FactTriple, QuestionAnalysis,
};
pub use vector::VectorRetriever;
