//! Request orchestration and the services it depends on.

use crate::answer::AnswerPipeline;
use crate::context::ContextAssembler;
use crate::extract::{EntityExtractor, QuestionAnalyzer};
use crate::fulltext::FullTextQueryBuilder;
use crate::resolver::ConversationResolver;
use crate::stage::LlmStage;
use crate::store::{GraphStore, VectorStore};
use crate::structured::{GraphLookup, StructuredRetriever};
use crate::types::ConversationTurn;
use crate::vector::VectorRetriever;
use counsel_core::{AppConfig, AppError, AppResult};
use counsel_llm::LlmClient;
use counsel_prompt::{PromptDefinition, PromptSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

/// Nucleus sampling used for every generation call.
const DEFAULT_TOP_P: f32 = 0.95;

/// Model and timing parameters for a [`LegalAdvisor`].
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model: String,
    pub top_p: Option<f32>,
    /// Temperature for analysis and entity extraction
    pub extraction_temperature: f32,
    pub condense_temperature: f32,
    pub draft_temperature: f32,
    pub refine_temperature: f32,
    pub llm_timeout: Duration,
    pub store_timeout: Duration,
    pub graph: GraphLookup,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            top_p: Some(DEFAULT_TOP_P),
            extraction_temperature: 0.0,
            condense_temperature: 0.0,
            draft_temperature: 0.0,
            refine_temperature: 0.3,
            llm_timeout: Duration::from_secs(120),
            store_timeout: Duration::from_secs(30),
            graph: GraphLookup::default(),
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let pipeline = &config.pipeline;
        Self {
            model: config.model.clone(),
            top_p: Some(DEFAULT_TOP_P),
            extraction_temperature: 0.0,
            condense_temperature: pipeline.condense_temperature,
            draft_temperature: pipeline.draft_temperature,
            refine_temperature: pipeline.refine_temperature,
            llm_timeout: pipeline.llm_timeout(),
            store_timeout: pipeline.store_timeout(),
            graph: GraphLookup {
                index: config.graph.entity_index.clone(),
                excluded_relation: config.graph.excluded_relation.clone(),
                match_limit: pipeline.entity_match_limit,
                row_limit: pipeline.traversal_row_limit,
                timeout: pipeline.store_timeout(),
            },
        }
    }
}

/// External capabilities a [`LegalAdvisor`] is built from.
///
/// Constructed once and shared read-only by every request.
#[derive(Clone)]
pub struct Services {
    pub llm: Arc<dyn LlmClient>,
    pub graph: Arc<dyn GraphStore>,
    pub vector: Arc<dyn VectorStore>,
    pub prompts: PromptSet,
    pub settings: PipelineSettings,
}

/// Answers labor-law questions from graph facts and document passages.
pub struct LegalAdvisor {
    resolver: ConversationResolver,
    analyzer: QuestionAnalyzer,
    structured: StructuredRetriever,
    vector: VectorRetriever,
    assembler: ContextAssembler,
    answers: AnswerPipeline,
}

impl LegalAdvisor {
    pub fn new(services: Services) -> Self {
        let Services {
            llm,
            graph,
            vector,
            prompts,
            settings,
        } = services;

        let stage = |prompt: PromptDefinition, temperature: f32| {
            LlmStage::new(
                llm.clone(),
                prompt,
                settings.model.clone(),
                temperature,
                settings.llm_timeout,
            )
            .with_top_p(settings.top_p)
        };

        let resolver = ConversationResolver::new(stage(prompts.condense, settings.condense_temperature));
        let analyzer = QuestionAnalyzer::new(stage(prompts.analyze, settings.extraction_temperature));
        let extractor = EntityExtractor::new(stage(prompts.entities, settings.extraction_temperature));
        let answers = AnswerPipeline::new(
            stage(prompts.draft, settings.draft_temperature),
            stage(prompts.refine, settings.refine_temperature),
        );

        Self {
            resolver,
            analyzer,
            structured: StructuredRetriever::new(
                extractor,
                graph,
                FullTextQueryBuilder::default(),
                settings.graph.clone(),
            ),
            vector: VectorRetriever::new(vector, settings.store_timeout),
            assembler: ContextAssembler::new(),
            answers,
        }
    }

    /// Answer `question` given the earlier turns of the conversation.
    ///
    /// A blank question is rejected before any external call is made.
    pub async fn answer(&self, question: &str, history: &[ConversationTurn]) -> AppResult<String> {
        if question.trim().is_empty() {
            return Err(AppError::InputValidation(
                "Question cannot be empty".to_string(),
            ));
        }

        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("answer", %request_id);
        self.run(question, history).instrument(span).await
    }

    async fn run(&self, question: &str, history: &[ConversationTurn]) -> AppResult<String> {
        let started = Instant::now();
        tracing::info!(history = history.len(), "Answering: {}", question);

        let resolved = self.resolver.resolve(question, history).await?;

        let (analysis, extracted, passages) = tokio::try_join!(
            self.analyzer.analyze(&resolved),
            self.structured.extract_entities(&resolved),
            self.vector.retrieve(&resolved),
        )?;

        let facts = self
            .structured
            .retrieve_with_entities(&resolved, extracted, Some(&analysis))
            .await?;

        let context = self
            .assembler
            .assemble(&resolved, &analysis, &facts, &passages);

        let answer = self.answers.run(question, &context).await?;

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Answer complete"
        );
        Ok(answer)
    }
}
