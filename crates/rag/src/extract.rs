//! Structured extraction: entity names and question analysis.

use crate::stage::{vars, LlmStage};
use crate::types::{Entities, QuestionAnalysis};
use counsel_core::AppResult;

/// Extracts entity and legal-concept names mentioned in a question.
pub struct EntityExtractor {
    stage: LlmStage,
}

impl EntityExtractor {
    pub fn new(stage: LlmStage) -> Self {
        Self { stage }
    }

    /// Names as returned by the model, in reply order.
    pub async fn extract(&self, question: &str) -> AppResult<Vec<String>> {
        let entities: Entities = self
            .stage
            .complete_structured(vars([("question", question)]))
            .await?;

        tracing::debug!(count = entities.names.len(), "Extracted entities: {:?}", entities.names);
        Ok(entities.names)
    }
}

/// Classifies a question and lists its key legal concepts.
pub struct QuestionAnalyzer {
    stage: LlmStage,
}

impl QuestionAnalyzer {
    pub fn new(stage: LlmStage) -> Self {
        Self { stage }
    }

    pub async fn analyze(&self, question: &str) -> AppResult<QuestionAnalysis> {
        let analysis: QuestionAnalysis = self
            .stage
            .complete_structured(vars([("question", question)]))
            .await?;

        tracing::info!(
            situational = analysis.is_situational,
            "Question analysis: concepts={:?}",
            analysis.key_legal_concepts
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counsel_core::AppError;
    use counsel_llm::ScriptedLlmClient;
    use counsel_prompt::{ids, PromptSet};
    use std::sync::Arc;
    use std::time::Duration;

    fn stage(client: Arc<ScriptedLlmClient>, id: &str) -> LlmStage {
        let prompts = PromptSet::builtin().unwrap();
        let prompt = if id == ids::ANALYZE {
            prompts.analyze
        } else {
            prompts.entities
        };
        LlmStage::new(client, prompt, "test-model", 0.0, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_extract_entities() {
        let client = Arc::new(
            ScriptedLlmClient::new()
                .reply(ids::ENTITIES, r#"{"names": ["Công ty A", "tiền lương"]}"#),
        );
        let extractor = EntityExtractor::new(stage(client.clone(), ids::ENTITIES));

        let names = extractor.extract("Công ty A nợ tiền lương").await.unwrap();
        assert_eq!(names, vec!["Công ty A".to_string(), "tiền lương".to_string()]);

        let request = &client.requests()[0];
        assert!(request.json_output);
        assert!(request
            .system
            .as_deref()
            .is_some_and(|s| s.contains("\"names\"")));
        assert!(request.prompt.contains("Công ty A nợ tiền lương"));
    }

    #[tokio::test]
    async fn test_extract_rejects_wrong_shape() {
        let client = Arc::new(ScriptedLlmClient::new().reply(ids::ENTITIES, r#"{"entities": []}"#));
        let extractor = EntityExtractor::new(stage(client, ids::ENTITIES));

        let err = extractor.extract("q").await.unwrap_err();
        assert!(matches!(err, AppError::StructuredOutput(_)));
    }

    #[tokio::test]
    async fn test_analyze_question() {
        let client = Arc::new(ScriptedLlmClient::new().reply(
            ids::ANALYZE,
            "```json\n{\"original_question\": \"q\", \"is_situational\": true, \
             \"key_legal_concepts\": [\"làm thêm giờ\"]}\n```",
        ));
        let analyzer = QuestionAnalyzer::new(stage(client, ids::ANALYZE));

        let analysis = analyzer.analyze("q").await.unwrap();
        assert!(analysis.is_situational);
        assert_eq!(analysis.key_legal_concepts, vec!["làm thêm giờ".to_string()]);
    }

    #[tokio::test]
    async fn test_analyze_does_not_default_missing_fields() {
        let client = Arc::new(
            ScriptedLlmClient::new().reply(ids::ANALYZE, r#"{"original_question": "q"}"#),
        );
        let analyzer = QuestionAnalyzer::new(stage(client, ids::ANALYZE));

        assert!(matches!(
            analyzer.analyze("q").await,
            Err(AppError::StructuredOutput(_))
        ));
    }
}
