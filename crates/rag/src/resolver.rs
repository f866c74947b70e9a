//! Turns a follow-up question into a standalone one.

use crate::stage::{vars, LlmStage};
use crate::types::ConversationTurn;
use counsel_core::{AppError, AppResult};

/// How a question is resolved against its history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// No history: the question already stands alone.
    Passthrough,
    /// Earlier turns exist: ask the model to fold them into the question.
    Condense(&'a [ConversationTurn]),
}

impl<'a> Resolution<'a> {
    pub fn select(history: &'a [ConversationTurn]) -> Self {
        if history.is_empty() {
            Resolution::Passthrough
        } else {
            Resolution::Condense(history)
        }
    }
}

pub struct ConversationResolver {
    condense: LlmStage,
}

impl ConversationResolver {
    pub fn new(condense: LlmStage) -> Self {
        Self { condense }
    }

    /// Standalone form of `question`.
    pub async fn resolve(&self, question: &str, history: &[ConversationTurn]) -> AppResult<String> {
        match Resolution::select(history) {
            Resolution::Passthrough => Ok(question.to_string()),
            Resolution::Condense(turns) => self.condense(question, turns).await,
        }
    }

    async fn condense(&self, question: &str, turns: &[ConversationTurn]) -> AppResult<String> {
        let messages = turns.iter().flat_map(ConversationTurn::to_messages).collect();

        let condensed = self
            .condense
            .complete_text(vars([("question", question)]), messages)
            .await?;
        let condensed = condensed.trim();

        if condensed.is_empty() {
            return Err(AppError::Generation(
                "Condensed question is empty".to_string(),
            ));
        }

        tracing::info!(
            turns = turns.len(),
            "Condensed follow-up into: {}",
            condensed
        );
        Ok(condensed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counsel_llm::{ChatRole, ScriptedLlmClient};
    use counsel_prompt::{ids, PromptSet};
    use std::sync::Arc;
    use std::time::Duration;

    fn resolver(client: Arc<ScriptedLlmClient>) -> ConversationResolver {
        let prompts = PromptSet::builtin().unwrap();
        ConversationResolver::new(LlmStage::new(
            client,
            prompts.condense,
            "test-model",
            0.0,
            Duration::from_secs(5),
        ))
    }

    #[test]
    fn test_select_variant() {
        assert_eq!(Resolution::select(&[]), Resolution::Passthrough);

        let history = [ConversationTurn::new("a", "b")];
        assert!(matches!(
            Resolution::select(&history),
            Resolution::Condense(turns) if turns.len() == 1
        ));
    }

    #[tokio::test]
    async fn test_empty_history_returns_question_without_llm_call() {
        let client = Arc::new(ScriptedLlmClient::new());
        let resolver = resolver(client.clone());

        let resolved = resolver.resolve("Lương tối thiểu vùng là bao nhiêu?", &[]).await.unwrap();

        assert_eq!(resolved, "Lương tối thiểu vùng là bao nhiêu?");
        assert_eq!(client.request_count(), 0);
    }

    #[tokio::test]
    async fn test_history_condenses_with_one_call() {
        let client = Arc::new(ScriptedLlmClient::new().reply(
            ids::CONDENSE,
            "  Tôi bị công ty nợ lương thì tôi có thể làm gì?\n",
        ));
        let resolver = resolver(client.clone());
        let history = [ConversationTurn::new("Tôi bị nợ lương", "Bạn nên liên hệ công ty.")];

        let resolved = resolver.resolve("Tôi có thể làm gì?", &history).await.unwrap();

        assert_eq!(resolved, "Tôi bị công ty nợ lương thì tôi có thể làm gì?");
        assert_eq!(client.request_count(), 1);

        let request = &client.requests()[0];
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.history[0].role, ChatRole::User);
        assert_eq!(request.history[0].content, "Tôi bị nợ lương");
        assert_eq!(request.history[1].role, ChatRole::Assistant);
        assert!(request.prompt.contains("Tôi có thể làm gì?"));
        assert!(request.system.is_some());
    }

    #[tokio::test]
    async fn test_llm_failure_is_generation_error() {
        let client = Arc::new(ScriptedLlmClient::new().fail(ids::CONDENSE, "unavailable"));
        let resolver = resolver(client);
        let history = [ConversationTurn::new("a", "b")];

        let err = resolver.resolve("c", &history).await.unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[tokio::test]
    async fn test_blank_condensation_is_rejected() {
        let client = Arc::new(ScriptedLlmClient::new().reply(ids::CONDENSE, "   "));
        let resolver = resolver(client);
        let history = [ConversationTurn::new("a", "b")];

        assert!(matches!(
            resolver.resolve("c", &history).await,
            Err(AppError::Generation(_))
        ));
    }
}
