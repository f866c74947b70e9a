//! Two-stage answer generation: a counsel-style draft, then a refinement.

use crate::stage::{vars, LlmStage};
use crate::types::AssembledContext;
use counsel_core::{AppError, AppResult};

pub struct AnswerPipeline {
    draft: LlmStage,
    refine: LlmStage,
}

impl AnswerPipeline {
    pub fn new(draft: LlmStage, refine: LlmStage) -> Self {
        Self { draft, refine }
    }

    /// Draft from the retrieved context, then refine the draft.
    pub async fn run(&self, question: &str, context: &AssembledContext) -> AppResult<String> {
        let draft = self.draft(question, context).await?;
        self.refine(question, &draft).await
    }

    /// Stage one: a cited analysis grounded in `context`.
    pub async fn draft(&self, question: &str, context: &AssembledContext) -> AppResult<String> {
        let text = self
            .draft
            .complete_text(
                vars([("context", context.as_str()), ("question", question)]),
                Vec::new(),
            )
            .await?;

        let text = non_blank("draft", text)?;
        tracing::info!(chars = text.chars().count(), "Draft answer generated");
        Ok(text)
    }

    /// Stage two: verdict, citations and advice, from the draft alone.
    pub async fn refine(&self, question: &str, draft: &str) -> AppResult<String> {
        let text = self
            .refine
            .complete_text(
                vars([("question", question), ("initial_response", draft)]),
                Vec::new(),
            )
            .await?;

        let text = non_blank("refine", text)?;
        tracing::info!(chars = text.chars().count(), "Final answer generated");
        Ok(text)
    }
}

fn non_blank(stage: &str, text: String) -> AppResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::Generation(format!(
            "{} stage returned an empty answer",
            stage
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use counsel_llm::ScriptedLlmClient;
    use counsel_prompt::{ids, PromptSet};
    use std::sync::Arc;
    use std::time::Duration;

    fn pipeline(client: Arc<ScriptedLlmClient>) -> AnswerPipeline {
        let prompts = PromptSet::builtin().unwrap();
        let timeout = Duration::from_secs(5);
        AnswerPipeline::new(
            LlmStage::new(client.clone(), prompts.draft, "m", 0.0, timeout),
            LlmStage::new(client, prompts.refine, "m", 0.3, timeout),
        )
    }

    fn context() -> AssembledContext {
        AssembledContext::new("Câu hỏi gốc: q\n\nDữ liệu có cấu trúc:\nĐiều 107".to_string())
    }

    #[tokio::test]
    async fn test_refine_receives_draft() {
        let client = Arc::new(
            ScriptedLlmClient::new()
                .reply(ids::DRAFT, "Theo Điều 107 của bộ Luật Lao Động...")
                .reply_with(ids::REFINE, |req| {
                    Ok(format!("Có. {}", req.prompt.contains("Theo Điều 107")))
                }),
        );
        let answer = pipeline(client.clone())
            .run("Làm thêm giờ?", &context())
            .await
            .unwrap();

        assert_eq!(answer, "Có. true");
        assert_eq!(client.count_for(ids::DRAFT), 1);
        assert_eq!(client.count_for(ids::REFINE), 1);

        let requests = client.requests();
        assert!(requests[0].prompt.contains("Điều 107"));
        assert!(requests[0].prompt.contains("Câu hỏi: Làm thêm giờ?"));
        assert_eq!(requests[1].temperature, Some(0.3));
    }

    #[tokio::test]
    async fn test_draft_failure_skips_refine() {
        let client = Arc::new(
            ScriptedLlmClient::new()
                .fail(ids::DRAFT, "overloaded")
                .reply(ids::REFINE, "never"),
        );

        let err = pipeline(client.clone())
            .run("q", &context())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Generation(_)));
        assert_eq!(client.count_for(ids::REFINE), 0);
    }

    #[tokio::test]
    async fn test_refine_failure_returns_no_partial_answer() {
        let client = Arc::new(
            ScriptedLlmClient::new()
                .reply(ids::DRAFT, "nháp")
                .fail(ids::REFINE, "overloaded"),
        );

        assert!(matches!(
            pipeline(client).run("q", &context()).await,
            Err(AppError::Generation(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_draft_is_generation_error() {
        let client = Arc::new(ScriptedLlmClient::new().reply(ids::DRAFT, "\n  \n"));

        assert!(matches!(
            pipeline(client).draft("q", &context()).await,
            Err(AppError::Generation(_))
        ));
    }
}
