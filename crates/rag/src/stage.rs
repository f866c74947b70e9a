//! One prompt bound to a model, ready to be invoked.

use crate::timeouts::llm_call;
use counsel_core::AppResult;
use counsel_llm::{complete_structured, ChatMessage, LlmClient, LlmRequest, OutputSchema};
use counsel_prompt::{build_prompt, BuiltPrompt, PromptDefinition};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// An LLM call site: client, prompt definition and sampling settings.
#[derive(Clone)]
pub struct LlmStage {
    client: Arc<dyn LlmClient>,
    prompt: PromptDefinition,
    model: String,
    temperature: f32,
    top_p: Option<f32>,
    timeout: Duration,
}

impl LlmStage {
    pub fn new(
        client: Arc<dyn LlmClient>,
        prompt: PromptDefinition,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            prompt,
            model: model.into(),
            temperature,
            top_p: None,
            timeout,
        }
    }

    pub fn with_top_p(mut self, top_p: Option<f32>) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn prompt_id(&self) -> &str {
        &self.prompt.id
    }

    fn request(&self, variables: HashMap<String, String>) -> AppResult<LlmRequest> {
        let BuiltPrompt {
            system,
            user,
            metadata,
        } = build_prompt(&self.prompt, variables)?;
        tracing::trace!(
            prompt = %metadata.source_prompt_id,
            "Resolved variables: {:?}",
            metadata.resolved_variables.keys().collect::<Vec<_>>()
        );

        let mut request = LlmRequest::new(user, self.model.clone())
            .with_temperature(self.temperature)
            .with_prompt_id(metadata.source_prompt_id);
        if let Some(system) = system {
            request = request.with_system(system);
        }
        if let Some(top_p) = self.top_p {
            request = request.with_top_p(top_p);
        }
        Ok(request)
    }

    /// Free-text completion, optionally preceded by earlier chat messages.
    pub async fn complete_text(
        &self,
        variables: HashMap<String, String>,
        history: Vec<ChatMessage>,
    ) -> AppResult<String> {
        let request = self.request(variables)?.with_history(history);
        tracing::debug!(
            prompt = %self.prompt.id,
            prompt_chars = request.prompt.chars().count(),
            history = request.history.len(),
            "Invoking LLM"
        );

        let response = llm_call(&self.prompt.id, self.timeout, self.client.complete(&request)).await?;
        Ok(response.content)
    }

    /// Completion parsed into `T`.
    pub async fn complete_structured<T: OutputSchema>(
        &self,
        variables: HashMap<String, String>,
    ) -> AppResult<T> {
        let request = self.request(variables)?;
        tracing::debug!(prompt = %self.prompt.id, schema = T::NAME, "Invoking LLM for structured output");

        llm_call(
            &self.prompt.id,
            self.timeout,
            complete_structured::<T>(self.client.as_ref(), request),
        )
        .await
    }
}

/// Variables map from `(name, value)` pairs.
pub(crate) fn vars<const N: usize>(pairs: [(&str, &str); N]) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
