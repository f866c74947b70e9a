//! Scripted LLM client for tests and offline runs.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use counsel_core::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

type Responder = Arc<dyn Fn(&LlmRequest) -> AppResult<String> + Send + Sync>;


/// LLM client that answers from a script keyed by prompt id.
///
/// Replies are looked up by [`LlmRequest::prompt_id`], so concurrent callers
/// get the same answers regardless of call order. Every request is logged.
#[derive(Default)]
pub struct ScriptedLlmClient {
    scripts: HashMap<String, Responder>,
    delays: HashMap<String, Duration>,
    request_log: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests for `prompt_id` with fixed text.
    pub fn reply(self, prompt_id: &str, text: impl Into<String>) -> Self {
        let text = text.into();
        self.reply_with(prompt_id, move |_| Ok(text.clone()))
    }

    /// Answer requests for `prompt_id` with a function of the request.
    pub fn reply_with<F>(mut self, prompt_id: &str, responder: F) -> Self
    where
        F: Fn(&LlmRequest) -> AppResult<String> + Send + Sync + 'static,
    {
        self.scripts
            .insert(prompt_id.to_string(), Arc::new(responder));
        self
    }

    /// Fail requests for `prompt_id` with a provider error.
    pub fn fail(self, prompt_id: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        self.reply_with(prompt_id, move |_| Err(AppError::Llm(message.clone())))
    }

    /// Sleep before answering `prompt_id`, for timeout tests.
    ///
    /// Independent of the reply, so it may be set before or after it.
    pub fn delay(mut self, prompt_id: &str, delay: Duration) -> Self {
        self.delays.insert(prompt_id.to_string(), delay);
        self
    }

    /// All requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.log().clone()
    }

    pub fn request_count(&self) -> usize {
        self.log().len()
    }

    /// Number of requests built from the given prompt id.
    pub fn count_for(&self, prompt_id: &str) -> usize {
        self.log()
            .iter()
            .filter(|r| r.prompt_id.as_deref() == Some(prompt_id))
            .count()
    }

    fn log(&self) -> MutexGuard<'_, Vec<LlmRequest>> {
        self.request_log
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlmClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.log().push(request.clone());

        let prompt_id = request.prompt_id.as_deref().unwrap_or("<none>");
        if let Some(delay) = self.delays.get(prompt_id) {
            tokio::time::sleep(*delay).await;
        }

        let responder = self.scripts.get(prompt_id).ok_or_else(|| {
            AppError::Llm(format!("ScriptedLlmClient: no reply scripted for '{}'", prompt_id))
        })?;

        let content = responder(request)?;

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
            done: true,
        })
    }
}
