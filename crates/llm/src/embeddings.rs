//! Text embedding providers.
//!
//! Query embeddings feed the vector half of hybrid passage search. The model
//! must match the one the document index was built with.

use crate::providers::gemini::{GeminiContent, DEFAULT_GEMINI_URL};
use crate::providers::ollama::DEFAULT_OLLAMA_URL;
use counsel_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

/// Ollama embedding provider using the local API.
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaEmbedder {
    pub fn new(base_url: Option<&str>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or(DEFAULT_OLLAMA_URL)
                .trim_end_matches('/')
                .to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl Embedder for OllamaEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&OllamaEmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to reach Ollama embeddings: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!(
                "Ollama embeddings error ({}): {}",
                status, error_text
            )));
        }

        let parsed: OllamaEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Ollama embedding: {}", e)))?;

        tracing::debug!(dims = parsed.embedding.len(), "Embedded query with Ollama");
        Ok(parsed.embedding)
    }
}

#[derive(Debug, Serialize)]
struct GeminiEmbeddingRequest {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiEmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct GeminiEmbeddingResponse {
    embedding: GeminiEmbeddingValues,
}

/// Gemini embedding provider (`embedContent`).
pub struct GeminiEmbedder {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiEmbedder {
    pub fn new(base_url: Option<&str>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or(DEFAULT_GEMINI_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Model path segment; accepts both `embedding-001` and `models/embedding-001`.
    fn model_path(&self) -> &str {
        self.model.strip_prefix("models/").unwrap_or(&self.model)
    }
}

#[async_trait::async_trait]
impl Embedder for GeminiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}/models/{}:embedContent", self.base_url, self.model_path());
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GeminiEmbeddingRequest {
                content: GeminiContent::text(None, text),
            })
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to reach Gemini embeddings: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!(
                "Gemini embeddings error ({}): {}",
                status, error_text
            )));
        }

        let parsed: GeminiEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Gemini embedding: {}", e)))?;

        tracing::debug!(dims = parsed.embedding.values.len(), "Embedded query with Gemini");
        Ok(parsed.embedding.values)
    }
}
