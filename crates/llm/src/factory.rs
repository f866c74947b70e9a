//! LLM provider factory.
//!
//! Creates completion and embedding clients from a provider name, an optional
//! endpoint override and the resolved API key.

use crate::client::LlmClient;
use crate::embeddings::{Embedder, GeminiEmbedder, OllamaEmbedder};
use crate::providers::gemini::DEFAULT_GEMINI_URL;
use crate::providers::ollama::DEFAULT_OLLAMA_URL;
use crate::providers::{GeminiClient, OllamaClient};
use crate::types::ProviderType;
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required by Gemini)
/// * `timeout` - Optional HTTP timeout applied to every request
///
/// # Errors
/// Returns error if the provider is unknown, a required key is missing or
/// the HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Option<Duration>,
) -> Result<Arc<dyn LlmClient>, String> {
    match ProviderType::parse(provider) {
        Some(ProviderType::Ollama) => {
            let base_url = endpoint.unwrap_or(DEFAULT_OLLAMA_URL);
            match timeout {
                Some(timeout) => OllamaClient::with_timeout(base_url, timeout)
                    .map(|c| Arc::new(c) as Arc<dyn LlmClient>)
                    .map_err(|e| e.to_string()),
                None => Ok(Arc::new(OllamaClient::with_base_url(base_url))),
            }
        }
        Some(ProviderType::Gemini) => {
            let api_key = api_key.ok_or_else(|| "Gemini provider requires API key".to_string())?;
            let base_url = endpoint.unwrap_or(DEFAULT_GEMINI_URL);
            match timeout {
                Some(timeout) => GeminiClient::with_timeout(base_url, api_key, timeout)
                    .map(|c| Arc::new(c) as Arc<dyn LlmClient>)
                    .map_err(|e| e.to_string()),
                None => Ok(Arc::new(GeminiClient::with_base_url(base_url, api_key))),
            }
        }
        None => Err(format!("Unknown provider: {}", provider)),
    }
}

/// Create an embedding client for the provider.
///
/// `model` falls back to the provider's default embedding model.
pub fn create_embedder(
    provider: &str,
    model: Option<&str>,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> Result<Arc<dyn Embedder>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;
    let model = model.unwrap_or(provider_type.default_embedding_model());

    match provider_type {
        ProviderType::Ollama => Ok(Arc::new(OllamaEmbedder::new(endpoint, model))),
        ProviderType::Gemini => {
            let api_key =
                api_key.ok_or_else(|| "Gemini embeddings require an API key".to_string())?;
            Ok(Arc::new(GeminiEmbedder::new(endpoint, api_key, model)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint_and_timeout() {
        let client = create_client(
            "ollama",
            Some("http://localhost:8080"),
            None,
            Some(Duration::from_secs(5)),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_gemini_requires_api_key() {
        match create_client("gemini", None, None, None) {
            Err(err) => assert!(err.contains("requires API key")),
            Ok(_) => panic!("Expected error for Gemini without API key"),
        }
    }

    #[test]
    fn test_create_gemini_client() {
        let client = create_client("gemini", None, Some("key"), None).unwrap();
        assert_eq!(client.provider_name(), "gemini");
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None, None) {
            Err(err) => assert!(err.contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }

    #[test]
    fn test_embedder_default_models() {
        let ollama = create_embedder("ollama", None, None, None).unwrap();
        assert_eq!(ollama.model_name(), "nomic-embed-text");

        let gemini = create_embedder("gemini", Some("text-embedding-004"), None, Some("k")).unwrap();
        assert_eq!(gemini.model_name(), "text-embedding-004");

        assert!(create_embedder("gemini", None, None, None).is_err());
    }
}
