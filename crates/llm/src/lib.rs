//! LLM integration crate for the legal counsel workspace.
//!
//! This crate provides a provider-agnostic abstraction for interacting with
//! Large Language Models. It supports multiple providers through a unified
//! trait-based interface, plus schema-constrained completions and query
//! embeddings.
//!
//! # Providers
//! - **Gemini**: Google Generative Language API (default)
//! - **Ollama**: Local LLM runtime
//! - **Scripted**: deterministic replies keyed by prompt id, for tests
//!
//! # Example
//! ```no_run
//! use counsel_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Thời giờ làm việc tối đa là bao nhiêu?", "qwen2.5");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod embeddings;
pub mod factory;
pub mod providers;
pub mod structured;
pub mod types;

// Re-export main types
pub use client::{ChatMessage, ChatRole, LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use embeddings::Embedder;
pub use factory::{create_client, create_embedder};
pub use providers::{GeminiClient, OllamaClient, ScriptedLlmClient};
pub use structured::{complete_structured, parse_structured, OutputSchema};
pub use types::ProviderType;
