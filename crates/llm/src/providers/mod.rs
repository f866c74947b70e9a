//! LLM provider implementations.

pub mod gemini;
pub mod mock;
pub mod ollama;

pub use gemini::GeminiClient;
pub use mock::ScriptedLlmClient;
pub use ollama::OllamaClient;
