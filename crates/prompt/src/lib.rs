//! Prompt system for the labor-law counsel pipeline.
//!
//! This crate provides:
//! - YAML-based prompt definitions
//! - Handlebars rendering of system and user messages
//! - Built-in Vietnamese prompts for every pipeline stage
//! - Workspace overrides under `.counsel/prompts/`

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use builtin::{builtin_prompt, ids, PromptSet, BUILTIN_PROMPT_IDS};
pub use loader::{list_prompts, load_prompt, resolve_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptOutputSpec};
