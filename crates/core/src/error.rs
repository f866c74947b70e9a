//! Error types for the legal counsel workspace.
//!
//! A single error enum covers the request pipeline failures (input
//! validation, structured output, retrieval, generation) as well as the
//! ambient categories (configuration, I/O, prompts, serialization).

use thiserror::Error;

/// Unified error type for the legal counsel workspace.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Empty or blank question, rejected before any pipeline work
    #[error("Invalid input: {0}")]
    InputValidation(String),

    /// LLM structured response did not match the declared schema
    #[error("Structured output error: {0}")]
    StructuredOutput(String),

    /// Graph or vector store failure that the pipeline cannot absorb
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Draft, refine or condensation call failed or timed out
    #[error("Generation error: {0}")]
    Generation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider transport errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_their_category() {
        let err = AppError::InputValidation("Question cannot be empty".to_string());
        assert_eq!(err.to_string(), "Invalid input: Question cannot be empty");

        let err = AppError::StructuredOutput("missing field `names`".to_string());
        assert!(err.to_string().starts_with("Structured output error"));
    }

    #[test]
    fn test_json_error_converts_to_serialization() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: AppError = parse.unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
