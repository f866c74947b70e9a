//! Schema-constrained completions.
//!
//! A structured call asks the provider for a single JSON object, appends the
//! declared schema to the system prompt and parses the reply into `T`. A reply
//! that does not fit the schema is an [`AppError::StructuredOutput`]; nothing
//! is defaulted and nothing is retried.

use crate::client::{LlmClient, LlmRequest};
use counsel_core::{AppError, AppResult};
use serde::de::DeserializeOwned;

/// A record type an LLM can be asked to produce.
pub trait OutputSchema: DeserializeOwned {
    /// Short name used in logs and error messages.
    const NAME: &'static str;

    /// JSON Schema describing the expected object.
    fn json_schema() -> serde_json::Value;
}

/// Run `request` as a structured completion and parse the reply into `T`.
pub async fn complete_structured<T: OutputSchema>(
    client: &dyn LlmClient,
    request: LlmRequest,
) -> AppResult<T> {
    let instruction = schema_instruction::<T>()?;
    let system = match request.system {
        Some(ref system) => format!("{}\n\n{}", system, instruction),
        None => instruction,
    };
    let request = LlmRequest {
        system: Some(system),
        ..request
    }
    .with_json_output();

    let response = client.complete(&request).await?;

    let parsed = parse_structured::<T>(&response.content)?;
    tracing::debug!(schema = T::NAME, "Parsed structured output");
    Ok(parsed)
}

fn schema_instruction<T: OutputSchema>() -> AppResult<String> {
    let schema = serde_json::to_string_pretty(&T::json_schema())?;
    Ok(format!(
        "Respond with a single JSON object that conforms to this JSON Schema. \
         Do not add any text outside the JSON object.\n{}",
        schema
    ))
}

/// Parse a model reply into `T`.
///
/// Markdown code fences and text around the outermost JSON object are
/// ignored; everything else must match the schema exactly.
pub fn parse_structured<T: OutputSchema>(raw: &str) -> AppResult<T> {
    let body = extract_json_object(raw).ok_or_else(|| {
        AppError::StructuredOutput(format!(
            "{}: response contains no JSON object: {}",
            T::NAME,
            preview(raw)
        ))
    })?;

    serde_json::from_str::<T>(body).map_err(|e| {
        AppError::StructuredOutput(format!(
            "{}: response does not match schema ({}): {}",
            T::NAME,
            e,
            preview(raw)
        ))
    })
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn preview(raw: &str) -> String {
    const MAX: usize = 120;
    let trimmed = raw.trim();
    match trimmed.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ScriptedLlmClient;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Verdict {
        allowed: bool,
        articles: Vec<String>,
    }

    impl OutputSchema for Verdict {
        const NAME: &'static str = "Verdict";

        fn json_schema() -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "allowed": {"type": "boolean"},
                    "articles": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["allowed", "articles"]
            })
        }
    }

    #[test]
    fn test_parse_plain_and_fenced_json() {
        let plain: Verdict = parse_structured(r#"{"allowed": false, "articles": ["Điều 98"]}"#).unwrap();
        assert!(!plain.allowed);

        let fenced: Verdict =
            parse_structured("```json\n{\"allowed\": true, \"articles\": []}\n```").unwrap();
        assert!(fenced.allowed);
    }

    #[test]
    fn test_missing_field_is_structured_error() {
        let result = parse_structured::<Verdict>(r#"{"allowed": true}"#);
        match result {
            Err(AppError::StructuredOutput(msg)) => assert!(msg.contains("articles")),
            other => panic!("expected StructuredOutput error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_json_is_structured_error() {
        let result = parse_structured::<Verdict>("Xin lỗi, tôi không hiểu.");
        assert!(matches!(result, Err(AppError::StructuredOutput(_))));
    }

    #[tokio::test]
    async fn test_complete_structured_sends_schema() {
        let client = ScriptedLlmClient::new().reply("verdict", r#"{"allowed": true, "articles": ["Điều 35"]}"#);
        let request = LlmRequest::new("Tôi có được nghỉ việc?", "m")
            .with_system("Bạn là luật sư")
            .with_prompt_id("verdict");

        let verdict: Verdict = complete_structured(&client, request).await.unwrap();
        assert_eq!(verdict.articles, vec!["Điều 35".to_string()]);

        let sent = &client.requests()[0];
        assert!(sent.json_output);
        let system = sent.system.as_deref().unwrap();
        assert!(system.starts_with("Bạn là luật sư"));
        assert!(system.contains("\"required\""));
    }
}
