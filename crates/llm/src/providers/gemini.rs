//! Google Gemini LLM provider implementation.
//!
//! Talks to the `generateContent` endpoint of the Generative Language API.
//! System prompts travel as `systemInstruction`; prior assistant turns use the
//! `model` role.

use crate::client::{ChatRole, LlmClient, LlmRequest, LlmResponse, LlmUsage};
use counsel_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Generative Language API base URL.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GeminiPart {
    pub(crate) text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub(crate) role: Option<String>,
    pub(crate) parts: Vec<GeminiPart>,
}

impl GeminiContent {
    pub(crate) fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![GeminiPart { text: text.into() }],
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: GeminiUsage,
    #[serde(default)]
    model_version: Option<String>,
}

/// Gemini LLM client.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client against the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_GEMINI_URL, api_key)
    }

    /// Create a client against a custom endpoint (proxies, regional hosts).
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client whose HTTP requests give up after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to create HTTP client for Gemini: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn to_gemini_request(&self, request: &LlmRequest) -> GeminiRequest {
        let mut contents = Vec::with_capacity(request.history.len() + 1);

        for message in &request.history {
            let role = match message.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "model",
            };
            contents.push(GeminiContent::text(Some(role), message.content.clone()));
        }
        contents.push(GeminiContent::text(Some("user"), request.prompt.clone()));

        GeminiRequest {
            system_instruction: request
                .system
                .as_ref()
                .map(|system| GeminiContent::text(None, system.clone())),
            contents,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                top_p: request.top_p,
                max_output_tokens: request.max_tokens,
                response_mime_type: request
                    .json_output
                    .then(|| "application/json".to_string()),
            },
        }
    }

    fn convert_response(&self, response: GeminiResponse, model: &str) -> AppResult<LlmResponse> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("Gemini returned no candidates".to_string()))?;

        let content = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if content.is_empty() {
            return Err(AppError::Llm(format!(
                "Gemini returned an empty candidate (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(LlmResponse {
            content,
            model: response.model_version.unwrap_or_else(|| model.to_string()),
            usage: LlmUsage::new(
                response.usage_metadata.prompt_token_count,
                response.usage_metadata.candidates_token_count,
            ),
            done: true,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for GeminiClient {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!(prompt_id = ?request.prompt_id, model = %request.model, "Sending completion request to Gemini");

        let body = self.to_gemini_request(request);
        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Gemini: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Gemini response: {}", e)))?;

        let converted = self.convert_response(gemini_response, &request.model)?;
        tracing::info!(
            total_tokens = converted.usage.total_tokens,
            "Received completion from Gemini"
        );

        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatMessage;

    #[test]
    fn test_request_maps_roles_and_system() {
        let client = GeminiClient::new("key");
        let request = LlmRequest::new("Câu hỏi mới", "gemini-2.0-flash")
            .with_system("Tạo câu hỏi độc lập")
            .with_history(vec![
                ChatMessage::user("Tôi bị nợ lương"),
                ChatMessage::assistant("..."),
            ])
            .with_json_output();

        let body = client.to_gemini_request(&request);
        let roles: Vec<_> = body
            .contents
            .iter()
            .map(|c| c.role.clone().unwrap_or_default())
            .collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert_eq!(
            body.system_instruction.unwrap().parts[0].text,
            "Tạo câu hỏi độc lập"
        );
        assert_eq!(
            body.generation_config.response_mime_type.as_deref(),
            Some("application/json")
        );
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let client = GeminiClient::new("key");
        let request = LlmRequest::new("x", "gemini-2.0-flash")
            .with_temperature(0.3)
            .with_max_tokens(256);

        let json = serde_json::to_value(client.to_gemini_request(&request)).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 256);
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_response_joins_parts() {
        let client = GeminiClient::new("key");
        let raw = r#"{
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Theo Điều 98 "}, {"text": "của bộ Luật Lao Động"}]}, "finishReason": "STOP"}],
            "usageMetadata": {"promptTokenCount": 20, "candidatesTokenCount": 8}
        }"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        let response = client.convert_response(parsed, "gemini-2.0-flash").unwrap();

        assert_eq!(response.content, "Theo Điều 98 của bộ Luật Lao Động");
        assert_eq!(response.model, "gemini-2.0-flash");
        assert_eq!(response.usage.total_tokens, 28);
    }

    #[test]
    fn test_blocked_response_is_error() {
        let client = GeminiClient::new("key");
        let raw = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        let err = client.convert_response(parsed, "m").unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
