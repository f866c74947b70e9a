//! Minimal Cypher client for the Neo4j HTTP transactional endpoint.

use counsel_core::config::GraphConfig;
use counsel_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Default port of the Neo4j HTTP connector.
const DEFAULT_HTTP_PORT: u16 = 7474;

#[derive(Debug, Serialize)]
struct Statement<'a> {
    statement: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Serialize)]
struct TxRequest<'a> {
    statements: [Statement<'a>; 1],
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<TxResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct TxResult {
    #[serde(default)]
    data: Vec<TxRow>,
}

#[derive(Debug, Deserialize)]
struct TxRow {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    code: String,
    message: String,
}

/// Runs single Cypher statements in auto-commit transactions.
pub struct Neo4jClient {
    http: reqwest::Client,
    endpoint: String,
    username: String,
    password: Option<String>,
}

impl Neo4jClient {
    /// Create a client for `uri` (HTTP(S), `bolt://` or `neo4j://`) and `database`.
    pub fn new(
        uri: &str,
        database: &str,
        username: impl Into<String>,
        password: Option<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let base = http_base_url(uri)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Retrieval(format!("Failed to build Neo4j HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}/db/{}/tx/commit", base, database),
            username: username.into(),
            password,
        })
    }

    pub fn from_config(config: &GraphConfig, timeout: Duration) -> AppResult<Self> {
        Self::new(
            &config.uri,
            &config.database,
            config.username.clone(),
            config.password.clone(),
            timeout,
        )
    }

    /// Transaction endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run `statement` and return its rows.
    pub async fn run(&self, statement: &str, parameters: Value) -> AppResult<Vec<Vec<Value>>> {
        let body = TxRequest {
            statements: [Statement {
                statement,
                parameters: &parameters,
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .basic_auth(&self.username, self.password.as_deref())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to reach Neo4j: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Retrieval(format!(
                "Neo4j HTTP error ({}): {}",
                status, error_text
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to read Neo4j response: {}", e)))?;

        parse_rows(&text)
    }

    /// Check the server is reachable and the credentials are accepted.
    pub async fn ping(&self) -> AppResult<()> {
        self.run("RETURN 1", Value::Object(Default::default()))
            .await
            .map(|_| ())
    }
}

/// Rows of the first result, or the first reported Cypher error.
fn parse_rows(body: &str) -> AppResult<Vec<Vec<Value>>> {
    let parsed: TxResponse = serde_json::from_str(body)
        .map_err(|e| AppError::Retrieval(format!("Malformed Neo4j response: {}", e)))?;

    if let Some(error) = parsed.errors.first() {
        return Err(AppError::Retrieval(format!(
            "Neo4j error {}: {}",
            error.code, error.message
        )));
    }

    Ok(parsed
        .results
        .into_iter()
        .next()
        .map(|result| result.data.into_iter().map(|d| d.row).collect())
        .unwrap_or_default())
}

/// HTTP base URL for a Neo4j connection URI.
///
/// Bolt-style URIs are mapped to the HTTP connector on the same host:
/// `+s`/`+ssc` schemes to `https://host`, plain ones to `http://host:7474`.
pub fn http_base_url(uri: &str) -> AppResult<String> {
    let uri = uri.trim().trim_end_matches('/');
    let (scheme, rest) = uri
        .split_once("://")
        .ok_or_else(|| AppError::Config(format!("Invalid Neo4j URI: {}", uri)))?;

    let host = rest.split(|c: char| c == '/' || c == ':').next().unwrap_or_default();
    if host.is_empty() {
        return Err(AppError::Config(format!("Neo4j URI has no host: {}", uri)));
    }

    match scheme {
        "http" | "https" => Ok(uri.to_string()),
        "bolt+s" | "bolt+ssc" | "neo4j+s" | "neo4j+ssc" => Ok(format!("https://{}", host)),
        "bolt" | "neo4j" => Ok(format!("http://{}:{}", host, DEFAULT_HTTP_PORT)),
        other => Err(AppError::Config(format!(
            "Unsupported Neo4j URI scheme '{}'",
            other
        ))),
    }
}

/// Render a scalar cell as text; `null` and nested values yield `None`.
pub(crate) fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
