//! Configuration management for the legal counsel workspace.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config files (.counsel/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources override earlier ones.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Providers the LLM factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["gemini", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .counsel/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider ("gemini" or "ollama")
    pub provider: String,

    /// Default model identifier
    pub model: String,

    /// Embedding model identifier (falls back to the provider default)
    pub embedding_model: Option<String>,

    /// API key for the LLM provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Graph database connection
    pub graph: GraphConfig,

    /// Vector index settings
    pub vector: VectorConfig,

    /// Pipeline limits and generation settings
    pub pipeline: PipelineConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Gemini {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Endpoint override for this provider, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Gemini { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint),
        }
    }
}

/// Graph database (Neo4j HTTP endpoint) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// HTTP(S) base URL of the Neo4j server
    pub uri: String,

    pub username: String,

    /// Password, usually supplied through NEO4J_PASSWORD
    #[serde(skip_serializing)]
    pub password: Option<String>,

    pub database: String,

    /// Full-text index over entity ids
    #[serde(rename = "entityIndex")]
    pub entity_index: String,

    /// Node label the entity index covers
    #[serde(rename = "entityLabel")]
    pub entity_label: String,

    /// Document-to-entity link relation, skipped during traversal
    #[serde(rename = "excludedRelation")]
    pub excluded_relation: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "http://localhost:7474".to_string(),
            username: "neo4j".to_string(),
            password: None,
            database: "neo4j".to_string(),
            entity_index: "entity".to_string(),
            entity_label: "__Entity__".to_string(),
            excluded_relation: "MENTIONS".to_string(),
        }
    }
}

/// Vector index settings for passage retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorConfig {
    #[serde(rename = "indexName")]
    pub index_name: String,

    /// Full-text index used for the lexical half of hybrid search
    #[serde(rename = "keywordIndex")]
    pub keyword_index: String,

    #[serde(rename = "nodeLabel")]
    pub node_label: String,

    #[serde(rename = "textProperty")]
    pub text_property: String,

    #[serde(rename = "embeddingProperty")]
    pub embedding_property: String,

    #[serde(rename = "topK")]
    pub top_k: usize,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            index_name: "vector".to_string(),
            keyword_index: "keyword".to_string(),
            node_label: "Document".to_string(),
            text_property: "text".to_string(),
            embedding_property: "embedding".to_string(),
            top_k: 4,
        }
    }
}

/// Limits and sampling settings for the answer pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Per-call timeout for LLM requests, in seconds
    #[serde(rename = "llmTimeoutSecs")]
    pub llm_timeout_secs: u64,

    /// Per-call timeout for graph and vector queries, in seconds
    #[serde(rename = "storeTimeoutSecs")]
    pub store_timeout_secs: u64,

    /// Nodes taken from the full-text index per entity
    #[serde(rename = "entityMatchLimit")]
    pub entity_match_limit: usize,

    /// Traversal rows kept per entity, both directions combined
    #[serde(rename = "traversalRowLimit")]
    pub traversal_row_limit: usize,

    #[serde(rename = "draftTemperature")]
    pub draft_temperature: f32,

    #[serde(rename = "refineTemperature")]
    pub refine_temperature: f32,

    #[serde(rename = "condenseTemperature")]
    pub condense_temperature: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            llm_timeout_secs: 120,
            store_timeout_secs: 30,
            entity_match_limit: 5,
            traversal_row_limit: 50,
            draft_temperature: 0.0,
            refine_temperature: 0.3,
            condense_temperature: 0.0,
        }
    }
}

impl PipelineConfig {
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    graph: Option<GraphConfig>,
    vector: Option<VectorConfig>,
    pipeline: Option<PipelineConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            embedding_model: None,
            api_key: None,
            log_level: None,
            log_json: false,
            verbose: false,
            no_color: false,
            llm: None,
            graph: GraphConfig::default(),
            vector: VectorConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML config file and the environment.
    ///
    /// Environment variables:
    /// - `COUNSEL_WORKSPACE`: Override workspace path
    /// - `COUNSEL_CONFIG`: Path to config file
    /// - `COUNSEL_PROVIDER` / `COUNSEL_MODEL`: LLM provider and model
    /// - `COUNSEL_API_KEY`: API key for the active provider
    /// - `GEMINI_MODEL` / `GEMINI_EMBEDDING_MODEL`: Gemini model names
    /// - `NEO4J_URI`, `NEO4J_USERNAME`, `NEO4J_PASSWORD`, `NEO4J_DATABASE`
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use counsel_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Graph: {}", config.graph.uri);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`AppConfig::load`], with the workspace and config file chosen by
    /// the caller (command-line flags) instead of the environment.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace =
            workspace.or_else(|| std::env::var_os("COUNSEL_WORKSPACE").map(PathBuf::from));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var_os("COUNSEL_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.counsel_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        config.apply_env();

        Ok(config)
    }

    /// Environment variables override YAML config.
    fn apply_env(&mut self) {
        if let Ok(provider) = std::env::var("COUNSEL_PROVIDER") {
            self.provider = provider;
        }

        if let Ok(model) = std::env::var("COUNSEL_MODEL") {
            self.model = model;
        } else if self.provider == "gemini" {
            if let Ok(model) = std::env::var("GEMINI_MODEL") {
                self.model = model;
            }
        }

        if let Ok(model) = std::env::var("GEMINI_EMBEDDING_MODEL") {
            if self.provider == "gemini" {
                self.embedding_model = Some(model);
            }
        }

        if let Ok(key) = std::env::var("COUNSEL_API_KEY") {
            self.api_key = Some(key);
        }

        if let Ok(uri) = std::env::var("NEO4J_URI") {
            self.graph.uri = uri;
        }
        if let Ok(username) = std::env::var("NEO4J_USERNAME") {
            self.graph.username = username;
        }
        if let Ok(password) = std::env::var("NEO4J_PASSWORD") {
            self.graph.password = Some(password);
        }
        if let Ok(database) = std::env::var("NEO4J_DATABASE") {
            self.graph.database = database;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> Result<Self, serde_yaml::Error> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.log_json = json;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                let (model, embedding_model) = match provider_config {
                    ProviderConfig::Gemini {
                        model,
                        embedding_model,
                        ..
                    }
                    | ProviderConfig::Ollama {
                        model,
                        embedding_model,
                        ..
                    } => (model.clone(), embedding_model.clone()),
                };
                result.model = model;
                result.embedding_model = embedding_model;
            }

            result.llm = Some(llm);
        }

        if let Some(graph) = config_file.graph {
            // The password never comes from the file
            let password = result.graph.password.take();
            result.graph = GraphConfig { password, ..graph };
        }

        if let Some(vector) = config_file.vector {
            result.vector = vector;
        }

        if let Some(pipeline) = config_file.pipeline {
            result.pipeline = pipeline;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the environment and files.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .counsel directory.
    pub fn counsel_dir(&self) -> PathBuf {
        self.workspace.join(".counsel")
    }

    /// Get the configuration for a named provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Endpoint override for the active provider.
    pub fn provider_endpoint(&self) -> Option<&str> {
        self.get_provider_config(&self.provider)
            .and_then(ProviderConfig::endpoint)
    }

    /// Resolve the API key for a provider.
    ///
    /// Order: explicit key, the provider's `apiKeyEnv`, then `GEMINI_API_KEY`
    /// for the Gemini provider.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        if let Some(ProviderConfig::Gemini { api_key_env, .. }) = self.get_provider_config(provider)
        {
            if let Ok(key) = std::env::var(api_key_env) {
                return Some(key);
            }
        }

        if provider == "gemini" {
            return std::env::var("GEMINI_API_KEY").ok();
        }

        None
    }

    /// Validate configuration, reporting every missing setting at once.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.as_str();

        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        let mut missing = Vec::new();

        if self.graph.uri.trim().is_empty() {
            missing.push("NEO4J_URI");
        }
        if self.graph.username.trim().is_empty() {
            missing.push("NEO4J_USERNAME");
        }
        if self.graph.password.as_deref().map_or(true, str::is_empty) {
            missing.push("NEO4J_PASSWORD");
        }
        if provider == "gemini" && self.resolve_api_key(provider).is_none() {
            missing.push("GEMINI_API_KEY");
        }

        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "Missing required settings: {}",
                missing.join(", ")
            )));
        }

        let pipeline = &self.pipeline;
        let zero: Vec<&str> = [
            ("entityMatchLimit", pipeline.entity_match_limit as u64),
            ("traversalRowLimit", pipeline.traversal_row_limit as u64),
            ("llmTimeoutSecs", pipeline.llm_timeout_secs),
            ("storeTimeoutSecs", pipeline.store_timeout_secs),
        ]
        .into_iter()
        .filter(|(_, value)| *value == 0)
        .map(|(name, _)| name)
        .collect();

        if !zero.is_empty() {
            return Err(AppError::Config(format!(
                "Pipeline settings must be positive: {}",
                zero.join(", ")
            )));
        }

        Ok(())
    }
}
