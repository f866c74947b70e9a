//! Wiring of configured backends into [`Services`].

use counsel_core::{config::AppConfig, AppError, AppResult};
use counsel_llm::{create_client, create_embedder};
use counsel_prompt::PromptSet;
use counsel_rag::{
    LegalAdvisor, Neo4jClient, Neo4jGraphStore, Neo4jVectorStore, PipelineSettings, Services,
};
use std::sync::Arc;

/// Neo4j client for the configured graph, using the store timeout.
pub fn graph_client(config: &AppConfig) -> AppResult<Arc<Neo4jClient>> {
    let client = Neo4jClient::from_config(&config.graph, config.pipeline.store_timeout())?;
    tracing::debug!("Neo4j endpoint: {}", client.endpoint());
    Ok(Arc::new(client))
}

/// Build every backend from `config`. Fails before any request is served
/// when a required setting is missing.
pub fn build_services(config: &AppConfig) -> AppResult<Services> {
    config.validate()?;

    let api_key = config.resolve_api_key(&config.provider);
    let endpoint = config.provider_endpoint();

    let llm = create_client(
        &config.provider,
        endpoint,
        api_key.as_deref(),
        Some(config.pipeline.llm_timeout()),
    )
    .map_err(AppError::Config)?;

    let embedder = create_embedder(
        &config.provider,
        config.embedding_model.as_deref(),
        endpoint,
        api_key.as_deref(),
    )
    .map_err(AppError::Config)?;

    let client = graph_client(config)?;
    let graph = Arc::new(Neo4jGraphStore::new(
        client.clone(),
        config.graph.entity_label.clone(),
    ));
    let vector = Arc::new(Neo4jVectorStore::new(
        client,
        embedder,
        config.vector.clone(),
    ));

    let prompts = PromptSet::load(Some(config.workspace.as_path()))?;

    tracing::info!(
        provider = %config.provider,
        model = %config.model,
        "Services ready"
    );

    Ok(Services {
        llm,
        graph,
        vector,
        prompts,
        settings: PipelineSettings::from_config(config),
    })
}

pub fn build_advisor(config: &AppConfig) -> AppResult<LegalAdvisor> {
    build_services(config).map(LegalAdvisor::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_password_fails_before_wiring() {
        let mut config = AppConfig::default();
        config.api_key = Some("key".to_string());
        config.graph.password = None;

        let err = build_services(&config).err().unwrap();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("NEO4J_PASSWORD")));
    }

    #[test]
    fn test_ollama_services_build_without_api_key() {
        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        config.graph.password = Some("secret".to_string());
        config.workspace = std::env::temp_dir();

        let services = build_services(&config).unwrap();
        assert_eq!(services.llm.provider_name(), "ollama");
        assert_eq!(services.settings.graph.index, "entity");
    }
}
