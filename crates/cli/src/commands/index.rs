//! Index command handler.

use super::services::graph_client;
use clap::Args;
use counsel_core::{config::AppConfig, AppResult};
use counsel_rag::Neo4jGraphStore;

/// Create the full-text index used to match question entities
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// Index name (default: graph.entityIndex from config)
    #[arg(long)]
    pub name: Option<String>,
}

impl IndexCommand {
    /// Execute the index command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing index command");

        let index = self
            .name
            .clone()
            .unwrap_or_else(|| config.graph.entity_index.clone());

        let graph = Neo4jGraphStore::new(graph_client(config)?, config.graph.entity_label.clone());
        graph.ensure_entity_index(&index).await?;

        println!(
            "Full-text index '{}' ready on :{}",
            index, config.graph.entity_label
        );
        Ok(())
    }
}
