//! Info command handler.
//!
//! Reports the effective configuration and whether the graph database is
//! reachable.

use super::services::graph_client;
use clap::Args;
use counsel_core::{config::AppConfig, AppResult};
use counsel_prompt::list_prompts;
use serde::Serialize;

/// Show configuration and backend status
#[derive(Args, Debug)]
pub struct InfoCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Skip the graph connectivity check
    #[arg(long)]
    pub offline: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoReport {
    status: &'static str,
    provider: String,
    model: String,
    embedding_model: Option<String>,
    llm_configured: bool,
    graph_uri: String,
    graph_database: String,
    /// `None` when the check was skipped
    graph_reachable: Option<bool>,
    vector_index: String,
    keyword_index: String,
    top_k: usize,
    prompt_overrides: Vec<String>,
}

impl InfoReport {
    fn status(llm_configured: bool, graph_reachable: Option<bool>) -> &'static str {
        if llm_configured && graph_reachable != Some(false) {
            "healthy"
        } else {
            "degraded"
        }
    }
}

impl InfoCommand {
    /// Execute the info command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing info command");

        let llm_configured =
            config.provider != "gemini" || config.resolve_api_key(&config.provider).is_some();

        let graph_reachable = if self.offline {
            None
        } else {
            let reachable = match graph_client(config)?.ping().await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Graph check failed: {}", e);
                    false
                }
            };
            Some(reachable)
        };

        let report = InfoReport {
            status: InfoReport::status(llm_configured, graph_reachable),
            provider: config.provider.clone(),
            model: config.model.clone(),
            embedding_model: config.embedding_model.clone(),
            llm_configured,
            graph_uri: config.graph.uri.clone(),
            graph_database: config.graph.database.clone(),
            graph_reachable,
            vector_index: config.vector.index_name.clone(),
            keyword_index: config.vector.keyword_index.clone(),
            top_k: config.vector.top_k,
            prompt_overrides: list_prompts(&config.workspace)?,
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }

        Ok(())
    }
}

fn print_report(report: &InfoReport) {
    println!("Status:          {}", report.status);
    println!("Provider:        {}", report.provider);
    println!("Model:           {}", report.model);
    println!(
        "Embedding model: {}",
        report.embedding_model.as_deref().unwrap_or("(provider default)")
    );
    println!("LLM configured:  {}", report.llm_configured);
    println!("Graph:           {} ({})", report.graph_uri, report.graph_database);
    match report.graph_reachable {
        Some(true) => println!("Graph status:    reachable"),
        Some(false) => println!("Graph status:    unreachable"),
        None => println!("Graph status:    not checked"),
    }
    println!(
        "Vector index:    {} + {} (top {})",
        report.vector_index, report.keyword_index, report.top_k
    );
    if report.prompt_overrides.is_empty() {
        println!("Prompts:         built-in");
    } else {
        println!("Prompts:         {}", report.prompt_overrides.join(", "));
    }
}
