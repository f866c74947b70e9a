//! Ask command handler.
//!
//! Answers one question, optionally continuing a conversation loaded from a
//! history file.

use super::services::build_advisor;
use anyhow::Context;
use clap::Args;
use counsel_core::{config::AppConfig, AppError, AppResult};
use counsel_rag::ConversationTurn;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Answer a labor-law question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// JSON file with earlier turns as `[["question", "answer"], ...]`
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AskOutput<'a> {
    answer: &'a str,
    /// Seconds spent answering
    processing_time: f64,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let history = match &self.history {
            Some(path) => read_history(path)
                .map_err(|e| AppError::InputValidation(format!("{:#}", e)))?,
            None => Vec::new(),
        };

        let advisor = build_advisor(config)?;

        let started = Instant::now();
        let answer = advisor.answer(&self.question, &history).await?;
        let processing_time = started.elapsed().as_secs_f64();

        if self.json {
            let output = AskOutput {
                answer: &answer,
                processing_time,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", answer);
        }

        Ok(())
    }
}

/// Read conversation turns from a JSON file of `[human, ai]` pairs.
pub(crate) fn read_history(path: &Path) -> anyhow::Result<Vec<ConversationTurn>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;

    let pairs: Vec<(String, String)> = serde_json::from_str(&contents)
        .with_context(|| format!("History file {} is not a list of [question, answer] pairs", path.display()))?;

    Ok(pairs.into_iter().map(ConversationTurn::from).collect())
}
