//! Chat command handler.
//!
//! Reads questions line by line from stdin and keeps the conversation in
//! memory so follow-ups are condensed against earlier turns.

use super::services::build_advisor;
use clap::Args;
use counsel_core::{config::AppConfig, AppResult};
use counsel_rag::ConversationTurn;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

/// Interactive question answering
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Keep only the most recent N turns as history
    #[arg(long, default_value = "10")]
    pub max_turns: usize,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let advisor = build_advisor(config)?;
        let mut history: Vec<ConversationTurn> = Vec::new();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            eprint!("> ");
            std::io::stderr().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if is_exit(question) {
                break;
            }

            match advisor.answer(question, &history).await {
                Ok(answer) => {
                    println!("{}\n", answer);
                    history.push(ConversationTurn::new(question, answer));
                    trim_history(&mut history, self.max_turns);
                }
                Err(e) => {
                    tracing::warn!("Question failed: {}", e);
                    eprintln!("Error: {}", e);
                }
            }
        }

        tracing::info!(turns = history.len(), "Chat ended");
        Ok(())
    }
}

fn is_exit(input: &str) -> bool {
    EXIT_WORDS.iter().any(|w| input.eq_ignore_ascii_case(w))
}

/// Drop the oldest turns beyond `max_turns`.
fn trim_history(history: &mut Vec<ConversationTurn>, max_turns: usize) {
    if history.len() > max_turns {
        let excess = history.len() - max_turns;
        history.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_words() {
        assert!(is_exit("exit"));
        assert!(is_exit("QUIT"));
        assert!(!is_exit("Thoát việc có cần báo trước không?"));
    }

    #[test]
    fn test_trim_history_keeps_latest() {
        let mut history: Vec<ConversationTurn> = (0..5)
            .map(|i| ConversationTurn::new(format!("q{i}"), format!("a{i}")))
            .collect();

        trim_history(&mut history, 2);

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].human, "q3");
        assert_eq!(history[1].human, "q4");
    }
}
