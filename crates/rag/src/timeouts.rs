//! Deadlines around external calls.
//!
//! LLM calls that fail or overrun become [`AppError::Generation`], except
//! schema mismatches which keep their own variant. Store calls that overrun
//! become [`AppError::Retrieval`].

use counsel_core::{AppError, AppResult};
use std::future::Future;
use std::time::Duration;

/// Await an LLM call for at most `limit`.
pub async fn llm_call<T, F>(stage: &str, limit: Duration, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(AppError::Llm(msg))) => Err(AppError::Generation(format!("{}: {}", stage, msg))),
        Ok(Err(err)) => Err(err),
        Err(_) => Err(AppError::Generation(format!(
            "{}: no response within {}s",
            stage,
            limit.as_secs_f64()
        ))),
    }
}

/// Await a graph or vector store call for at most `limit`.
pub async fn store_call<T, F>(operation: &str, limit: Duration, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Retrieval(format!(
            "{}: no response within {}s",
            operation,
            limit.as_secs_f64()
        ))),
    }
}
