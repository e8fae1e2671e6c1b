//! Generative-text helpers: proofreading and interview-question suggestions.
//!
//! Both operations run under a fixed time budget and are never retried.

pub mod handlers;
pub mod prompts;

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::{call_with_timeout, strip_code_fences, TextGenerator};

static NUMBERED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.").expect("numbered line pattern"));

/// Returns the corrected version of `text`.
pub async fn proofread(
    generator: &dyn TextGenerator,
    text: &str,
    budget: Duration,
) -> Result<String, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("Text is required".into()));
    }

    let prompt = prompts::proofread_prompt(text);
    let raw = call_with_timeout(budget, generator.generate(&prompt)).await?;
    let corrected = strip_code_fences(&raw).to_string();

    info!(
        "Proofread {} chars -> {} chars",
        text.chars().count(),
        corrected.chars().count()
    );
    Ok(corrected)
}

/// Returns interview questions a reader of `self_pr` would likely ask.
pub async fn suggest_questions(
    generator: &dyn TextGenerator,
    self_pr: &str,
    budget: Duration,
) -> Result<Vec<String>, AppError> {
    if self_pr.trim().is_empty() {
        return Err(AppError::Validation("自己PRが入力されていません".into()));
    }

    let prompt = prompts::questions_prompt(self_pr);
    let raw = call_with_timeout(budget, generator.generate(&prompt)).await?;
    let questions = filter_generated_questions(&raw);

    info!("Generated {} interview questions", questions.len());
    Ok(questions)
}

/// Keeps trimmed, non-empty lines that are not numbered and contain a
/// question mark (ASCII or full-width).
pub fn filter_generated_questions(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !NUMBERED_LINE.is_match(line))
        .filter(|line| line.contains('?') || line.contains('？'))
        .map(str::to_string)
        .collect()
}
