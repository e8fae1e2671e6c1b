use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::assist::{proofread, suggest_questions};
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ProofreadRequest {
    pub text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofreadResponse {
    pub corrected_text: String,
}

#[derive(Deserialize)]
pub struct QuestionsRequest {
    #[serde(rename = "selfPR")]
    pub self_pr: String,
}

#[derive(Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<String>,
}

/// Body of the combined endpoint: whichever field is non-empty picks the
/// operation, `text` first.
#[derive(Deserialize)]
pub struct AssistRequest {
    pub text: Option<String>,
    #[serde(rename = "selfPR")]
    pub self_pr: Option<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum AssistResponse {
    Proofread(ProofreadResponse),
    Questions(QuestionsResponse),
}

fn generator(state: &AppState) -> Result<(Arc<dyn TextGenerator>, Duration), AppError> {
    let generator = state
        .assistant
        .clone()
        .ok_or_else(|| AppError::Unavailable("Text generation is not configured".into()))?;
    Ok((generator, Duration::from_secs(state.config.ai_timeout_secs)))
}

/// POST /api/proofread
pub async fn handle_proofread(
    State(state): State<AppState>,
    Json(req): Json<ProofreadRequest>,
) -> Result<Json<ProofreadResponse>, AppError> {
    let (generator, budget) = generator(&state)?;
    let corrected_text = proofread(generator.as_ref(), &req.text, budget).await?;
    Ok(Json(ProofreadResponse { corrected_text }))
}

/// POST /api/questions
pub async fn handle_questions(
    State(state): State<AppState>,
    Json(req): Json<QuestionsRequest>,
) -> Result<Json<QuestionsResponse>, AppError> {
    let (generator, budget) = generator(&state)?;
    let questions = suggest_questions(generator.as_ref(), &req.self_pr, budget).await?;
    Ok(Json(QuestionsResponse { questions }))
}

/// POST /api
pub async fn handle_assist(
    State(state): State<AppState>,
    Json(req): Json<AssistRequest>,
) -> Result<Json<AssistResponse>, AppError> {
    let (generator, budget) = generator(&state)?;

    if let Some(text) = req.text.filter(|t| !t.is_empty()) {
        let corrected_text = proofread(generator.as_ref(), &text, budget).await?;
        return Ok(Json(AssistResponse::Proofread(ProofreadResponse {
            corrected_text,
        })));
    }
    if let Some(self_pr) = req.self_pr {
        let questions = suggest_questions(generator.as_ref(), &self_pr, budget).await?;
        return Ok(Json(AssistResponse::Questions(QuestionsResponse { questions })));
    }

    Err(AppError::Validation(
        "Request must contain either 'text' or 'selfPR'".into(),
    ))
}
