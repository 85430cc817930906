use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};

use super::error::ApiError;
use super::state::AppState;
use crate::pipeline::{TranscriptionRequest, TranscriptionResult};

pub async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// `POST /transcribir`: captions when available, speech recognition otherwise
pub async fn transcribe(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TranscriptionResult>, ApiError> {
    let request = TranscriptionRequest::from_body(&body);

    let Some(url) = request.url().map(str::to_string) else {
        return Err(ApiError::BadRequest("No URL provided".to_string()));
    };
    let lang = request.lang_or(&state.default_lang).to_string();

    tracing::info!(url = %url, lang = %lang, "Transcription requested");

    // Run detached so a client disconnect does not abort uploads or jobs mid-way
    let orchestrator = state.orchestrator.clone();
    let task = tokio::spawn(async move { orchestrator.transcribe(&url, &lang).await });

    match task.await {
        Ok(result) => Ok(Json(result?)),
        Err(e) => Err(ApiError::Internal(format!("Transcription task failed: {}", e))),
    }
}
