use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::errors::ApiError;
use crate::rag::RagService;

#[derive(Debug, Deserialize)]
pub struct ChatParams {
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatAnswer {
    pub message: String,
}

/// GET /chat?prompt=... — answer a question against the corpus.
pub async fn handle_chat(
    Extension(service): Extension<Arc<RagService>>,
    Query(params): Query<ChatParams>,
) -> Result<Json<ChatAnswer>, ApiError> {
    let prompt = params.prompt.unwrap_or_default();
    let answer = service.answer(&prompt).await.map_err(|err| {
        tracing::error!("chat request failed: {err}");
        ApiError::from(err)
    })?;
    Ok(Json(ChatAnswer { message: answer }))
}

pub async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
