use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;
use crate::upstream::types::ChatMessage;

pub const CHAT_FAILURE_MESSAGE: &str = "Failed to process request";

#[derive(Debug, Deserialize)]
pub struct ChatPayload {
    pub messages: Vec<ChatMessage>,
}

/// `POST /api/chat`.
///
/// The body is decoded by hand so that malformed JSON takes the same
/// `{ "error": ... }` 500 path as every other failure on this route.
pub async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match relay_chat(&state, &body).await {
        Ok(text) => Json(json!({ "response": text })).into_response(),
        Err(err) => err.respond(StatusCode::INTERNAL_SERVER_ERROR, CHAT_FAILURE_MESSAGE),
    }
}

async fn relay_chat(state: &AppState, body: &[u8]) -> Result<String, ApiError> {
    let payload: ChatPayload = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid chat payload: {}", e)))?;
    tracing::info!(
        turns = payload.messages.len(),
        mode = state.chat.mode().as_str(),
        "Relaying chat request"
    );
    state.chat.respond(&payload.messages).await
}
