use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;

use super::super::AppState;
use super::error_response;

#[derive(Debug, Deserialize)]
pub(crate) struct ChatRequest {
    text: String,
}

/// `GET /api/chat`: transcript so far.
///
/// Viewing the chat opens the assistant session when the catalog has
/// tools, so the first question doesn't pay for session setup.
pub(crate) async fn api_chat_get(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state.catalog.snapshot();
    let mut chat = state.chat.lock().await;
    chat.open(catalog.tools());
    Json(serde_json::json!({
        "messages": chat.messages(),
        "connected": chat.is_connected(),
    }))
}

/// `POST /api/chat`: send one user message and wait for the reply.
pub(crate) async fn api_chat_post(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    let catalog = state.catalog.snapshot();
    let mut chat = state.chat.lock().await;
    match chat.send(&req.text, catalog.tools()).await {
        Some(reply) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "reply": reply,
                "messages": chat.messages(),
            })),
        )
            .into_response(),
        None => error_response(StatusCode::BAD_REQUEST, "message text is empty"),
    }
}
