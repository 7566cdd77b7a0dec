pub(crate) mod catalog;
pub(crate) mod chat;
pub(crate) mod health;
pub(crate) mod tools;

use axum::{http::StatusCode, response::IntoResponse, Json};

/// `{ "error": message }` with `status`.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}
