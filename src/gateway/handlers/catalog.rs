use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::warn;

use super::super::AppState;
use super::error_response;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RefreshRequest {
    /// New sheet URL. Saved to the config when ingestion succeeds.
    #[serde(default)]
    url: Option<String>,
}

/// `POST /api/catalog/refresh`: re-ingest the catalog sheet.
///
/// Uses the URL from the body, or the configured one. On failure the
/// current snapshot stays in place and the response is `502`.
pub(crate) async fn api_catalog_refresh(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let req: RefreshRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RefreshRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(r) => r,
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, format!("validation: {e}"));
            }
        }
    };

    let requested = req.url.filter(|u| !u.trim().is_empty());
    let url = match requested.clone() {
        Some(u) => u,
        None => match state.config.lock().await.catalog.sheet_url.clone() {
            Some(u) if !u.trim().is_empty() => u,
            _ => return error_response(StatusCode::BAD_REQUEST, "no sheet URL configured"),
        },
    };

    match state.catalog.refresh_from_sheet(&state.http, &url).await {
        Ok(snapshot) => {
            let mut saved = false;
            if let Some(new_url) = requested {
                let mut config = state.config.lock().await;
                if config.catalog.sheet_url.as_deref() != Some(new_url.as_str()) {
                    config.catalog.sheet_url = Some(new_url);
                    match config.save(&state.config_path).await {
                        Ok(()) => saved = true,
                        Err(e) => warn!(error = %e, "failed to persist sheet URL"),
                    }
                }
            }
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "tools": snapshot.len(),
                    "categories": snapshot.index().distinct(),
                    "source": snapshot.source(),
                    "saved": saved,
                })),
            )
                .into_response()
        }
        Err(e) => {
            warn!(url = %url, error = %e, "catalog refresh failed, keeping current snapshot");
            let current = state.catalog.snapshot();
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({
                    "error": e.to_string(),
                    "tools": current.len(),
                })),
            )
                .into_response()
        }
    }
}
