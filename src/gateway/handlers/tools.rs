use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::super::AppState;
use super::error_response;
use crate::catalog::{plural, ToolDetail, ALL_CATEGORIES};

fn all_categories() -> String {
    ALL_CATEGORIES.to_string()
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToolsQuery {
    #[serde(default)]
    q: String,
    #[serde(default = "all_categories")]
    category: String,
}

/// `GET /api/tools?q=&category=`: the filtered grid.
pub(crate) async fn api_tools_list(
    State(state): State<AppState>,
    Query(query): Query<ToolsQuery>,
) -> impl IntoResponse {
    let catalog = state.catalog.snapshot();
    let tools = catalog.search(&query.q, &query.category);
    Json(serde_json::json!({
        "tools": tools,
        "total": tools.len(),
        "query": query.q,
        "category": query.category,
    }))
}

/// `GET /api/tools/:id`: detail view.
pub(crate) async fn api_tool_get(
    State(state): State<AppState>,
    Path(tool_id): Path<String>,
) -> impl IntoResponse {
    let catalog = state.catalog.snapshot();
    let Some(tool) = catalog.get(&tool_id) else {
        return error_response(StatusCode::NOT_FOUND, format!("tool not found: {tool_id}"));
    };
    let default_link = state.config.lock().await.catalog.default_payment_link.clone();
    (StatusCode::OK, Json(ToolDetail::new(tool, &default_link))).into_response()
}

/// `GET /api/categories`: selector rows in display order.
pub(crate) async fn api_categories(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state.catalog.snapshot();
    let config = state.config.lock().await;
    let definitions = &config.catalog.category_definitions;

    let rows: Vec<serde_json::Value> = catalog
        .index()
        .rows()
        .into_iter()
        .map(|row| {
            let mut v = serde_json::json!({ "name": row.name, "count": row.count });
            if let Some(def) = definitions.get(&row.name) {
                v["definition"] = serde_json::json!(def);
            }
            v
        })
        .collect();

    Json(serde_json::json!({ "categories": rows }))
}

/// `GET /api/stats`: header counters.
pub(crate) async fn api_stats(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state.catalog.snapshot();
    let total = catalog.len();
    Json(serde_json::json!({
        "total": total,
        "categories": catalog.index().distinct(),
        "label": plural::tool_count_label(total as u64),
    }))
}
