//! JSON HTTP gateway for dashboard frontends.
//!
//! Serves:
//! - `GET  /api/status`          : `{ "status": "ok" }`
//! - `GET  /api/health`          : version, uptime, catalog size
//! - `GET  /api/tools`           : filtered tool grid (`?q=&category=`)
//! - `GET  /api/tools/:id`       : one tool with parsed use cases and plans
//! - `GET  /api/categories`      : category selector rows
//! - `GET  /api/stats`           : header counters
//! - `POST /api/catalog/refresh` : re-ingest the catalog sheet
//! - `GET|POST /api/chat`        : assistant transcript / send a message

mod handlers;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::assistant::{AssistantSettings, Chat};
use crate::catalog::CatalogStore;
use crate::config::Config;

// ---------------------------------------------------------------------------
// Gateway handle
// ---------------------------------------------------------------------------

/// Handle returned by [`start_gateway`].
pub struct Gateway {
    /// Server task handle.
    pub handle: JoinHandle<()>,
    /// The address the server is actually listening on.
    pub addr: SocketAddr,
}

/// Everything the gateway needs to serve requests.
pub struct GatewayOptions {
    pub config: Config,
    /// Where a refresh with a new sheet URL persists the config.
    pub config_path: PathBuf,
    pub catalog: Arc<CatalogStore>,
    pub assistant: AssistantSettings,
    pub http: reqwest::Client,
}

// ---------------------------------------------------------------------------
// Shared state injected into axum handlers
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) catalog: Arc<CatalogStore>,
    /// Single conversation; the mutex serialises turns.
    pub(crate) chat: Arc<Mutex<Chat>>,
    /// Fixed at startup; read without taking the chat lock.
    pub(crate) assistant_configured: bool,
    pub(crate) config: Arc<Mutex<Config>>,
    pub(crate) config_path: PathBuf,
    pub(crate) http: reqwest::Client,
}

fn router(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/status", get(handlers::health::status_handler))
        .route("/health", get(handlers::health::api_health))
        // Catalog
        .route("/tools", get(handlers::tools::api_tools_list))
        .route("/tools/:tool_id", get(handlers::tools::api_tool_get))
        .route("/categories", get(handlers::tools::api_categories))
        .route("/stats", get(handlers::tools::api_stats))
        .route("/catalog/refresh", post(handlers::catalog::api_catalog_refresh))
        // Assistant
        .route(
            "/chat",
            get(handlers::chat::api_chat_get).post(handlers::chat::api_chat_post),
        );

    Router::new()
        .nest("/api", api_router)
        .with_state(state)
        .layer(CorsLayer::permissive())
}

// ---------------------------------------------------------------------------
// Server startup
// ---------------------------------------------------------------------------

/// Start the gateway HTTP server on `addr`.
pub async fn start_gateway(addr: SocketAddr, options: GatewayOptions) -> std::io::Result<Gateway> {
    let state = AppState {
        catalog: options.catalog,
        assistant_configured: options.assistant.is_configured(),
        chat: Arc::new(Mutex::new(Chat::new(options.assistant))),
        config: Arc::new(Mutex::new(options.config)),
        config_path: options.config_path,
        http: options.http,
    };

    let _ = handlers::health::STARTUP_TIME.set(std::time::Instant::now());

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("gateway server error: {e}");
        }
    });

    info!(%bound_addr, "gateway started");

    Ok(Gateway {
        handle,
        addr: bound_addr,
    })
}
