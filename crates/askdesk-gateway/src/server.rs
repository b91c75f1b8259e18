//! HTTP server implementation using Axum.

use askdesk_core::config::GatewayConfig;
use askdesk_engine::Assistant;
use askdesk_memory::SqliteStore;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
pub struct AppState {
    pub assistant: Arc<Assistant>,
    /// Missed queries and feedback.
    pub store: Arc<SqliteStore>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(assistant: Arc<Assistant>, store: Arc<SqliteStore>) -> Self {
        Self {
            assistant,
            store,
            start_time: std::time::Instant::now(),
        }
    }
}

/// Build the Axum router with all routes.
///
/// Handlers are plain futures; when a client disconnects axum drops them,
/// which cancels any in-flight snippet or generation call.
pub fn build_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/health", get(super::routes::health_check))
        .route("/chat", post(super::routes::chat))
        .route("/get-response", post(super::routes::get_response))
        .route("/suggest", post(super::routes::suggest))
        .route("/suggestions", get(super::routes::starter_suggestions))
        .route("/submit-feedback", post(super::routes::submit_feedback))
        .route("/rating", post(super::routes::rating));

    let operator = Router::new()
        .route("/api/v1/rebuild", post(super::routes::rebuild))
        .route("/api/v1/missed", get(super::routes::list_missed));

    public
        .merge(operator)
        .layer({
            let cors = CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
                .max_age(std::time::Duration::from_secs(3600));

            // Restrict CORS origins in production via env var
            // Example: ASKDESK_CORS_ORIGINS=https://www.hirebie.com,https://hirebie.com
            if let Ok(origins_str) = std::env::var("ASKDESK_CORS_ORIGINS") {
                let origins: Vec<_> = origins_str
                    .split(',')
                    .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
                    .collect();
                cors.allow_origin(origins)
            } else {
                cors.allow_origin(Any)
            }
        })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn start(
    config: &GatewayConfig,
    assistant: Arc<Assistant>,
    store: Arc<SqliteStore>,
) -> anyhow::Result<()> {
    let app = build_router(Arc::new(AppState::new(assistant, store)));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Gateway server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
