use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::core::config::defaults::default_local_origins;
use crate::server::handlers::{chat, health, pages, upload};
use crate::state::AppState;

/// Creates the application router.
///
/// Serves the chat and upload pages, the two relay endpoints and a health
/// check, wrapped in CORS and request tracing layers. The upload route has
/// no body size limit.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state);
    Router::new()
        .route("/", get(pages::chat_page))
        .route("/upload", get(pages::upload_page))
        .route("/health", get(health::health))
        .route("/api/chat", post(chat::chat))
        .route(
            "/api/upload",
            post(upload::upload).layer(DefaultBodyLimit::disable()),
        )
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(state: &AppState) -> CorsLayer {
    let configured = parse_origins(&state.config.server.cors_allowed_origins);
    let origins = if configured.is_empty() {
        tracing::warn!("No usable CORS origins configured; using local defaults");
        parse_origins(&default_local_origins())
    } else {
        configured
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect()
}
