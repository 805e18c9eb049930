pub mod relay;
pub mod server;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the HTTP router / 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(server::health_check))
        .route("/", any(relay::relay))
        .layer(DefaultBodyLimit::disable()) // Uploads are streamed, no size limit
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
