use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all skyblob endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/blob/:owner/:cid", get(handler::blob_handler))
        .route("/v1/blob/:owner/:cid/meta", get(handler::blob_meta_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
