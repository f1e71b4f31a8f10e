use axum::{Router, routing::get};

use crate::handlers;
use crate::state::AppState;

/// Read-only query API over the response store.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/api/responses", get(handlers::list_responses))
        .route("/api/responses/user", get(handlers::list_responses_by_user))
        .route("/api/responses/stats", get(handlers::response_stats))
        .route("/health", get(handlers::health))
}
