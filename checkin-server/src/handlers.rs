use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use checkin_model::{Response, ResponseStats, UserId};

use crate::errors::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: i64,
}

/// All recorded responses, newest first.
pub async fn list_responses(State(state): State<AppState>) -> AppResult<Json<Vec<Response>>> {
    let responses = state.store().list_all().await?;
    Ok(Json(responses))
}

/// One user's responses, newest first.
pub async fn list_responses_by_user(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<Response>>> {
    let responses = state.store().list_by_user(UserId(query.user_id)).await?;
    Ok(Json(responses))
}

/// Aggregate counters, computed fresh from the log.
pub async fn response_stats(State(state): State<AppState>) -> AppResult<Json<ResponseStats>> {
    let stats = state.store().stats().await?;
    Ok(Json(stats))
}

/// Liveness plus a store connectivity probe.
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    match state.store().stats().await {
        Ok(stats) => Ok(Json(json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION"),
            "checks": {
                "database": {
                    "status": "healthy",
                    "total_responses": stats.total_responses,
                }
            }
        }))),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}
