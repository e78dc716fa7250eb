use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use time::OffsetDateTime;
use tracing::{error, instrument};

use crate::db;
use crate::state::AppState;

const PING_TIMEOUT: Duration = Duration::from_secs(2);

/// GET /api/health. The one place where a diagnostic string is allowed
/// into the response body.
#[instrument(skip(state))]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = OffsetDateTime::now_utc();
    let timestamp = now
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string());

    match tokio::time::timeout(PING_TIMEOUT, db::ping(&state.db)).await {
        Ok(Ok(())) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "database": "connected",
                "timestamp": timestamp,
            })),
        ),
        Ok(Err(e)) => {
            error!(error = %e, "health check query failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "error",
                    "database": "disconnected",
                    "error": e.to_string(),
                })),
            )
        }
        Err(_) => {
            error!("health check query timed out");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "error",
                    "database": "disconnected",
                    "error": "health check timed out",
                })),
            )
        }
    }
}
