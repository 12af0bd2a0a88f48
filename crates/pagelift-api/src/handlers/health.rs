//! Liveness and database health endpoints.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use sqlx::Row;

use crate::error::ApiError;
use crate::state::AppState;

/// Liveness probe.
///
/// `GET /api/health`
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "pagelift API is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Database connectivity probe: round-trips a query through the pool.
///
/// `GET /api/db-check`
pub async fn db_check(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let row = sqlx::query("SELECT NOW() AS current_time, (SELECT COUNT(*) FROM users) AS user_count")
        .fetch_one(&state.db.pool)
        .await
        .map_err(pagelift_core::Error::Database)?;

    let current_time: chrono::DateTime<Utc> = row.get("current_time");
    let user_count: i64 = row.get("user_count");

    Ok(Json(serde_json::json!({
        "status": "ok",
        "message": "Database connection successful",
        "data": {
            "currentTime": current_time,
            "userCount": user_count,
        },
        "timestamp": Utc::now().to_rfc3339(),
    })))
}
