//! Admin user listing (assignment dropdown).

use axum::extract::State;
use axum::Json;

use pagelift_core::UserRepository;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// List all users ordered by name.
///
/// `GET /api/admin/users`
pub async fn list_users(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let users = state.db.users.list().await?;

    let data: Vec<serde_json::Value> = users
        .into_iter()
        .map(|u| {
            serde_json::json!({
                "id": u.id,
                "name": u.name,
                "email": u.email,
                "created_at": u.created_at,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "data": data,
    })))
}
