//! Triage note endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use pagelift_core::defaults::MAX_NOTE_LEN;
use pagelift_core::{LeadNoteRepository, LeadRepository};

use crate::auth::AuthUser;
use crate::error::{ApiError, FieldError};
use crate::state::AppState;

/// List a lead's notes, newest first.
///
/// `GET /api/admin/leads/:id/notes`
pub async fn list_lead_notes(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(lead_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.db.leads.exists(lead_id).await? {
        return Err(pagelift_core::Error::LeadNotFound(lead_id).into());
    }

    let notes = state.db.lead_notes.list_for_lead(lead_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": notes,
    })))
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub note_text: Option<String>,
}

/// Attach a note to a lead.
///
/// `POST /api/admin/leads/:id/notes`
pub async fn create_lead_note(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lead_id): Path<Uuid>,
    Json(req): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let note_text = req.note_text.as_deref().unwrap_or("").trim().to_string();
    if note_text.is_empty() {
        return Err(ApiError::validation(
            "Note text is required",
            vec![FieldError::new("note_text", "Note text cannot be empty")],
        ));
    }
    if note_text.chars().count() > MAX_NOTE_LEN {
        return Err(ApiError::validation(
            "Note text is too long",
            vec![FieldError::new(
                "note_text",
                format!("Note text must be {} characters or less", MAX_NOTE_LEN),
            )],
        ));
    }

    if !state.db.leads.exists(lead_id).await? {
        return Err(pagelift_core::Error::LeadNotFound(lead_id).into());
    }

    let note = state
        .db
        .lead_notes
        .create(lead_id, user.id, &note_text)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "data": note,
            "message": "Note created successfully",
        })),
    ))
}

/// Delete a note. Authors may only delete their own notes.
///
/// `DELETE /api/admin/leads/notes/:note_id`
pub async fn delete_lead_note(
    State(state): State<AppState>,
    user: AuthUser,
    Path(note_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let note = state
        .db
        .lead_notes
        .get(note_id)
        .await?
        .ok_or_else(|| ApiError::not_found("NOTE_NOT_FOUND", "Note not found"))?;

    if note.user_id != user.id {
        return Err(ApiError::forbidden("You can only delete your own notes"));
    }

    state.db.lead_notes.delete(note_id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Note deleted successfully",
    })))
}
