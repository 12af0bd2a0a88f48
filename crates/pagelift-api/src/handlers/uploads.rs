//! Image upload endpoints.
//!
//! Uploads are validated by magic bytes rather than the client-supplied
//! content type, size-capped, and stored content-addressed through the
//! upload repository's storage backend.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use pagelift_core::defaults::MAX_UPLOAD_BYTES;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Upload an image (multipart field `image`).
///
/// `POST /api/admin/uploads/image`
pub async fn upload_image(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let uploads = state
        .db
        .uploads
        .as_ref()
        .ok_or_else(|| ApiError::not_configured("Upload storage is not configured"))?;

    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request("INVALID_MULTIPART", e.to_string()))?
    {
        if field.name() == Some("image") {
            let filename = field
                .file_name()
                .map(|f| f.to_string())
                .unwrap_or_else(|| "upload".to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request("INVALID_MULTIPART", e.to_string()))?;
            file = Some((filename, data.to_vec()));
            break;
        }
    }

    let Some((filename, data)) = file else {
        return Err(ApiError::bad_request(
            "VALIDATION_ERROR",
            "No image file provided",
        ));
    };

    if data.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::bad_request(
            "FILE_TOO_LARGE",
            format!("Image must be {} bytes or smaller", MAX_UPLOAD_BYTES),
        ));
    }

    // Trust the bytes, not the declared content type.
    let detected = infer::get(&data)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");
    if !ALLOWED_IMAGE_TYPES.contains(&detected) {
        return Err(ApiError::bad_request(
            "INVALID_FILE_TYPE",
            "Invalid file type. Only JPEG, PNG, GIF, and WebP images are allowed.",
        ));
    }

    let public_base = format!(
        "{}/uploads",
        state.config.public_url.trim_end_matches('/')
    );
    let upload = uploads
        .store(user.id, &filename, detected, &data, &public_base)
        .await?;

    info!(
        subsystem = "api",
        component = "uploads",
        op = "upload_image",
        user_id = %user.id,
        size = upload.size_bytes,
        "Image uploaded"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Image uploaded successfully",
        "data": {
            "url": upload.public_url,
            "filename": upload.filename,
            "size": upload.size_bytes,
            "mimeType": upload.content_type,
        }
    })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteImageRequest {
    pub url: Option<String>,
}

/// Delete an uploaded image by its public URL.
///
/// `DELETE /api/admin/uploads/image`
pub async fn delete_image(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<DeleteImageRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let uploads = state
        .db
        .uploads
        .as_ref()
        .ok_or_else(|| ApiError::not_configured("Upload storage is not configured"))?;

    let url = req
        .url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("VALIDATION_ERROR", "Image URL is required"))?;

    if !uploads.delete_by_url(url).await? {
        return Err(ApiError::not_found("NOT_FOUND", "Upload not found"));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Image deleted successfully",
    })))
}
