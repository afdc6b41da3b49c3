//! Saves API Handlers
//!
//! HTTP endpoints for downloading and uploading save-game archives.

use axum::{
    Json,
    extract::{Multipart, State},
    http::{HeaderMap, HeaderValue, header},
    response::IntoResponse,
};
use berth_core::dto::task::MessageResponse;

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::AuthUser;
use crate::service::saves_service;
use crate::state::AppState;

/// GET/POST /api/download-saves
/// Stream a zip archive of the caller's saves directory
pub async fn download_saves(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    tracing::info!("Saves download requested by {}", user.username);

    let bytes = saves_service::download_saves(&state.dirs, &user.username)
        .await
        .map_err(map_saves_error)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/zip"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"saves.zip\""),
    );

    Ok((headers, bytes))
}

/// POST /api/upload-saves
/// Extract an uploaded zip archive into the caller's saves directory
pub async fn upload_saves(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<MessageResponse>> {
    tracing::info!("Saves upload requested by {}", user.username);

    let mut payload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {}", e)))?;
            payload = Some(bytes.to_vec());
            break;
        }
    }

    let payload =
        payload.ok_or_else(|| ApiError::BadRequest("missing 'file' field".to_string()))?;

    saves_service::upload_saves(&state.dirs, &user.username, payload)
        .await
        .map_err(map_saves_error)?;

    Ok(Json(MessageResponse::ok("saves uploaded")))
}

fn map_saves_error(e: saves_service::SavesError) -> ApiError {
    match e {
        saves_service::SavesError::NoSaves(user) => {
            ApiError::NotFound(format!("no saves found for user '{}'", user))
        }
        saves_service::SavesError::BadArchive(msg) => {
            ApiError::BadRequest(format!("invalid archive: {}", msg))
        }
        saves_service::SavesError::Filesystem(msg) => {
            ApiError::FilesystemError(format!("saves operation failed: {}", msg))
        }
    }
}
