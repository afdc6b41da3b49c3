//! Server API Handlers
//!
//! HTTP endpoints for launching a user's game server, polling launch status,
//! and installing the server template.

use axum::{
    Json,
    extract::{Path, State},
};
use berth_core::domain::task::TaskId;
use berth_core::dto::task::{LaunchResponse, MessageResponse, TaskStatusResponse};

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::AuthUser;
use crate::service::{install_service, launch_service};
use crate::state::AppState;

/// POST /api/launch
/// Submit a launch task for the caller's server.
///
/// Always returns 200 once the task is accepted; a launch that later fails is
/// observable only via status polling.
pub async fn launch(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<LaunchResponse>> {
    tracing::info!("Launch requested by {}", user.username);

    let task_id = launch_service::submit(&state.registry, &state.dispatcher, &user.username)
        .map_err(|e| match e {
            launch_service::LaunchError::Rejected(reason) => {
                ApiError::ServiceUnavailable(format!("launch rejected: {}", reason))
            }
            launch_service::LaunchError::NotFound(id) => {
                ApiError::NotFound(format!("task {} not found", id))
            }
        })?;

    Ok(Json(LaunchResponse {
        success: true,
        message: "server is starting".to_string(),
        task_id,
    }))
}

/// GET /api/launch-status/{task_id}
/// Poll the current status of a launch task
pub async fn launch_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(task_id): Path<TaskId>,
) -> ApiResult<Json<TaskStatusResponse>> {
    tracing::debug!("Status poll for task {} by {}", task_id, user.username);

    let task = launch_service::status(&state.registry, task_id, &user.username).map_err(|e| {
        match e {
            launch_service::LaunchError::NotFound(id) => {
                ApiError::NotFound(format!("task {} not found", id))
            }
            launch_service::LaunchError::Rejected(reason) => {
                ApiError::ServiceUnavailable(format!("launch rejected: {}", reason))
            }
        }
    })?;

    Ok(Json(task.into()))
}

/// POST /api/install
/// Copy the server template into the caller's game directory
pub async fn install(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    tracing::info!("Install requested by {}", user.username);

    install_service::install_server(&state.dirs, &state.config.template_user, &user.username)
        .await
        .map_err(|e| match e {
            install_service::InstallError::TemplateNotFound(template) => {
                ApiError::NotFound(format!("server template '{}' not found", template))
            }
            install_service::InstallError::Filesystem(msg) => {
                ApiError::FilesystemError(format!("install failed: {}", msg))
            }
        })?;

    Ok(Json(MessageResponse::ok("server installed")))
}
