//! Auth API Handlers
//!
//! HTTP endpoints for user registration and login.

use axum::{Json, extract::State, http::StatusCode};
use berth_core::dto::auth::{LoginRequest, LoginResponse, RegisterRequest};
use berth_core::dto::task::MessageResponse;

use crate::api::error::{ApiError, ApiResult};
use crate::service::auth_service;
use crate::state::AppState;

/// POST /api/register
/// Create a new user account and its data directory
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    tracing::info!("Registering user: {}", req.username);

    auth_service::register(
        &state.pool,
        &state.dirs,
        state.config.min_password_len,
        &req.username,
        &req.password,
    )
    .await
    .map_err(|e| match e {
        auth_service::AuthError::ValidationError(msg) => ApiError::BadRequest(msg),
        auth_service::AuthError::UsernameTaken(name) => {
            ApiError::Conflict(format!("username '{}' is already taken", name))
        }
        auth_service::AuthError::InvalidCredentials => {
            ApiError::Unauthorized("invalid username or password".to_string())
        }
        auth_service::AuthError::HashError(msg) => ApiError::InternalError(msg),
        auth_service::AuthError::DatabaseError(err) => ApiError::DatabaseError(err),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::ok("user registered")),
    ))
}

/// POST /api/login
/// Verify credentials and issue an access token
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    tracing::debug!("Login attempt: {}", req.username);

    let token = auth_service::login(
        &state.pool,
        &state.config.jwt_secret,
        state.config.token_expiry_mins,
        &req.username,
        &req.password,
    )
    .await
    .map_err(|e| match e {
        auth_service::AuthError::InvalidCredentials => {
            ApiError::Unauthorized("invalid username or password".to_string())
        }
        auth_service::AuthError::ValidationError(msg) => ApiError::BadRequest(msg),
        auth_service::AuthError::UsernameTaken(name) => {
            ApiError::Conflict(format!("username '{}' is already taken", name))
        }
        auth_service::AuthError::HashError(msg) => ApiError::InternalError(msg),
        auth_service::AuthError::DatabaseError(err) => ApiError::DatabaseError(err),
    })?;

    Ok(Json(LoginResponse {
        success: true,
        message: "login successful".to_string(),
        token,
    }))
}
