use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::constants::credentials::SESSION_USER_KEY;
use crate::services::AdminInfo;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangeCredentialsRequest {
    pub current_password: String,
    pub new_username: String,
    pub new_password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Admin username attached to responses of session-guarded routes, so the
/// request logger can report who made the change.
#[derive(Debug, Clone)]
pub struct AdminUser(pub String);

/// Rejects requests without an admin session.
pub async fn auth_middleware(session: Session, request: Request, next: Next) -> Response {
    match session.get::<String>(SESSION_USER_KEY).await {
        Ok(Some(user)) => {
            let mut response = next.run(request).await;
            response.extensions_mut().insert(AdminUser(user));
            response
        }
        Ok(None) => ApiError::Unauthorized("Not authenticated".to_string()).into_response(),
        Err(e) => ApiError::internal(format!("Session error: {e}")).into_response(),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AdminInfo>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let info = state.auth.login(&payload.username, &payload.password).await?;

    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    session
        .insert(SESSION_USER_KEY, &info.username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    tracing::info!(username = %info.username, "Admin logged in");
    Ok(Json(ApiResponse::success(info)))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    let _ = session.flush().await;
    Json(ApiResponse::success(MessageResponse::new("Logged out")))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<AdminInfo>>, ApiError> {
    let session_user = get_session_username(&session).await?;
    let mut info = state.auth.admin_info().await?;

    // Sessions outlive a rotation; report who actually logged in.
    info.username = session_user;
    Ok(Json(ApiResponse::success(info)))
}

/// PUT /admin/credentials
///
/// Replaces the admin pair. A wrong current password is a 401, distinct from
/// a 400 for an unusable new pair. The caller's session stays valid and is
/// re-bound to the new username.
pub async fn change_credentials(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<ChangeCredentialsRequest>,
) -> Result<Json<ApiResponse<AdminInfo>>, ApiError> {
    let info = state
        .auth
        .rotate_credentials(
            &payload.current_password,
            &payload.new_username,
            &payload.new_password,
        )
        .await?;

    session
        .insert(SESSION_USER_KEY, &info.username)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    Ok(Json(ApiResponse::success(info)))
}

// ============================================================================
// Helpers
// ============================================================================

async fn get_session_username(session: &Session) -> Result<String, ApiError> {
    session
        .get::<String>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}
