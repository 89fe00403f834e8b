//! Authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, models::Organizer};

use super::OptionalOrganizer;

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Organizer (university) id
    pub organizer_id: i32,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub organizer: Organizer,
}

/// Current session
#[derive(Serialize, ToSchema)]
pub struct SessionInfo {
    pub organizer: Organizer,
    /// Whether the session may add, edit or delete records
    pub can_edit: bool,
}

/// Log in as an organizer
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, organizer) = state
        .services
        .auth
        .authenticate(request.organizer_id, &request.password)?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.auth.jwt_expiration_hours * 3600,
        organizer,
    }))
}

/// Current organizer, or the viewer without a token
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current session", body = SessionInfo)
    )
)]
pub async fn me(OptionalOrganizer(organizer): OptionalOrganizer) -> Json<SessionInfo> {
    Json(SessionInfo {
        can_edit: !organizer.is_viewer(),
        organizer,
    })
}
