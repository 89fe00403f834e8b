//! Attendance endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{attendance::SetAttendance, Attendance, AttendanceSummary},
};

use super::AuthenticatedOrganizer;

/// Universities attending a visit
#[utoipa::path(
    get,
    path = "/visits/{id}/attendance",
    tag = "attendance",
    params(("id" = i32, Path, description = "Visit ID")),
    responses(
        (status = 200, description = "Attendance summary", body = AttendanceSummary)
    )
)]
pub async fn get_attendance(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AttendanceSummary>> {
    let summary = state.services.attendance.get(id).await?;
    Ok(Json(summary))
}

/// Set the current organizer's attendance
#[utoipa::path(
    put,
    path = "/visits/{id}/attendance",
    tag = "attendance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Visit ID")),
    request_body = SetAttendance,
    responses(
        (status = 200, description = "Attendance saved", body = Attendance)
    )
)]
pub async fn set_attendance(
    State(state): State<crate::AppState>,
    AuthenticatedOrganizer(organizer): AuthenticatedOrganizer,
    Path(id): Path<i32>,
    Json(data): Json<SetAttendance>,
) -> AppResult<Json<Attendance>> {
    let row = state
        .services
        .attendance
        .set(&organizer, id, data.attends)
        .await?;
    Ok(Json(row))
}
