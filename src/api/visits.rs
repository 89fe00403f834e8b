//! Visits API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};

use crate::{
    error::AppResult,
    models::{
        report::{ExportTable, VisitReport},
        visit::{CreateVisit, RankedVisit, UpdateVisit, VisitQuery},
        Visit, VisitSet,
    },
};

use super::{AuthenticatedOrganizer, OptionalOrganizer};

/// List visits ordered by date
#[utoipa::path(
    get,
    path = "/visits",
    tag = "visits",
    params(VisitQuery),
    responses(
        (status = 200, description = "Visits list", body = Vec<Visit>)
    )
)]
pub async fn list_visits(
    State(state): State<crate::AppState>,
    Query(query): Query<VisitQuery>,
) -> AppResult<Json<Vec<Visit>>> {
    let visits = state.services.visits.list(query.month).await?;
    Ok(Json(visits))
}

/// Get visit by ID
#[utoipa::path(
    get,
    path = "/visits/{id}",
    tag = "visits",
    params(("id" = i32, Path, description = "Visit ID")),
    responses(
        (status = 200, description = "Visit details", body = Visit),
        (status = 404, description = "Visit not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_visit(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Visit>> {
    let visit = state.services.visits.get_by_id(id).await?;
    Ok(Json(visit))
}

/// Visits scheduled on a date
#[utoipa::path(
    get,
    path = "/visits/by-date/{date}",
    tag = "visits",
    params(("date" = NaiveDate, Path, description = "Date (YYYY-MM-DD)")),
    responses(
        (status = 200, description = "Visits on the date", body = Vec<RankedVisit>)
    )
)]
pub async fn visits_on_date(
    State(state): State<crate::AppState>,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<Vec<RankedVisit>>> {
    let visits = state.services.visits.on_date(date).await?;
    Ok(Json(visits))
}

/// Upcoming visits of the current organizer
#[utoipa::path(
    get,
    path = "/visits/mine",
    tag = "visits",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Upcoming own visits", body = Vec<RankedVisit>)
    )
)]
pub async fn my_visits(
    State(state): State<crate::AppState>,
    AuthenticatedOrganizer(organizer): AuthenticatedOrganizer,
) -> AppResult<Json<Vec<RankedVisit>>> {
    let today = Local::now().date_naive();
    let visits = state.services.visits.upcoming_for(&organizer, today).await?;
    Ok(Json(visits))
}

/// Schedule a visit
#[utoipa::path(
    post,
    path = "/visits",
    tag = "visits",
    security(("bearer_auth" = [])),
    request_body = CreateVisit,
    responses(
        (status = 201, description = "Visit created", body = VisitSet),
        (status = 409, description = "Date no longer available", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_visit(
    State(state): State<crate::AppState>,
    AuthenticatedOrganizer(organizer): AuthenticatedOrganizer,
    Json(data): Json<CreateVisit>,
) -> AppResult<(StatusCode, Json<VisitSet>)> {
    let set = state.services.visits.create(&organizer, &data).await?;
    Ok((StatusCode::CREATED, Json(set)))
}

/// Update a visit (a new date replaces it under a new id)
#[utoipa::path(
    put,
    path = "/visits/{id}",
    tag = "visits",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Visit ID")),
    request_body = UpdateVisit,
    responses(
        (status = 200, description = "Visit updated", body = VisitSet),
        (status = 404, description = "Visit not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Date no longer available", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_visit(
    State(state): State<crate::AppState>,
    AuthenticatedOrganizer(organizer): AuthenticatedOrganizer,
    Path(id): Path<i32>,
    Json(data): Json<UpdateVisit>,
) -> AppResult<Json<VisitSet>> {
    let set = state.services.visits.update(&organizer, id, &data).await?;
    Ok(Json(set))
}

/// Delete a visit
#[utoipa::path(
    delete,
    path = "/visits/{id}",
    tag = "visits",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Visit ID")),
    responses(
        (status = 200, description = "Visit deleted (or already gone)", body = VisitSet)
    )
)]
pub async fn delete_visit(
    State(state): State<crate::AppState>,
    AuthenticatedOrganizer(organizer): AuthenticatedOrganizer,
    Path(id): Path<i32>,
) -> AppResult<Json<VisitSet>> {
    let set = state.services.visits.delete(&organizer, id).await?;
    Ok(Json(set))
}

/// Report data of a visit
#[utoipa::path(
    get,
    path = "/visits/{id}/report",
    tag = "visits",
    params(("id" = i32, Path, description = "Visit ID")),
    responses(
        (status = 200, description = "Visit report", body = VisitReport)
    )
)]
pub async fn visit_report(
    State(state): State<crate::AppState>,
    OptionalOrganizer(organizer): OptionalOrganizer,
    Path(id): Path<i32>,
) -> AppResult<Json<VisitReport>> {
    let report = state.services.export.report(&organizer, id).await?;
    Ok(Json(report))
}

/// Export visits as a table
#[utoipa::path(
    get,
    path = "/visits/export",
    tag = "visits",
    params(VisitQuery),
    responses(
        (status = 200, description = "Visit table", body = ExportTable)
    )
)]
pub async fn export_visits(
    State(state): State<crate::AppState>,
    OptionalOrganizer(organizer): OptionalOrganizer,
    Query(query): Query<VisitQuery>,
) -> AppResult<Json<ExportTable>> {
    let table = state.services.export.visits(&organizer, query.month).await?;
    Ok(Json(table))
}
