//! School catalog endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{District, School},
};

/// List schools
#[utoipa::path(
    get,
    path = "/schools",
    tag = "schools",
    responses(
        (status = 200, description = "Schools", body = Vec<School>)
    )
)]
pub async fn list_schools(State(state): State<crate::AppState>) -> AppResult<Json<Vec<School>>> {
    let schools = state.services.catalog.list_schools().await?;
    Ok(Json(schools))
}

/// Get school by RBD
#[utoipa::path(
    get,
    path = "/schools/{rbd}",
    tag = "schools",
    params(("rbd" = i32, Path, description = "School RBD")),
    responses(
        (status = 200, description = "School", body = School),
        (status = 404, description = "Unknown RBD", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_school(
    State(state): State<crate::AppState>,
    Path(rbd): Path<i32>,
) -> AppResult<Json<School>> {
    let school = state.services.catalog.get_school(rbd).await?;
    Ok(Json(school))
}

/// List districts
#[utoipa::path(
    get,
    path = "/districts",
    tag = "schools",
    responses(
        (status = 200, description = "Districts", body = Vec<District>)
    )
)]
pub async fn list_districts(State(state): State<crate::AppState>) -> AppResult<Json<Vec<District>>> {
    let districts = state.services.catalog.list_districts().await?;
    Ok(Json(districts))
}
