//! Proposals API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{proposal::CreateProposal, report::ExportTable, Proposal},
};

use super::AuthenticatedOrganizer;

/// List all proposals
#[utoipa::path(
    get,
    path = "/proposals",
    tag = "proposals",
    responses(
        (status = 200, description = "Proposals list", body = Vec<Proposal>)
    )
)]
pub async fn list_proposals(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Proposal>>> {
    let proposals = state.services.proposals.list().await?;
    Ok(Json(proposals))
}

/// Proposals of the current organizer
#[utoipa::path(
    get,
    path = "/proposals/mine",
    tag = "proposals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own proposals", body = Vec<Proposal>)
    )
)]
pub async fn my_proposals(
    State(state): State<crate::AppState>,
    AuthenticatedOrganizer(organizer): AuthenticatedOrganizer,
) -> AppResult<Json<Vec<Proposal>>> {
    let proposals = state.services.proposals.list_for(&organizer).await?;
    Ok(Json(proposals))
}

/// Propose a school
#[utoipa::path(
    post,
    path = "/proposals",
    tag = "proposals",
    security(("bearer_auth" = [])),
    request_body = CreateProposal,
    responses(
        (status = 201, description = "Proposal created", body = Proposal)
    )
)]
pub async fn create_proposal(
    State(state): State<crate::AppState>,
    AuthenticatedOrganizer(organizer): AuthenticatedOrganizer,
    Json(data): Json<CreateProposal>,
) -> AppResult<(StatusCode, Json<Proposal>)> {
    let proposal = state.services.proposals.create(&organizer, &data).await?;
    Ok((StatusCode::CREATED, Json(proposal)))
}

/// Delete an own proposal
#[utoipa::path(
    delete,
    path = "/proposals/{id}",
    tag = "proposals",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Proposal ID")),
    responses(
        (status = 204, description = "Proposal deleted")
    )
)]
pub async fn delete_proposal(
    State(state): State<crate::AppState>,
    AuthenticatedOrganizer(organizer): AuthenticatedOrganizer,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.proposals.delete(&organizer, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Export proposals as a table
#[utoipa::path(
    get,
    path = "/proposals/export",
    tag = "proposals",
    responses(
        (status = 200, description = "Proposal table", body = ExportTable)
    )
)]
pub async fn export_proposals(State(state): State<crate::AppState>) -> AppResult<Json<ExportTable>> {
    let table = state.services.export.proposals().await?;
    Ok(Json(table))
}
