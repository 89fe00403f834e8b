//! Campaign and blocklist endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Local, NaiveDate};

use crate::{
    error::AppResult,
    models::calendar::{
        BlockCheck, BlockCheckQuery, BlocklistQuery, CalendarQuery, CampaignInfo, DayLoad,
    },
};

/// Campaign window, daily cap and first available day
#[utoipa::path(
    get,
    path = "/campaign",
    tag = "calendar",
    responses(
        (status = 200, description = "Campaign parameters", body = CampaignInfo)
    )
)]
pub async fn get_campaign(State(state): State<crate::AppState>) -> AppResult<Json<CampaignInfo>> {
    let today = Local::now().date_naive();
    let info = state.services.calendar.campaign(today).await?;
    Ok(Json(info))
}

/// Visit load of every campaign day
#[utoipa::path(
    get,
    path = "/calendar",
    tag = "calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Day loads", body = Vec<DayLoad>)
    )
)]
pub async fn get_calendar(
    State(state): State<crate::AppState>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<Vec<DayLoad>>> {
    let days = state.services.calendar.calendar(query.month).await?;
    Ok(Json(days))
}

/// Blocked dates from the local or authoritative source
#[utoipa::path(
    get,
    path = "/blocked-dates",
    tag = "calendar",
    params(BlocklistQuery),
    responses(
        (status = 200, description = "Blocked dates", body = Vec<NaiveDate>)
    )
)]
pub async fn list_blocked_dates(
    State(state): State<crate::AppState>,
    Query(query): Query<BlocklistQuery>,
) -> AppResult<Json<Vec<NaiveDate>>> {
    let dates = state
        .services
        .calendar
        .blocked_dates(query.source.unwrap_or_default())
        .await?;
    Ok(Json(dates))
}

/// Check whether a date is blocked
#[utoipa::path(
    get,
    path = "/blocked-dates/check",
    tag = "calendar",
    params(BlockCheckQuery),
    responses(
        (status = 200, description = "Check result", body = BlockCheck)
    )
)]
pub async fn check_blocked_date(
    State(state): State<crate::AppState>,
    Query(query): Query<BlockCheckQuery>,
) -> AppResult<Json<BlockCheck>> {
    let check = state
        .services
        .calendar
        .check(query.date, query.exclude_date, query.source.unwrap_or_default())
        .await?;
    Ok(Json(check))
}
