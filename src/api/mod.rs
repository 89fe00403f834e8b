//! API handlers for the school visits REST endpoints

pub mod attendance;
pub mod auth;
pub mod calendar;
pub mod health;
pub mod openapi;
pub mod proposals;
pub mod schools;
pub mod visits;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::Organizer, AppState};

/// Extractor for an organizer authenticated by JWT
pub struct AuthenticatedOrganizer(pub Organizer);

/// Authenticated organizer, or the viewer when no token is sent
pub struct OptionalOrganizer(pub Organizer);

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let header = value
        .to_str()
        .map_err(|_| AppError::Authentication("Invalid authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedOrganizer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;
        let organizer = state.services.auth.verify(token)?;
        Ok(AuthenticatedOrganizer(organizer))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalOrganizer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => Ok(OptionalOrganizer(state.services.auth.verify(token)?)),
            None => Ok(OptionalOrganizer(Organizer::viewer())),
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Campaign calendar
        .route("/campaign", get(calendar::get_campaign))
        .route("/calendar", get(calendar::get_calendar))
        .route("/blocked-dates", get(calendar::list_blocked_dates))
        .route("/blocked-dates/check", get(calendar::check_blocked_date))
        // Visits
        .route("/visits", get(visits::list_visits).post(visits::create_visit))
        .route("/visits/mine", get(visits::my_visits))
        .route("/visits/export", get(visits::export_visits))
        .route("/visits/by-date/:date", get(visits::visits_on_date))
        .route(
            "/visits/:id",
            get(visits::get_visit)
                .put(visits::update_visit)
                .delete(visits::delete_visit),
        )
        .route("/visits/:id/report", get(visits::visit_report))
        .route(
            "/visits/:id/attendance",
            get(attendance::get_attendance).put(attendance::set_attendance),
        )
        // Proposals
        .route(
            "/proposals",
            get(proposals::list_proposals).post(proposals::create_proposal),
        )
        .route("/proposals/mine", get(proposals::my_proposals))
        .route("/proposals/export", get(proposals::export_proposals))
        .route("/proposals/:id", axum::routing::delete(proposals::delete_proposal))
        // School catalog
        .route("/schools", get(schools::list_schools))
        .route("/schools/:rbd", get(schools::get_school))
        .route("/districts", get(schools::list_districts))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
