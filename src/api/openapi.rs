//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{attendance, auth, calendar, health, proposals, schools, visits};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "School Visits API",
        version = "1.0.0",
        description = "Scheduling of university visits to schools with a daily capacity cap",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&BearerAuth),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Calendar
        calendar::get_campaign,
        calendar::get_calendar,
        calendar::list_blocked_dates,
        calendar::check_blocked_date,
        // Visits
        visits::list_visits,
        visits::get_visit,
        visits::visits_on_date,
        visits::my_visits,
        visits::create_visit,
        visits::update_visit,
        visits::delete_visit,
        visits::visit_report,
        visits::export_visits,
        // Attendance
        attendance::get_attendance,
        attendance::set_attendance,
        // Proposals
        proposals::list_proposals,
        proposals::my_proposals,
        proposals::create_proposal,
        proposals::delete_proposal,
        proposals::export_proposals,
        // Schools
        schools::list_schools,
        schools::get_school,
        schools::list_districts,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::SessionInfo,
            crate::models::Organizer,
            // Visits
            crate::models::Visit,
            crate::models::VisitStatus,
            crate::models::VisitSet,
            crate::models::visit::RankedVisit,
            crate::models::visit::CreateVisit,
            crate::models::visit::UpdateVisit,
            crate::models::visit::VisitQuery,
            // Calendar
            crate::models::calendar::CampaignInfo,
            crate::models::calendar::DayLoad,
            crate::models::calendar::BlocklistKind,
            crate::models::calendar::BlockCheck,
            crate::models::BlockedDate,
            // Attendance
            crate::models::Attendance,
            crate::models::AttendanceSummary,
            crate::models::attendance::SetAttendance,
            // Proposals
            crate::models::Proposal,
            crate::models::proposal::CreateProposal,
            // Reports
            crate::models::report::ReportField,
            crate::models::report::VisitReport,
            crate::models::report::ExportTable,
            // Schools
            crate::models::School,
            crate::models::District,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "calendar", description = "Campaign window and date availability"),
        (name = "visits", description = "Visit scheduling"),
        (name = "attendance", description = "University attendance"),
        (name = "proposals", description = "Proposed schools"),
        (name = "schools", description = "School catalog")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
