//! Attendance model (which universities join a visit)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Attendance flag of one organizer for one visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Attendance {
    pub visit_id: i32,
    pub organizer_id: i32,
    pub attends: bool,
}

/// Set attendance request
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetAttendance {
    pub attends: bool,
}

/// Attendance of a visit split by answer
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceSummary {
    pub visit_id: i32,
    /// Universities attending
    pub attending: Vec<String>,
    /// Universities not attending (or not answered)
    pub not_attending: Vec<String>,
}
