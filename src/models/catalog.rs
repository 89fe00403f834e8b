//! School catalog and calendar reference data

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// School from the national school directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct School {
    /// School identifier (RBD)
    pub rbd: i32,
    pub name: String,
    pub district_code: i32,
}

/// District (comuna)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct District {
    pub code: i32,
    pub name: String,
}

/// Date blocked by an administrator regardless of the visit count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BlockedDate {
    pub blocked_date: NaiveDate,
    pub reason: Option<String>,
}
