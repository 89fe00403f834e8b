//! Proposal model (a school nominated by a university)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Proposal record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Proposal {
    pub id: i32,
    /// Proposing university
    pub organizer_id: i32,
    pub organizer_name: String,
    /// School identifier (RBD)
    pub rbd: i32,
    pub school_name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Resolved proposal fields, ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewProposal {
    pub organizer_id: i32,
    pub organizer_name: String,
    pub rbd: i32,
    pub school_name: String,
}

/// Create proposal request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProposal {
    /// School identifier (RBD)
    pub rbd: i32,
}
