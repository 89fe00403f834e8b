//! Campaign calendar views

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::catalog::BlockedDate;

/// Load of a single campaign day
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DayLoad {
    pub date: NaiveDate,
    /// Visits currently scheduled
    pub visits: usize,
    /// Slots left before the daily cap
    pub remaining: usize,
    /// Day is saturated or on the override blocklist
    pub blocked: bool,
    /// Day is on the override blocklist
    pub overridden: bool,
    pub holiday: bool,
}

/// Campaign parameters
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CampaignInfo {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_cap: usize,
    /// First date a new visit may be scheduled on
    pub first_available_date: NaiveDate,
    pub holidays: Vec<NaiveDate>,
    pub blocked_dates: Vec<BlockedDate>,
}

/// Where a blocklist is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BlocklistKind {
    /// Count-based, from a snapshot of the visits
    #[default]
    Local,
    /// Override list plus stored counts, read fresh from the record store
    Authoritative,
}

/// Query parameters for the blocklist endpoint
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BlocklistQuery {
    pub source: Option<BlocklistKind>,
}

/// Query parameters for a blocked-date check
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BlockCheckQuery {
    /// Candidate date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Date already held by the booking; never reported blocked, even when overridden
    pub exclude_date: Option<NaiveDate>,
    pub source: Option<BlocklistKind>,
}

/// Result of a blocked-date check
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BlockCheck {
    pub date: NaiveDate,
    pub blocked: bool,
    pub source: BlocklistKind,
}

/// Query parameters for the calendar
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct CalendarQuery {
    /// Month filter (1-12, 0 or absent = whole campaign)
    pub month: Option<u32>,
}
