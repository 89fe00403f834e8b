//! Visit model (a scheduled school visit)

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Visit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    Confirmed,
    #[default]
    PendingConfirmation,
    Completed,
    Suspended,
}

impl VisitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::Confirmed => "confirmed",
            VisitStatus::PendingConfirmation => "pending_confirmation",
            VisitStatus::Completed => "completed",
            VisitStatus::Suspended => "suspended",
        }
    }

    /// Label shown in reports and exports
    pub fn label(&self) -> &'static str {
        match self {
            VisitStatus::Confirmed => "Confirmada",
            VisitStatus::PendingConfirmation => "Por confirmar",
            VisitStatus::Completed => "Realizada",
            VisitStatus::Suspended => "Suspendida",
        }
    }
}

impl std::fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VisitStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(VisitStatus::Confirmed),
            "pending_confirmation" => Ok(VisitStatus::PendingConfirmation),
            "completed" => Ok(VisitStatus::Completed),
            "suspended" => Ok(VisitStatus::Suspended),
            _ => Err(format!("Invalid visit status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for VisitStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for VisitStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for VisitStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Visit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Visit {
    pub id: i32,
    /// Visit date
    pub visit_date: NaiveDate,
    /// Organizing university
    pub organizer_id: i32,
    pub organizer_name: String,
    /// School identifier (RBD)
    pub rbd: i32,
    pub school_name: String,
    pub district_code: Option<i32>,
    pub address: Option<String>,
    /// Start time (00:00:00 when not given)
    pub start_time: NaiveTime,
    /// End time (00:00:00 when not given)
    pub end_time: NaiveTime,
    /// Stand installation time (00:00:00 when not given)
    pub install_time: NaiveTime,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub contact_role: Option<String>,
    /// School counselor
    pub counselor_name: Option<String>,
    pub counselor_phone: Option<String>,
    pub counselor_email: Option<String>,
    pub status: VisitStatus,
    pub notes: Option<String>,
    /// Visit replaced by this one when it was re-dated
    pub rescheduled_from: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fully resolved visit fields, ready to be persisted by a record store
#[derive(Debug, Clone, PartialEq)]
pub struct NewVisit {
    pub visit_date: NaiveDate,
    pub organizer_id: i32,
    pub organizer_name: String,
    pub rbd: i32,
    pub school_name: String,
    pub district_code: Option<i32>,
    pub address: Option<String>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub install_time: NaiveTime,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub contact_role: Option<String>,
    pub counselor_name: Option<String>,
    pub counselor_phone: Option<String>,
    pub counselor_email: Option<String>,
    pub status: VisitStatus,
    pub notes: Option<String>,
}

impl NewVisit {
    /// Editable fields of an existing visit, keeping its organizer and school
    pub fn from_visit(visit: &Visit) -> Self {
        Self {
            visit_date: visit.visit_date,
            organizer_id: visit.organizer_id,
            organizer_name: visit.organizer_name.clone(),
            rbd: visit.rbd,
            school_name: visit.school_name.clone(),
            district_code: visit.district_code,
            address: visit.address.clone(),
            start_time: visit.start_time,
            end_time: visit.end_time,
            install_time: visit.install_time,
            contact_name: visit.contact_name.clone(),
            contact_phone: visit.contact_phone.clone(),
            contact_email: visit.contact_email.clone(),
            contact_role: visit.contact_role.clone(),
            counselor_name: visit.counselor_name.clone(),
            counselor_phone: visit.counselor_phone.clone(),
            counselor_email: visit.counselor_email.clone(),
            status: visit.status,
            notes: visit.notes.clone(),
        }
    }

    /// Materialize a stored record
    pub fn into_visit(self, id: i32, rescheduled_from: Option<i32>, now: DateTime<Utc>) -> Visit {
        Visit {
            id,
            visit_date: self.visit_date,
            organizer_id: self.organizer_id,
            organizer_name: self.organizer_name,
            rbd: self.rbd,
            school_name: self.school_name,
            district_code: self.district_code,
            address: self.address,
            start_time: self.start_time,
            end_time: self.end_time,
            install_time: self.install_time,
            contact_name: self.contact_name,
            contact_phone: self.contact_phone,
            contact_email: self.contact_email,
            contact_role: self.contact_role,
            counselor_name: self.counselor_name,
            counselor_phone: self.counselor_phone,
            counselor_email: self.counselor_email,
            status: self.status,
            notes: self.notes,
            rescheduled_from,
            created_at: Some(now),
            updated_at: None,
        }
    }
}

/// Create visit request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateVisit {
    /// Visit date (YYYY-MM-DD)
    pub visit_date: NaiveDate,
    /// School identifier (RBD)
    pub rbd: i32,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    /// District code; defaults to the school's district
    pub district_code: Option<i32>,
    /// Start time (HH:MM or HH:MM:SS)
    pub start_time: Option<String>,
    /// End time (HH:MM or HH:MM:SS)
    pub end_time: Option<String>,
    /// Installation time (HH:MM or HH:MM:SS)
    pub install_time: Option<String>,
    #[validate(length(max = 200))]
    pub contact_name: Option<String>,
    #[validate(length(max = 50))]
    pub contact_phone: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(length(max = 200))]
    pub contact_role: Option<String>,
    #[validate(length(max = 200))]
    pub counselor_name: Option<String>,
    #[validate(length(max = 50))]
    pub counselor_phone: Option<String>,
    #[validate(email)]
    pub counselor_email: Option<String>,
    pub status: Option<VisitStatus>,
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
}

/// Update visit request (replaces every editable field)
///
/// The organizer and the school of a visit cannot be changed.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateVisit {
    /// Visit date (YYYY-MM-DD); a different date reschedules the visit under a new id
    pub visit_date: NaiveDate,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    pub district_code: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub install_time: Option<String>,
    #[validate(length(max = 200))]
    pub contact_name: Option<String>,
    #[validate(length(max = 50))]
    pub contact_phone: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(length(max = 200))]
    pub contact_role: Option<String>,
    #[validate(length(max = 200))]
    pub counselor_name: Option<String>,
    #[validate(length(max = 50))]
    pub counselor_phone: Option<String>,
    #[validate(email)]
    pub counselor_email: Option<String>,
    pub status: Option<VisitStatus>,
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
}

impl UpdateVisit {
    /// Apply this request on top of the stored visit
    pub fn apply_to(&self, original: &Visit) -> AppResult<NewVisit> {
        let mut record = NewVisit::from_visit(original);
        record.visit_date = self.visit_date;
        record.address = self.address.clone();
        record.district_code = self.district_code.or(original.district_code);
        record.start_time = parse_time_or_midnight(self.start_time.as_deref())?;
        record.end_time = parse_time_or_midnight(self.end_time.as_deref())?;
        record.install_time = parse_time_or_midnight(self.install_time.as_deref())?;
        record.contact_name = self.contact_name.clone();
        record.contact_phone = self.contact_phone.clone();
        record.contact_email = self.contact_email.clone();
        record.contact_role = self.contact_role.clone();
        record.counselor_name = self.counselor_name.clone();
        record.counselor_phone = self.counselor_phone.clone();
        record.counselor_email = self.counselor_email.clone();
        record.status = self.status.unwrap_or(original.status);
        record.notes = self.notes.clone();
        Ok(record)
    }
}

/// Parse an optional time, falling back to 00:00:00 when absent or empty
pub fn parse_time_or_midnight(value: Option<&str>) -> AppResult<NaiveTime> {
    match value.map(str::trim) {
        None | Some("") => Ok(NaiveTime::MIN),
        Some(s) => NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .map_err(|_| AppError::Validation(format!("Invalid time '{}' (use HH:MM)", s))),
    }
}

/// Refreshed visit collection returned by every lifecycle operation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VisitSet {
    /// Visit created or updated by the operation (new id after a reschedule)
    pub visit_id: Option<i32>,
    /// Informational message (e.g. the visit was already deleted)
    pub notice: Option<String>,
    pub visits: Vec<Visit>,
}

/// A visit listed for a single date or organizer, with its 1-based position
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RankedVisit {
    pub position: usize,
    #[serde(flatten)]
    pub visit: Visit,
}

/// Query parameters for the visit listing
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct VisitQuery {
    /// Month filter (1-12, 0 or absent = whole campaign)
    pub month: Option<u32>,
}
