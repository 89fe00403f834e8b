//! Record store: persistence of visits, proposals, attendance and reference data

pub mod attendance;
pub mod calendar;
pub mod memory;
pub mod proposals;
pub mod schools;
pub mod visits;

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Attendance, BlockedDate, District, NewProposal, NewVisit, Proposal, School, Visit},
    services::conflict::DateClaim,
};

/// Storage collaborator used by every service
///
/// Writes that take a [`DateClaim`] must evaluate it against a blocklist read
/// in the same atomic step as the write, so two sessions can never both fill
/// the last slot of a day.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    // ---- Visits ----

    /// All visits ordered by date then id
    async fn list_visits(&self) -> AppResult<Vec<Visit>>;

    async fn get_visit(&self, id: i32) -> AppResult<Option<Visit>>;

    /// Insert a visit under a new identity, unless the claim is rejected
    async fn insert_visit(&self, visit: &NewVisit, claim: &DateClaim) -> AppResult<Visit>;

    /// Overwrite the fields of a visit, keeping its identity and date
    async fn update_visit_in_place(&self, id: i32, visit: &NewVisit) -> AppResult<Option<Visit>>;

    /// Replace visit `id` by a new record on the claimed date
    ///
    /// Returns `None` when `id` no longer exists. Attendance moves to the new
    /// identity.
    async fn reschedule_visit(
        &self,
        id: i32,
        visit: &NewVisit,
        claim: &DateClaim,
    ) -> AppResult<Option<Visit>>;

    /// Returns whether a record was removed
    async fn delete_visit(&self, id: i32) -> AppResult<bool>;

    // ---- Blocklist & calendar ----

    /// Override list plus every date whose stored count reaches `cap`
    async fn authoritative_blocklist(&self, cap: usize) -> AppResult<BTreeSet<NaiveDate>>;

    async fn list_blocked_dates(&self) -> AppResult<Vec<BlockedDate>>;

    async fn list_holidays(&self) -> AppResult<BTreeSet<NaiveDate>>;

    // ---- Catalog ----

    async fn get_school(&self, rbd: i32) -> AppResult<Option<School>>;

    async fn list_schools(&self) -> AppResult<Vec<School>>;

    async fn list_districts(&self) -> AppResult<Vec<District>>;

    // ---- Proposals ----

    /// All proposals ordered by organizer then id
    async fn list_proposals(&self) -> AppResult<Vec<Proposal>>;

    async fn get_proposal(&self, id: i32) -> AppResult<Option<Proposal>>;

    async fn insert_proposal(&self, proposal: &NewProposal) -> AppResult<Proposal>;

    async fn delete_proposal(&self, id: i32) -> AppResult<bool>;

    // ---- Attendance ----

    async fn list_attendance(&self, visit_id: i32) -> AppResult<Vec<Attendance>>;

    async fn list_all_attendance(&self) -> AppResult<Vec<Attendance>>;

    async fn set_attendance(
        &self,
        visit_id: i32,
        organizer_id: i32,
        attends: bool,
    ) -> AppResult<Attendance>;

    /// Readiness probe
    async fn ping(&self) -> AppResult<()>;
}

/// PostgreSQL record store holding the connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub visits: visits::VisitsRepository,
    pub proposals: proposals::ProposalsRepository,
    pub attendance: attendance::AttendanceRepository,
    pub calendar: calendar::CalendarRepository,
    pub schools: schools::SchoolsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            visits: visits::VisitsRepository::new(pool.clone()),
            proposals: proposals::ProposalsRepository::new(pool.clone()),
            attendance: attendance::AttendanceRepository::new(pool.clone()),
            calendar: calendar::CalendarRepository::new(pool.clone()),
            schools: schools::SchoolsRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl RecordStore for Repository {
    async fn list_visits(&self) -> AppResult<Vec<Visit>> {
        self.visits.list().await
    }

    async fn get_visit(&self, id: i32) -> AppResult<Option<Visit>> {
        self.visits.get_by_id(id).await
    }

    async fn insert_visit(&self, visit: &NewVisit, claim: &DateClaim) -> AppResult<Visit> {
        self.visits.create(visit, claim).await
    }

    async fn update_visit_in_place(&self, id: i32, visit: &NewVisit) -> AppResult<Option<Visit>> {
        self.visits.update_in_place(id, visit).await
    }

    async fn reschedule_visit(
        &self,
        id: i32,
        visit: &NewVisit,
        claim: &DateClaim,
    ) -> AppResult<Option<Visit>> {
        self.visits.reschedule(id, visit, claim).await
    }

    async fn delete_visit(&self, id: i32) -> AppResult<bool> {
        self.visits.delete(id).await
    }

    async fn authoritative_blocklist(&self, cap: usize) -> AppResult<BTreeSet<NaiveDate>> {
        visits::blocklist_with(&self.pool, cap).await
    }

    async fn list_blocked_dates(&self) -> AppResult<Vec<BlockedDate>> {
        self.calendar.list_blocked_dates().await
    }

    async fn list_holidays(&self) -> AppResult<BTreeSet<NaiveDate>> {
        self.calendar.list_holidays().await
    }

    async fn get_school(&self, rbd: i32) -> AppResult<Option<School>> {
        self.schools.get_by_rbd(rbd).await
    }

    async fn list_schools(&self) -> AppResult<Vec<School>> {
        self.schools.list().await
    }

    async fn list_districts(&self) -> AppResult<Vec<District>> {
        self.schools.list_districts().await
    }

    async fn list_proposals(&self) -> AppResult<Vec<Proposal>> {
        self.proposals.list().await
    }

    async fn get_proposal(&self, id: i32) -> AppResult<Option<Proposal>> {
        self.proposals.get_by_id(id).await
    }

    async fn insert_proposal(&self, proposal: &NewProposal) -> AppResult<Proposal> {
        self.proposals.create(proposal).await
    }

    async fn delete_proposal(&self, id: i32) -> AppResult<bool> {
        self.proposals.delete(id).await
    }

    async fn list_attendance(&self, visit_id: i32) -> AppResult<Vec<Attendance>> {
        self.attendance.list_for_visit(visit_id).await
    }

    async fn list_all_attendance(&self) -> AppResult<Vec<Attendance>> {
        self.attendance.list_all().await
    }

    async fn set_attendance(
        &self,
        visit_id: i32,
        organizer_id: i32,
        attends: bool,
    ) -> AppResult<Attendance> {
        self.attendance.upsert(visit_id, organizer_id, attends).await
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
