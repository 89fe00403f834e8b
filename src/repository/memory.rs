//! In-process record store
//!
//! Every table sits behind one mutex, so a claim check and the write it
//! guards always happen under the same lock.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::RecordStore;
use crate::{
    error::{AppError, AppResult},
    models::{Attendance, BlockedDate, District, NewProposal, NewVisit, Proposal, School, Visit},
    services::{capacity, conflict::DateClaim},
};

/// Reference data loaded into a fresh memory store
#[derive(Debug, Default, Deserialize)]
pub struct MemorySeed {
    #[serde(default)]
    pub schools: Vec<School>,
    #[serde(default)]
    pub districts: Vec<District>,
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
    #[serde(default)]
    pub blocked_dates: Vec<BlockedDate>,
}

impl MemorySeed {
    /// Read a JSON seed file
    pub fn from_file(path: &str) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Internal(format!("Cannot read seed file {}: {}", path, e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| AppError::Internal(format!("Invalid seed file {}: {}", path, e)))
    }
}

#[derive(Default)]
struct Tables {
    visits: BTreeMap<i32, Visit>,
    last_visit_id: i32,
    proposals: BTreeMap<i32, Proposal>,
    last_proposal_id: i32,
    attendance: BTreeMap<(i32, i32), bool>,
    blocked: BTreeMap<NaiveDate, Option<String>>,
    holidays: BTreeSet<NaiveDate>,
    schools: BTreeMap<i32, School>,
    districts: BTreeMap<i32, String>,
}

impl Tables {
    fn blocklist(&self, cap: usize) -> BTreeSet<NaiveDate> {
        let visits: Vec<Visit> = self.visits.values().cloned().collect();
        let mut dates = capacity::saturated_dates(&visits, cap);
        dates.extend(self.blocked.keys().copied());
        dates
    }

    fn insert(&mut self, data: &NewVisit, rescheduled_from: Option<i32>) -> Visit {
        self.last_visit_id += 1;
        let visit = data
            .clone()
            .into_visit(self.last_visit_id, rescheduled_from, Utc::now());
        self.visits.insert(visit.id, visit.clone());
        visit
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: MemorySeed) -> Self {
        let tables = Tables {
            blocked: seed
                .blocked_dates
                .into_iter()
                .map(|b| (b.blocked_date, b.reason))
                .collect(),
            holidays: seed.holidays.into_iter().collect(),
            schools: seed.schools.into_iter().map(|s| (s.rbd, s)).collect(),
            districts: seed.districts.into_iter().map(|d| (d.code, d.name)).collect(),
            ..Tables::default()
        };
        Self {
            tables: Mutex::new(tables),
        }
    }

    /// Add a date to the override blocklist
    pub async fn block_date(&self, date: NaiveDate, reason: Option<String>) {
        self.tables.lock().await.blocked.insert(date, reason);
    }

    pub async fn unblock_date(&self, date: NaiveDate) {
        self.tables.lock().await.blocked.remove(&date);
    }

    pub async fn add_holiday(&self, date: NaiveDate) {
        self.tables.lock().await.holidays.insert(date);
    }

    pub async fn add_school(&self, school: School) {
        self.tables.lock().await.schools.insert(school.rbd, school);
    }

    pub async fn add_district(&self, district: District) {
        self.tables
            .lock()
            .await
            .districts
            .insert(district.code, district.name);
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_visits(&self) -> AppResult<Vec<Visit>> {
        let tables = self.tables.lock().await;
        let mut visits: Vec<Visit> = tables.visits.values().cloned().collect();
        visits.sort_by_key(|v| (v.visit_date, v.id));
        Ok(visits)
    }

    async fn get_visit(&self, id: i32) -> AppResult<Option<Visit>> {
        Ok(self.tables.lock().await.visits.get(&id).cloned())
    }

    async fn insert_visit(&self, visit: &NewVisit, claim: &DateClaim) -> AppResult<Visit> {
        let mut tables = self.tables.lock().await;
        claim.check(&tables.blocklist(claim.cap))?;
        Ok(tables.insert(visit, None))
    }

    async fn update_visit_in_place(&self, id: i32, visit: &NewVisit) -> AppResult<Option<Visit>> {
        let mut tables = self.tables.lock().await;
        let Some(stored) = tables.visits.get_mut(&id) else {
            return Ok(None);
        };
        let mut updated = visit.clone().into_visit(id, stored.rescheduled_from, Utc::now());
        updated.visit_date = stored.visit_date;
        updated.created_at = stored.created_at;
        updated.updated_at = Some(Utc::now());
        *stored = updated.clone();
        Ok(Some(updated))
    }

    async fn reschedule_visit(
        &self,
        id: i32,
        visit: &NewVisit,
        claim: &DateClaim,
    ) -> AppResult<Option<Visit>> {
        let mut tables = self.tables.lock().await;
        if !tables.visits.contains_key(&id) {
            return Ok(None);
        }
        claim.check(&tables.blocklist(claim.cap))?;

        let replacement = tables.insert(visit, Some(id));
        tables.visits.remove(&id);

        let moved: Vec<(i32, bool)> = tables
            .attendance
            .range((id, i32::MIN)..=(id, i32::MAX))
            .map(|(&(_, organizer_id), &attends)| (organizer_id, attends))
            .collect();
        for (organizer_id, attends) in moved {
            tables.attendance.remove(&(id, organizer_id));
            tables.attendance.insert((replacement.id, organizer_id), attends);
        }

        Ok(Some(replacement))
    }

    async fn delete_visit(&self, id: i32) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        let removed = tables.visits.remove(&id).is_some();
        tables.attendance.retain(|&(visit_id, _), _| visit_id != id);
        Ok(removed)
    }

    async fn authoritative_blocklist(&self, cap: usize) -> AppResult<BTreeSet<NaiveDate>> {
        Ok(self.tables.lock().await.blocklist(cap))
    }

    async fn list_blocked_dates(&self) -> AppResult<Vec<BlockedDate>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .blocked
            .iter()
            .map(|(date, reason)| BlockedDate {
                blocked_date: *date,
                reason: reason.clone(),
            })
            .collect())
    }

    async fn list_holidays(&self) -> AppResult<BTreeSet<NaiveDate>> {
        Ok(self.tables.lock().await.holidays.clone())
    }

    async fn get_school(&self, rbd: i32) -> AppResult<Option<School>> {
        Ok(self.tables.lock().await.schools.get(&rbd).cloned())
    }

    async fn list_schools(&self) -> AppResult<Vec<School>> {
        let tables = self.tables.lock().await;
        let mut schools: Vec<School> = tables.schools.values().cloned().collect();
        schools.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(schools)
    }

    async fn list_districts(&self) -> AppResult<Vec<District>> {
        let tables = self.tables.lock().await;
        let mut districts: Vec<District> = tables
            .districts
            .iter()
            .map(|(code, name)| District {
                code: *code,
                name: name.clone(),
            })
            .collect();
        districts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(districts)
    }

    async fn list_proposals(&self) -> AppResult<Vec<Proposal>> {
        let tables = self.tables.lock().await;
        let mut proposals: Vec<Proposal> = tables.proposals.values().cloned().collect();
        proposals.sort_by_key(|p| (p.organizer_id, p.id));
        Ok(proposals)
    }

    async fn get_proposal(&self, id: i32) -> AppResult<Option<Proposal>> {
        Ok(self.tables.lock().await.proposals.get(&id).cloned())
    }

    async fn insert_proposal(&self, proposal: &NewProposal) -> AppResult<Proposal> {
        let mut tables = self.tables.lock().await;
        tables.last_proposal_id += 1;
        let row = Proposal {
            id: tables.last_proposal_id,
            organizer_id: proposal.organizer_id,
            organizer_name: proposal.organizer_name.clone(),
            rbd: proposal.rbd,
            school_name: proposal.school_name.clone(),
            created_at: Some(Utc::now()),
        };
        tables.proposals.insert(row.id, row.clone());
        Ok(row)
    }

    async fn delete_proposal(&self, id: i32) -> AppResult<bool> {
        Ok(self.tables.lock().await.proposals.remove(&id).is_some())
    }

    async fn list_attendance(&self, visit_id: i32) -> AppResult<Vec<Attendance>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .attendance
            .range((visit_id, i32::MIN)..=(visit_id, i32::MAX))
            .map(|(&(visit_id, organizer_id), &attends)| Attendance {
                visit_id,
                organizer_id,
                attends,
            })
            .collect())
    }

    async fn list_all_attendance(&self) -> AppResult<Vec<Attendance>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .attendance
            .iter()
            .map(|(&(visit_id, organizer_id), &attends)| Attendance {
                visit_id,
                organizer_id,
                attends,
            })
            .collect())
    }

    async fn set_attendance(
        &self,
        visit_id: i32,
        organizer_id: i32,
        attends: bool,
    ) -> AppResult<Attendance> {
        let mut tables = self.tables.lock().await;
        if !tables.visits.contains_key(&visit_id) {
            return Err(AppError::NotFound(format!("Visit {} not found", visit_id)));
        }
        tables.attendance.insert((visit_id, organizer_id), attends);
        Ok(Attendance {
            visit_id,
            organizer_id,
            attends,
        })
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::capacity::tests::{date, new_visit};
    use crate::services::conflict::ConflictGuard;

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let guard = ConflictGuard::new(3);
        let day = date(2024, 4, 10);

        let first = store.insert_visit(&new_visit(1, day), &guard.claim(day, None)).await.unwrap();
        let second = store.insert_visit(&new_visit(2, day), &guard.claim(day, None)).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_insert_rejected_at_cap() {
        let store = MemoryStore::new();
        let guard = ConflictGuard::new(2);
        let day = date(2024, 4, 10);

        for organizer in 1..=2 {
            store
                .insert_visit(&new_visit(organizer, day), &guard.claim(day, None))
                .await
                .unwrap();
        }
        let err = store
            .insert_visit(&new_visit(3, day), &guard.claim(day, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DateUnavailable(d) if d == day));
        assert_eq!(store.list_visits().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reschedule_moves_attendance() {
        let store = MemoryStore::new();
        let guard = ConflictGuard::new(3);
        let from = date(2024, 5, 1);
        let to = date(2024, 5, 2);

        let original = store.insert_visit(&new_visit(1, from), &guard.claim(from, None)).await.unwrap();
        store.set_attendance(original.id, 17, true).await.unwrap();

        let replacement = store
            .reschedule_visit(original.id, &new_visit(1, to), &guard.claim(to, Some(from)))
            .await
            .unwrap()
            .unwrap();

        assert_ne!(replacement.id, original.id);
        assert_eq!(replacement.rescheduled_from, Some(original.id));
        assert!(store.get_visit(original.id).await.unwrap().is_none());
        assert!(store.list_attendance(original.id).await.unwrap().is_empty());
        let moved = store.list_attendance(replacement.id).await.unwrap();
        assert_eq!(moved.len(), 1);
        assert!(moved[0].attends);
    }

    #[tokio::test]
    async fn test_reschedule_missing_visit() {
        let store = MemoryStore::new();
        let guard = ConflictGuard::new(3);
        let to = date(2024, 5, 2);
        let result = store
            .reschedule_visit(42, &new_visit(1, to), &guard.claim(to, None))
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(store.list_visits().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blocklist_combines_overrides_and_counts() {
        let store = MemoryStore::new();
        let guard = ConflictGuard::new(1);
        let counted = date(2024, 6, 3);
        let overridden = date(2024, 6, 4);

        store.insert_visit(&new_visit(1, counted), &guard.claim(counted, None)).await.unwrap();
        store.block_date(overridden, None).await;

        let blocklist = store.authoritative_blocklist(1).await.unwrap();
        assert!(blocklist.contains(&counted));
        assert!(blocklist.contains(&overridden));

        store.unblock_date(overridden).await;
        assert!(!store.authoritative_blocklist(1).await.unwrap().contains(&overridden));
    }

    #[test]
    fn test_seed_parsing() {
        let seed: MemorySeed = serde_json::from_str(
            r#"{
                "schools": [{"rbd": 8485, "name": "Liceo de Aplicación", "district_code": 13101}],
                "holidays": ["2024-05-01"],
                "blocked_dates": [{"blocked_date": "2024-09-18", "reason": null}]
            }"#,
        )
        .unwrap();
        assert_eq!(seed.schools.len(), 1);
        assert!(seed.districts.is_empty());
        assert_eq!(seed.holidays, vec![date(2024, 5, 1)]);
    }
}
