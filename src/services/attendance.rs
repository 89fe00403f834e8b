//! Attendance service: which universities join each visit

use std::{collections::HashMap, sync::Arc};

use crate::{
    error::{AppError, AppResult},
    models::{Attendance, AttendanceSummary, Organizer},
    repository::RecordStore,
};

#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn RecordStore>,
    organizers: Vec<Organizer>,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn RecordStore>, organizers: Vec<Organizer>) -> Self {
        Self { store, organizers }
    }

    pub async fn get(&self, visit_id: i32) -> AppResult<AttendanceSummary> {
        self.ensure_visit(visit_id).await?;
        let rows = self.store.list_attendance(visit_id).await?;
        let (attending, not_attending) = split_attendance(&self.organizers, &rows);
        Ok(AttendanceSummary {
            visit_id,
            attending,
            not_attending,
        })
    }

    /// Set the caller's own attendance flag
    pub async fn set(
        &self,
        organizer: &Organizer,
        visit_id: i32,
        attends: bool,
    ) -> AppResult<Attendance> {
        organizer.require_editor()?;
        self.ensure_visit(visit_id).await?;
        let row = self.store.set_attendance(visit_id, organizer.id, attends).await?;
        tracing::info!(
            "Organizer {} attendance on visit {} set to {}",
            organizer.id,
            visit_id,
            attends
        );
        Ok(row)
    }

    async fn ensure_visit(&self, visit_id: i32) -> AppResult<()> {
        match self.store.get_visit(visit_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("Visit {} not found", visit_id))),
        }
    }
}

/// Names of attending and non-attending organizers; a missing row counts as not attending
pub fn split_attendance(
    organizers: &[Organizer],
    rows: &[Attendance],
) -> (Vec<String>, Vec<String>) {
    let answers: HashMap<i32, bool> = rows.iter().map(|r| (r.organizer_id, r.attends)).collect();
    let (attending, not_attending): (Vec<&Organizer>, Vec<&Organizer>) = organizers
        .iter()
        .partition(|o| answers.get(&o.id).copied().unwrap_or(false));
    (
        attending.into_iter().map(|o| o.name.clone()).collect(),
        not_attending.into_iter().map(|o| o.name.clone()).collect(),
    )
}
