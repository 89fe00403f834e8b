//! Visit lifecycle service
//!
//! Every write returns the refreshed visit set. A date change is a
//! replacement: the store deletes the original and inserts a new record under
//! a fresh id, gated by the authoritative blocklist.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use validator::Validate;

use crate::{
    config::CampaignConfig,
    error::{AppError, AppResult},
    models::{
        visit::{parse_time_or_midnight, CreateVisit, RankedVisit, UpdateVisit},
        NewVisit, Organizer, Visit, VisitSet,
    },
    repository::RecordStore,
};

use super::conflict::ConflictGuard;

#[derive(Clone)]
pub struct VisitsService {
    store: Arc<dyn RecordStore>,
    guard: ConflictGuard,
    campaign: CampaignConfig,
}

impl VisitsService {
    pub fn new(store: Arc<dyn RecordStore>, campaign: CampaignConfig) -> Self {
        Self {
            store,
            guard: ConflictGuard::new(campaign.daily_cap),
            campaign,
        }
    }

    /// All visits ordered by date then id, optionally restricted to a month
    pub async fn list(&self, month: Option<u32>) -> AppResult<Vec<Visit>> {
        let visits = self.store.list_visits().await?;
        Ok(in_month(visits, month))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Visit> {
        self.store
            .get_visit(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Visit {} not found", id)))
    }

    /// Visits scheduled on a date
    pub async fn on_date(&self, date: NaiveDate) -> AppResult<Vec<RankedVisit>> {
        let visits = self.store.list_visits().await?;
        Ok(ranked(visits.into_iter().filter(|v| v.visit_date == date)))
    }

    /// Visits of an organizer from `today` onwards
    pub async fn upcoming_for(
        &self,
        organizer: &Organizer,
        today: NaiveDate,
    ) -> AppResult<Vec<RankedVisit>> {
        let visits = self.store.list_visits().await?;
        Ok(ranked(visits.into_iter().filter(|v| {
            v.organizer_id == organizer.id && v.visit_date >= today
        })))
    }

    /// Schedule a new visit for `organizer`
    pub async fn create(&self, organizer: &Organizer, data: &CreateVisit) -> AppResult<VisitSet> {
        organizer.require_editor()?;
        data.validate()?;
        self.check_schedulable(data.visit_date).await?;

        let school = self
            .store
            .get_school(data.rbd)
            .await?
            .ok_or_else(|| AppError::Validation(format!("Unknown school RBD {}", data.rbd)))?;

        let record = NewVisit {
            visit_date: data.visit_date,
            organizer_id: organizer.id,
            organizer_name: organizer.name.clone(),
            rbd: school.rbd,
            school_name: school.name,
            district_code: data.district_code.or(Some(school.district_code)),
            address: data.address.clone(),
            start_time: parse_time_or_midnight(data.start_time.as_deref())?,
            end_time: parse_time_or_midnight(data.end_time.as_deref())?,
            install_time: parse_time_or_midnight(data.install_time.as_deref())?,
            contact_name: data.contact_name.clone(),
            contact_phone: data.contact_phone.clone(),
            contact_email: data.contact_email.clone(),
            contact_role: data.contact_role.clone(),
            counselor_name: data.counselor_name.clone(),
            counselor_phone: data.counselor_phone.clone(),
            counselor_email: data.counselor_email.clone(),
            status: data.status.unwrap_or_default(),
            notes: data.notes.clone(),
        };

        let claim = self.guard.claim(data.visit_date, None);
        let visit = self
            .store
            .insert_visit(&record, &claim)
            .await
            .map_err(|e| log_conflict(e, organizer))?;

        tracing::info!(
            "Visit {} created by organizer {} on {} (RBD {})",
            visit.id,
            organizer.id,
            visit.visit_date,
            visit.rbd
        );
        self.refreshed(Some(visit.id), None).await
    }

    /// Edit a visit; a new date replaces it under a new id
    pub async fn update(
        &self,
        organizer: &Organizer,
        id: i32,
        data: &UpdateVisit,
    ) -> AppResult<VisitSet> {
        organizer.require_editor()?;
        data.validate()?;

        let original = self.get_by_id(id).await.map_err(|e| {
            tracing::warn!("Update of visit {} by organizer {}: {}", id, organizer.id, e);
            e
        })?;
        organizer.require_owner(original.organizer_id, &format!("Visit {}", id))?;

        let record = data.apply_to(&original)?;

        if original.visit_date == data.visit_date {
            let updated = self
                .store
                .update_visit_in_place(id, &record)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Visit {} not found", id)))?;
            tracing::info!("Visit {} updated in place by organizer {}", id, organizer.id);
            return self.refreshed(Some(updated.id), None).await;
        }

        self.check_schedulable(data.visit_date).await?;
        let claim = self.guard.claim(data.visit_date, Some(original.visit_date));
        let replacement = self
            .store
            .reschedule_visit(id, &record, &claim)
            .await
            .map_err(|e| log_conflict(e, organizer))?
            .ok_or_else(|| AppError::NotFound(format!("Visit {} not found", id)))?;

        tracing::info!(
            "Visit {} moved from {} to {} as visit {}",
            id,
            original.visit_date,
            replacement.visit_date,
            replacement.id
        );
        self.refreshed(Some(replacement.id), None).await
    }

    /// Remove a visit. A missing id is reported through the notice
    pub async fn delete(&self, organizer: &Organizer, id: i32) -> AppResult<VisitSet> {
        organizer.require_editor()?;

        let Some(visit) = self.store.get_visit(id).await? else {
            return self.already_deleted(id).await;
        };
        organizer.require_owner(visit.organizer_id, &format!("Visit {}", id))?;

        if !self.store.delete_visit(id).await? {
            return self.already_deleted(id).await;
        }

        tracing::info!(
            "Visit {} on {} deleted by organizer {}",
            id,
            visit.visit_date,
            organizer.id
        );
        self.refreshed(None, None).await
    }

    /// Window and holiday checks for a date about to be occupied
    async fn check_schedulable(&self, date: NaiveDate) -> AppResult<()> {
        if date < self.campaign.start_date || date > self.campaign.end_date {
            return Err(AppError::Validation(format!(
                "Date {} is outside the campaign ({} to {})",
                date, self.campaign.start_date, self.campaign.end_date
            )));
        }
        if self.store.list_holidays().await?.contains(&date) {
            return Err(AppError::Validation(format!("Date {} is a holiday", date)));
        }
        Ok(())
    }

    async fn already_deleted(&self, id: i32) -> AppResult<VisitSet> {
        tracing::warn!("Visit {} was already deleted", id);
        self.refreshed(None, Some(format!("Visit {} was already deleted", id)))
            .await
    }

    async fn refreshed(&self, visit_id: Option<i32>, notice: Option<String>) -> AppResult<VisitSet> {
        Ok(VisitSet {
            visit_id,
            notice,
            visits: self.store.list_visits().await?,
        })
    }
}

fn log_conflict(error: AppError, organizer: &Organizer) -> AppError {
    if let AppError::DateUnavailable(date) = &error {
        tracing::warn!("Organizer {} lost date {}: no longer available", organizer.id, date);
    }
    error
}

/// Month 0 or absent keeps every visit
pub(crate) fn in_month(visits: Vec<Visit>, month: Option<u32>) -> Vec<Visit> {
    match month {
        None | Some(0) => visits,
        Some(m) => visits
            .into_iter()
            .filter(|v| v.visit_date.month() == m)
            .collect(),
    }
}

fn ranked(visits: impl Iterator<Item = Visit>) -> Vec<RankedVisit> {
    visits
        .enumerate()
        .map(|(i, visit)| RankedVisit {
            position: i + 1,
            visit,
        })
        .collect()
}
