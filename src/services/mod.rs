//! Business logic services

pub mod attendance;
pub mod auth;
pub mod calendar;
pub mod capacity;
pub mod catalog;
pub mod conflict;
pub mod export;
pub mod proposals;
pub mod visits;

use std::sync::Arc;

use crate::{config::AppConfig, models::Organizer, repository::RecordStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn RecordStore>,
    pub auth: auth::AuthService,
    pub visits: visits::VisitsService,
    pub calendar: calendar::CalendarService,
    pub proposals: proposals::ProposalsService,
    pub attendance: attendance::AttendanceService,
    pub export: export::ExportService,
    pub catalog: catalog::CatalogService,
}

impl Services {
    /// Create all services over the given record store
    pub fn new(store: Arc<dyn RecordStore>, config: &AppConfig) -> Self {
        let organizers = configured_organizers(config);
        Self {
            auth: auth::AuthService::new(config.auth.clone(), config.organizers.clone()),
            visits: visits::VisitsService::new(store.clone(), config.campaign.clone()),
            calendar: calendar::CalendarService::new(store.clone(), config.campaign.clone()),
            proposals: proposals::ProposalsService::new(store.clone()),
            attendance: attendance::AttendanceService::new(store.clone(), organizers.clone()),
            export: export::ExportService::new(
                store.clone(),
                organizers,
                config.campaign.title.clone(),
            ),
            catalog: catalog::CatalogService::new(store.clone()),
            store,
        }
    }
}

/// Universities in id order
fn configured_organizers(config: &AppConfig) -> Vec<Organizer> {
    let mut organizers: Vec<Organizer> = config
        .organizers
        .iter()
        .map(|o| Organizer {
            id: o.id,
            name: o.name.clone(),
        })
        .collect();
    organizers.sort_by_key(|o| o.id);
    organizers
}
