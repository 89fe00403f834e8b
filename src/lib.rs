//! School Visits Server
//!
//! Schedules university visits to schools over a campaign, keeping at most a
//! fixed number of visits per day, and serves a REST JSON API for the
//! participating universities.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
