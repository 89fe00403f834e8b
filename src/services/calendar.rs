//! Campaign calendar service

use std::{collections::BTreeSet, sync::Arc};

use chrono::{Datelike, Duration, NaiveDate};

use crate::{
    config::CampaignConfig,
    error::AppResult,
    models::calendar::{BlockCheck, BlocklistKind, CampaignInfo, DayLoad},
    repository::RecordStore,
};

use super::{
    capacity,
    conflict::{BlocklistSource, ConflictGuard},
};

/// Days searched for the first working day
const WORKING_DAY_HORIZON: usize = 14;

#[derive(Clone)]
pub struct CalendarService {
    store: Arc<dyn RecordStore>,
    guard: ConflictGuard,
    campaign: CampaignConfig,
}

impl CalendarService {
    pub fn new(store: Arc<dyn RecordStore>, campaign: CampaignConfig) -> Self {
        Self {
            store,
            guard: ConflictGuard::new(campaign.daily_cap),
            campaign,
        }
    }

    /// Campaign parameters as seen on `today`
    pub async fn campaign(&self, today: NaiveDate) -> AppResult<CampaignInfo> {
        let holidays = self.store.list_holidays().await?;
        let blocked_dates = self.store.list_blocked_dates().await?;
        Ok(CampaignInfo {
            title: self.campaign.title.clone(),
            start_date: self.campaign.start_date,
            end_date: self.campaign.end_date,
            daily_cap: self.campaign.daily_cap,
            first_available_date: first_available_date(
                today,
                self.campaign.start_date,
                &holidays,
            ),
            holidays: holidays.into_iter().collect(),
            blocked_dates,
        })
    }

    /// Load of every campaign day, optionally restricted to a month
    pub async fn calendar(&self, month: Option<u32>) -> AppResult<Vec<DayLoad>> {
        let visits = self.store.list_visits().await?;
        let counts = capacity::daily_counts(&visits);
        let overrides: BTreeSet<NaiveDate> = self
            .store
            .list_blocked_dates()
            .await?
            .into_iter()
            .map(|b| b.blocked_date)
            .collect();
        let holidays = self.store.list_holidays().await?;
        let cap = self.guard.cap();

        Ok(self
            .campaign
            .start_date
            .iter_days()
            .take_while(|d| *d <= self.campaign.end_date)
            .filter(|d| matches!(month, None | Some(0)) || Some(d.month()) == month)
            .map(|date| {
                let visits = counts.get(&date).copied().unwrap_or(0);
                let overridden = overrides.contains(&date);
                DayLoad {
                    date,
                    visits,
                    remaining: cap.saturating_sub(visits),
                    blocked: overridden || visits >= cap,
                    overridden,
                    holiday: holidays.contains(&date),
                }
            })
            .collect())
    }

    /// Current blocklist of the requested source
    pub async fn blocked_dates(&self, kind: BlocklistKind) -> AppResult<Vec<NaiveDate>> {
        let blocklist = match kind {
            BlocklistKind::Local => {
                let visits = self.store.list_visits().await?;
                self.guard.blocklist(BlocklistSource::Local(&visits)).await?
            }
            BlocklistKind::Authoritative => {
                self.guard
                    .blocklist(BlocklistSource::Authoritative(self.store.as_ref()))
                    .await?
            }
        };
        Ok(blocklist.into_iter().collect())
    }

    /// Whether `date` is blocked for a booking that gives up `exclude`
    pub async fn check(
        &self,
        date: NaiveDate,
        exclude: Option<NaiveDate>,
        kind: BlocklistKind,
    ) -> AppResult<BlockCheck> {
        let blocked = match kind {
            BlocklistKind::Local => {
                let visits = self.store.list_visits().await?;
                self.guard
                    .is_blocked(date, BlocklistSource::Local(&visits), exclude)
                    .await?
            }
            BlocklistKind::Authoritative => {
                self.guard
                    .is_blocked(date, BlocklistSource::Authoritative(self.store.as_ref()), exclude)
                    .await?
            }
        };
        Ok(BlockCheck {
            date,
            blocked,
            source: kind,
        })
    }
}

/// First non-holiday day within two weeks of `today`, never before the campaign start
pub fn first_available_date(
    today: NaiveDate,
    campaign_start: NaiveDate,
    holidays: &BTreeSet<NaiveDate>,
) -> NaiveDate {
    let from = today.max(campaign_start);
    from.iter_days()
        .take(WORKING_DAY_HORIZON)
        .find(|d| !holidays.contains(d))
        .unwrap_or(from + Duration::days(WORKING_DAY_HORIZON as i64))
}
