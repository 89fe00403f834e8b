//! Date conflict guard
//!
//! Two blocklist sources exist. The local one is computed from a visit
//! snapshot the caller already holds and may be stale; it only drives eager
//! UI feedback. The authoritative one is read fresh from the record store and
//! is the gate every write goes through. Stores re-check a [`DateClaim`]
//! inside the transaction that performs the write.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::Visit,
    repository::RecordStore,
};

use super::capacity;

/// Where the blocklist comes from
#[derive(Clone, Copy)]
pub enum BlocklistSource<'a> {
    /// Count-based blocklist over an in-memory snapshot
    Local(&'a [Visit]),
    /// Override list plus stored counts, read from the record store
    Authoritative(&'a dyn RecordStore),
}

/// Whether `date` is blocked once `exclude` is dropped from the blocklist
///
/// The exclusion lifts overrides as well as counts: a booking already held on
/// `exclude` keeps its slot even when that date was blocked afterwards.
pub fn is_blocked_in(
    blocklist: &BTreeSet<NaiveDate>,
    date: NaiveDate,
    exclude: Option<NaiveDate>,
) -> bool {
    if exclude == Some(date) {
        return false;
    }
    blocklist.contains(&date)
}

/// Request to occupy a slot on `date`, re-checked by the store at write time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateClaim {
    pub date: NaiveDate,
    /// Date being given up by the same booking
    pub exclude: Option<NaiveDate>,
    pub cap: usize,
}

impl DateClaim {
    /// Fails with `DateUnavailable` when the blocklist rejects the claim
    pub fn check(&self, blocklist: &BTreeSet<NaiveDate>) -> AppResult<()> {
        if is_blocked_in(blocklist, self.date, self.exclude) {
            Err(AppError::DateUnavailable(self.date))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConflictGuard {
    cap: usize,
}

impl ConflictGuard {
    pub fn new(cap: usize) -> Self {
        Self { cap }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Current blocklist of the given source
    pub async fn blocklist(&self, source: BlocklistSource<'_>) -> AppResult<BTreeSet<NaiveDate>> {
        match source {
            BlocklistSource::Local(visits) => Ok(capacity::saturated_dates(visits, self.cap)),
            BlocklistSource::Authoritative(store) => store.authoritative_blocklist(self.cap).await,
        }
    }

    /// Whether scheduling on `date` is blocked, ignoring `exclude`
    pub async fn is_blocked(
        &self,
        date: NaiveDate,
        source: BlocklistSource<'_>,
        exclude: Option<NaiveDate>,
    ) -> AppResult<bool> {
        let blocklist = self.blocklist(source).await?;
        Ok(is_blocked_in(&blocklist, date, exclude))
    }

    /// Claim to hand to the store for its in-transaction re-check
    pub fn claim(&self, date: NaiveDate, exclude: Option<NaiveDate>) -> DateClaim {
        DateClaim {
            date,
            exclude,
            cap: self.cap,
        }
    }
}
