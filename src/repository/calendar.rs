//! Holidays and override blocklist

use std::collections::BTreeSet;

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::BlockedDate};

#[derive(Clone)]
pub struct CalendarRepository {
    pool: Pool<Postgres>,
}

impl CalendarRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list_blocked_dates(&self) -> AppResult<Vec<BlockedDate>> {
        let rows = sqlx::query_as::<_, BlockedDate>(
            "SELECT blocked_date, reason FROM blocked_dates ORDER BY blocked_date",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_holidays(&self) -> AppResult<BTreeSet<NaiveDate>> {
        let rows: Vec<NaiveDate> = sqlx::query_scalar("SELECT holiday_date FROM holidays")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().collect())
    }
}
