//! Visits repository

use std::collections::BTreeSet;

use chrono::NaiveDate;
use sqlx::{PgExecutor, Pool, Postgres, Transaction};

use crate::{
    error::AppResult,
    models::{NewVisit, Visit},
    services::conflict::DateClaim,
};

/// Advisory lock serializing every write that occupies a visit slot
const SCHEDULING_LOCK_KEY: i64 = 0x5643_4150; // "VCAP"

#[derive(Clone)]
pub struct VisitsRepository {
    pool: Pool<Postgres>,
}

impl VisitsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all visits ordered by date then id
    pub async fn list(&self) -> AppResult<Vec<Visit>> {
        let rows = sqlx::query_as::<_, Visit>("SELECT * FROM visits ORDER BY visit_date, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get visit by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Visit>> {
        let row = sqlx::query_as::<_, Visit>("SELECT * FROM visits WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a visit once the claim passes against a blocklist read in the same transaction
    pub async fn create(&self, data: &NewVisit, claim: &DateClaim) -> AppResult<Visit> {
        let mut tx = self.pool.begin().await?;
        lock_scheduling(&mut tx).await?;

        let blocklist = blocklist_with(&mut *tx, claim.cap).await?;
        claim.check(&blocklist)?;

        let row = insert_with(&mut *tx, data, None).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Overwrite the editable fields of a visit, keeping its id
    pub async fn update_in_place(&self, id: i32, data: &NewVisit) -> AppResult<Option<Visit>> {
        let row = sqlx::query_as::<_, Visit>(
            r#"
            UPDATE visits SET
                address = $2, district_code = $3,
                start_time = $4, end_time = $5, install_time = $6,
                contact_name = $7, contact_phone = $8, contact_email = $9, contact_role = $10,
                counselor_name = $11, counselor_phone = $12, counselor_email = $13,
                status = $14, notes = $15, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.address)
        .bind(data.district_code)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.install_time)
        .bind(&data.contact_name)
        .bind(&data.contact_phone)
        .bind(&data.contact_email)
        .bind(&data.contact_role)
        .bind(&data.counselor_name)
        .bind(&data.counselor_phone)
        .bind(&data.counselor_email)
        .bind(data.status)
        .bind(&data.notes)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Move a visit to another date as delete + insert under a new id
    pub async fn reschedule(
        &self,
        id: i32,
        data: &NewVisit,
        claim: &DateClaim,
    ) -> AppResult<Option<Visit>> {
        let mut tx = self.pool.begin().await?;
        lock_scheduling(&mut tx).await?;

        let existing: Option<i32> =
            sqlx::query_scalar("SELECT id FROM visits WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            return Ok(None);
        }

        let blocklist = blocklist_with(&mut *tx, claim.cap).await?;
        claim.check(&blocklist)?;

        let row = insert_with(&mut *tx, data, Some(id)).await?;

        sqlx::query("UPDATE attendance SET visit_id = $1 WHERE visit_id = $2")
            .bind(row.id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM visits WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(row))
    }

    /// Delete a visit (attendance rows cascade)
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM visits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Override list plus saturated dates, read through any executor
pub(crate) async fn blocklist_with<'e, E>(executor: E, cap: usize) -> AppResult<BTreeSet<NaiveDate>>
where
    E: PgExecutor<'e>,
{
    let rows: Vec<NaiveDate> = sqlx::query_scalar(
        r#"
        SELECT blocked_date FROM blocked_dates
        UNION
        SELECT visit_date FROM visits GROUP BY visit_date HAVING COUNT(*) >= $1
        "#,
    )
    .bind(cap as i64)
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().collect())
}

async fn lock_scheduling(tx: &mut Transaction<'static, Postgres>) -> AppResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEDULING_LOCK_KEY)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn insert_with<'e, E>(
    executor: E,
    data: &NewVisit,
    rescheduled_from: Option<i32>,
) -> AppResult<Visit>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, Visit>(
        r#"
        INSERT INTO visits (
            visit_date, organizer_id, organizer_name,
            rbd, school_name, district_code, address,
            start_time, end_time, install_time,
            contact_name, contact_phone, contact_email, contact_role,
            counselor_name, counselor_phone, counselor_email,
            status, notes, rescheduled_from
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
        RETURNING *
        "#,
    )
    .bind(data.visit_date)
    .bind(data.organizer_id)
    .bind(&data.organizer_name)
    .bind(data.rbd)
    .bind(&data.school_name)
    .bind(data.district_code)
    .bind(&data.address)
    .bind(data.start_time)
    .bind(data.end_time)
    .bind(data.install_time)
    .bind(&data.contact_name)
    .bind(&data.contact_phone)
    .bind(&data.contact_email)
    .bind(&data.contact_role)
    .bind(&data.counselor_name)
    .bind(&data.counselor_phone)
    .bind(&data.counselor_email)
    .bind(data.status)
    .bind(&data.notes)
    .bind(rescheduled_from)
    .fetch_one(executor)
    .await?;
    Ok(row)
}
