//! Proposals repository

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{NewProposal, Proposal},
};

#[derive(Clone)]
pub struct ProposalsRepository {
    pool: Pool<Postgres>,
}

impl ProposalsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List proposals ordered by organizer then id
    pub async fn list(&self) -> AppResult<Vec<Proposal>> {
        let rows = sqlx::query_as::<_, Proposal>(
            "SELECT * FROM proposals ORDER BY organizer_id, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Proposal>> {
        let row = sqlx::query_as::<_, Proposal>("SELECT * FROM proposals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn create(&self, data: &NewProposal) -> AppResult<Proposal> {
        let row = sqlx::query_as::<_, Proposal>(
            r#"
            INSERT INTO proposals (organizer_id, organizer_name, rbd, school_name)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.organizer_id)
        .bind(&data.organizer_name)
        .bind(data.rbd)
        .bind(&data.school_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM proposals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
