//! Attendance repository

use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::Attendance};

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: Pool<Postgres>,
}

impl AttendanceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Attendance rows of one visit, ordered by organizer
    pub async fn list_for_visit(&self, visit_id: i32) -> AppResult<Vec<Attendance>> {
        let rows = sqlx::query_as::<_, Attendance>(
            r#"
            SELECT visit_id, organizer_id, attends FROM attendance
            WHERE visit_id = $1
            ORDER BY organizer_id
            "#,
        )
        .bind(visit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_all(&self) -> AppResult<Vec<Attendance>> {
        let rows = sqlx::query_as::<_, Attendance>(
            "SELECT visit_id, organizer_id, attends FROM attendance ORDER BY visit_id, organizer_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert or overwrite the flag of one organizer
    pub async fn upsert(&self, visit_id: i32, organizer_id: i32, attends: bool) -> AppResult<Attendance> {
        let row = sqlx::query_as::<_, Attendance>(
            r#"
            INSERT INTO attendance (visit_id, organizer_id, attends)
            VALUES ($1, $2, $3)
            ON CONFLICT (visit_id, organizer_id)
            DO UPDATE SET attends = EXCLUDED.attends, updated_at = NOW()
            RETURNING visit_id, organizer_id, attends
            "#,
        )
        .bind(visit_id)
        .bind(organizer_id)
        .bind(attends)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
