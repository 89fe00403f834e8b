//! School catalog repository

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{District, School},
};

#[derive(Clone)]
pub struct SchoolsRepository {
    pool: Pool<Postgres>,
}

impl SchoolsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_rbd(&self, rbd: i32) -> AppResult<Option<School>> {
        let row = sqlx::query_as::<_, School>("SELECT * FROM schools WHERE rbd = $1")
            .bind(rbd)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list(&self) -> AppResult<Vec<School>> {
        let rows = sqlx::query_as::<_, School>("SELECT * FROM schools ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_districts(&self) -> AppResult<Vec<District>> {
        let rows = sqlx::query_as::<_, District>("SELECT * FROM districts ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
