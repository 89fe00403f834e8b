//! School catalog service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{District, School},
    repository::RecordStore,
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn RecordStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Schools ordered by name
    pub async fn list_schools(&self) -> AppResult<Vec<School>> {
        self.store.list_schools().await
    }

    pub async fn get_school(&self, rbd: i32) -> AppResult<School> {
        self.store
            .get_school(rbd)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("School with RBD {} not found", rbd)))
    }

    pub async fn list_districts(&self) -> AppResult<Vec<District>> {
        self.store.list_districts().await
    }
}
