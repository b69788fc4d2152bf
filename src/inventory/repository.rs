// src/inventory/repository.rs
// Persistence seams for projects and products

use async_trait::async_trait;
use thiserror::Error;

use super::types::{
    DeleteOutcome, NewProduct, NewProject, Product, ProductPatch, Project, ProjectPatch,
    ProjectWithProducts,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("integrity violation: {0}")]
    Integrity(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// All projects, ordered by id, each with its products attached.
    async fn list_projects(&self) -> StoreResult<Vec<ProjectWithProducts>>;

    async fn get_project(&self, id: i64) -> StoreResult<Option<Project>>;

    async fn get_project_with_products(&self, id: i64) -> StoreResult<Option<ProjectWithProducts>>;

    async fn project_exists(&self, id: i64) -> StoreResult<bool>;

    async fn create_project(&self, input: NewProject) -> StoreResult<Project>;

    async fn update_project(&self, id: i64, patch: ProjectPatch) -> StoreResult<Option<Project>>;

    /// Refuses to delete a project that still owns products.
    async fn delete_project(&self, id: i64) -> StoreResult<DeleteOutcome>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    async fn list_products_for_project(&self, project_id: i64) -> StoreResult<Vec<Product>>;

    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>>;

    async fn create_product(&self, input: NewProduct) -> StoreResult<Product>;

    async fn update_product(&self, id: i64, patch: ProductPatch) -> StoreResult<Option<Product>>;

    /// Returns false when no product had this id.
    async fn delete_product(&self, id: i64) -> StoreResult<bool>;
}
