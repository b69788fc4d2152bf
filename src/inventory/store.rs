// src/inventory/store.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};

use super::repository::{ProductRepository, ProjectRepository, StoreError, StoreResult};
use super::types::{
    round_price, DeleteOutcome, NewProduct, NewProject, Product, ProductPatch, Project,
    ProjectPatch, ProjectWithProducts,
};

const PROJECT_COLUMNS: &str =
    "id, name, description, address, latitude, longitude, created_at, updated_at";
const PRODUCT_COLUMNS: &str = "id, project_id, name, sku, price, stock, created_at, updated_at";

/// SQLite-backed store for both tables.
#[derive(Clone)]
pub struct SqliteInventoryStore {
    pub pool: SqlitePool,
}

impl SqliteInventoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_project(row: &SqliteRow) -> StoreResult<Project> {
        Ok(Project {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            address: row.try_get("address")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_product(row: &SqliteRow) -> StoreResult<Product> {
        Ok(Product {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            name: row.try_get("name")?,
            sku: row.try_get("sku")?,
            price: row.try_get("price")?,
            stock: row.try_get("stock")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Round to cents, refusing amounts that would not survive storage.
fn checked_price(price: f64) -> StoreResult<f64> {
    let rounded = round_price(price);
    if rounded.is_finite() {
        Ok(rounded)
    } else {
        Err(StoreError::Integrity(format!("price {price} is not a storable amount")))
    }
}

/// Foreign-key failures become `Integrity`; everything else stays a database error.
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return StoreError::Integrity(db_err.message().to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl ProjectRepository for SqliteInventoryStore {
    async fn list_projects(&self) -> StoreResult<Vec<ProjectWithProducts>> {
        let project_rows = sqlx::query(&format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        let mut by_project: HashMap<i64, Vec<Product>> = HashMap::new();
        for product in self.list_products().await? {
            by_project.entry(product.project_id).or_default().push(product);
        }

        project_rows
            .iter()
            .map(|row| {
                let project = Self::row_to_project(row)?;
                let products = by_project.remove(&project.id).unwrap_or_default();
                Ok(ProjectWithProducts::new(project, products))
            })
            .collect()
    }

    async fn get_project(&self, id: i64) -> StoreResult<Option<Project>> {
        let row = sqlx::query(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_project).transpose()
    }

    async fn get_project_with_products(&self, id: i64) -> StoreResult<Option<ProjectWithProducts>> {
        let Some(project) = self.get_project(id).await? else {
            return Ok(None);
        };
        let products = self.list_products_for_project(id).await?;
        Ok(Some(ProjectWithProducts::new(project, products)))
    }

    async fn project_exists(&self, id: i64) -> StoreResult<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn create_project(&self, input: NewProject) -> StoreResult<Project> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO projects (name, description, address, latitude, longitude, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.address)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        let id = result.last_insert_rowid();
        info!(project_id = id, name = %input.name, "Created project");

        Ok(Project {
            id,
            name: input.name,
            description: input.description,
            address: input.address,
            latitude: input.latitude,
            longitude: input.longitude,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_project(&self, id: i64, patch: ProjectPatch) -> StoreResult<Option<Project>> {
        let Some(mut project) = self.get_project(id).await? else {
            return Ok(None);
        };

        patch.apply(&mut project);
        project.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE projects
            SET name = ?, description = ?, address = ?, latitude = ?, longitude = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.address)
        .bind(project.latitude)
        .bind(project.longitude)
        .bind(project.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        debug!(project_id = id, "Updated project");
        Ok(Some(project))
    }

    async fn delete_project(&self, id: i64) -> StoreResult<DeleteOutcome> {
        let mut tx = self.pool.begin().await?;

        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if found.is_none() {
            return Ok(DeleteOutcome::NotFound);
        }

        let (products,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM products WHERE project_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if products > 0 {
            return Ok(DeleteOutcome::Restricted { products });
        }

        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
        tx.commit().await?;

        info!(project_id = id, "Deleted project");
        Ok(DeleteOutcome::Deleted)
    }
}

#[async_trait]
impl ProductRepository for SqliteInventoryStore {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_product).collect()
    }

    async fn list_products_for_project(&self, project_id: i64) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE project_id = ? ORDER BY id"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_product).collect()
    }

    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn create_product(&self, input: NewProduct) -> StoreResult<Product> {
        let now = Utc::now();
        let price = checked_price(input.price)?;

        let result = sqlx::query(
            r#"
            INSERT INTO products (project_id, name, sku, price, stock, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(input.project_id)
        .bind(&input.name)
        .bind(&input.sku)
        .bind(price)
        .bind(input.stock)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        let id = result.last_insert_rowid();
        info!(product_id = id, project_id = input.project_id, sku = %input.sku, "Created product");

        Ok(Product {
            id,
            project_id: input.project_id,
            name: input.name,
            sku: input.sku,
            price,
            stock: input.stock,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_product(&self, id: i64, patch: ProductPatch) -> StoreResult<Option<Product>> {
        let Some(mut product) = self.get_product(id).await? else {
            return Ok(None);
        };

        patch.apply(&mut product);
        product.price = checked_price(product.price)?;
        product.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE products
            SET project_id = ?, name = ?, sku = ?, price = ?, stock = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(product.project_id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        debug!(product_id = id, "Updated product");
        Ok(Some(product))
    }

    async fn delete_product(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(product_id = id, "Deleted product");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn test_store() -> SqliteInventoryStore {
        let pool = db::create_memory_pool().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        SqliteInventoryStore::new(pool)
    }

    fn warehouse(name: &str) -> NewProject {
        NewProject {
            name: name.to_string(),
            description: Some("Primary storage facility".to_string()),
            address: Some("St. 271, Phnom Penh, Cambodia".to_string()),
            latitude: Some(11.5449),
            longitude: Some(104.9135),
        }
    }

    fn item(project_id: i64, sku: &str, price: f64, stock: i64) -> NewProduct {
        NewProduct {
            project_id,
            name: format!("Item {sku}"),
            sku: sku.to_string(),
            price,
            stock,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_projects() {
        let store = test_store().await;
        let created = store.create_project(warehouse("Main Warehouse")).await.unwrap();

        let projects = store.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].project.id, created.id);
        assert_eq!(projects[0].project.name, "Main Warehouse");
        assert_eq!(projects[0].project.latitude, Some(11.5449));
        assert_eq!(projects[0].products_count, 0);
    }

    #[tokio::test]
    async fn test_project_products_are_scoped() {
        let store = test_store().await;
        let a = store.create_project(warehouse("A")).await.unwrap();
        let b = store.create_project(warehouse("B")).await.unwrap();

        store.create_product(item(a.id, "SB-001", 1500.0, 20)).await.unwrap();
        store.create_product(item(b.id, "SC-42U", 850.0, 12)).await.unwrap();
        store.create_product(item(a.id, "IL-99", 12500.5, 5)).await.unwrap();

        let fetched = store.get_project_with_products(a.id).await.unwrap().unwrap();
        let skus: Vec<_> = fetched.products.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["SB-001", "IL-99"]);
        assert!(fetched.products.iter().all(|p| p.project_id == a.id));

        let listed = store.list_projects().await.unwrap();
        assert_eq!(listed[0].products_count, 2);
        assert_eq!(listed[1].products_count, 1);
        assert_eq!(store.list_products().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_project() {
        let store = test_store().await;
        assert!(store.get_project(42).await.unwrap().is_none());
        assert!(store.get_project_with_products(42).await.unwrap().is_none());
        assert!(!store.project_exists(42).await.unwrap());
        assert!(store.update_project(42, ProjectPatch::default()).await.unwrap().is_none());
        assert_eq!(store.delete_project(42).await.unwrap(), DeleteOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_product_requires_existing_project() {
        let store = test_store().await;
        let err = store.create_product(item(999, "X-1", 1.0, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)));
    }

    #[tokio::test]
    async fn test_duplicate_sku_and_negative_stock_are_stored() {
        let store = test_store().await;
        let project = store.create_project(warehouse("A")).await.unwrap();

        store.create_product(item(project.id, "DUP", 1.0, 1)).await.unwrap();
        let second = store.create_product(item(project.id, "DUP", 2.0, -3)).await.unwrap();
        assert_eq!(second.stock, -3);
        assert_eq!(store.list_products().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_product_twice() {
        let store = test_store().await;
        let project = store.create_project(warehouse("A")).await.unwrap();
        let product = store.create_product(item(project.id, "C6-100", 45.99, 100)).await.unwrap();

        assert!(store.delete_product(product.id).await.unwrap());
        assert!(!store.delete_product(product.id).await.unwrap());
        assert!(store.get_product(product.id).await.unwrap().is_none());
        assert!(store
            .get_project_with_products(project.id)
            .await
            .unwrap()
            .unwrap()
            .products
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_project_is_restricted_while_it_has_products() {
        let store = test_store().await;
        let project = store.create_project(warehouse("A")).await.unwrap();
        let product = store.create_product(item(project.id, "SB-001", 10.0, 1)).await.unwrap();

        assert_eq!(
            store.delete_project(project.id).await.unwrap(),
            DeleteOutcome::Restricted { products: 1 }
        );
        assert!(store.get_product(product.id).await.unwrap().is_some());

        store.delete_product(product.id).await.unwrap();
        assert_eq!(store.delete_project(project.id).await.unwrap(), DeleteOutcome::Deleted);
        assert!(store.get_project(project.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_product_rounds_price() {
        let store = test_store().await;
        let project = store.create_project(warehouse("A")).await.unwrap();
        let product = store.create_product(item(project.id, "SB-001", 10.0, 1)).await.unwrap();

        let updated = store
            .update_product(
                product.id,
                ProductPatch {
                    price: Some(19.999),
                    stock: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.price, 20.0);
        assert_eq!(updated.stock, 7);
        let reloaded = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.price, 20.0);
        assert_eq!(reloaded.stock, 7);
    }

    #[tokio::test]
    async fn test_overflowing_price_is_refused() {
        let store = test_store().await;
        let project = store.create_project(warehouse("Depot")).await.unwrap();

        let err = store
            .create_product(item(project.id, "HUGE-1", 1e307, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)));
        assert!(store.list_products().await.unwrap().is_empty());
    }
}
