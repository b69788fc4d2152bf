// src/inventory/mod.rs
pub mod repository;
pub mod stats;
pub mod store;
pub mod types;
pub mod validation;

// Re-export for easy use elsewhere
pub use repository::{ProductRepository, ProjectRepository, StoreError, StoreResult};
pub use stats::InventoryStats;
pub use store::SqliteInventoryStore;
pub use types::{DeleteOutcome, Product, Project, ProjectWithProducts};
