// src/inventory/types.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A warehouse or site. Owns zero or more products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Both coordinates, when the project has a location.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// An inventory item. `price` is in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub sku: String,
    pub price: f64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn stock_value(&self) -> f64 {
        self.price * self.stock as f64
    }
}

/// A project with its products eagerly attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectWithProducts {
    #[serde(flatten)]
    pub project: Project,
    pub products_count: usize,
    pub products: Vec<Product>,
}

impl ProjectWithProducts {
    pub fn new(project: Project, products: Vec<Product>) -> Self {
        Self {
            project,
            products_count: products.len(),
            products,
        }
    }
}

// Validated inputs

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Partial update. The outer `Option` is "field present in the request";
/// the inner one (for nullable columns) is the new value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
}

impl ProjectPatch {
    pub fn apply(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(address) = self.address {
            project.address = address;
        }
        if let Some(latitude) = self.latitude {
            project.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            project.longitude = longitude;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub project_id: i64,
    pub name: String,
    pub sku: String,
    pub price: f64,
    pub stock: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub project_id: Option<i64>,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
}

impl ProductPatch {
    pub fn apply(self, product: &mut Product) {
        if let Some(project_id) = self.project_id {
            product.project_id = project_id;
        }
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(sku) = self.sku {
            product.sku = sku;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
    }
}

/// Result of deleting a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    /// The project still owns products and was left in place.
    Restricted { products: i64 },
}

/// Round to cents, matching a `decimal(10,2)` price column.
pub fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project() -> Project {
        let now = Utc::now();
        Project {
            id: 1,
            name: "Main Warehouse (PP)".to_string(),
            description: None,
            address: Some("St. 271, Phnom Penh, Cambodia".to_string()),
            latitude: Some(11.5449),
            longitude: Some(104.9135),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_project_with_products_serializes_flat() {
        let value = serde_json::to_value(ProjectWithProducts::new(sample_project(), vec![])).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["name"], "Main Warehouse (PP)");
        assert_eq!(value["products_count"], 0);
        assert!(value["products"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_patch_clears_nullable_fields() {
        let mut project = sample_project();
        ProjectPatch {
            address: Some(None),
            name: Some("Renamed".to_string()),
            ..Default::default()
        }
        .apply(&mut project);

        assert_eq!(project.name, "Renamed");
        assert_eq!(project.address, None);
        assert_eq!(project.coordinates(), Some((11.5449, 104.9135)));
    }

    #[test]
    fn test_round_price() {
        assert_eq!(round_price(12500.504), 12500.5);
        assert_eq!(round_price(45.999), 46.0);
        assert_eq!(round_price(0.0), 0.0);
    }
}
