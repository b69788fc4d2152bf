// src/inventory/stats.rs
// Dashboard totals: how many projects and products, and what the stock is worth.

use serde::Serialize;

use super::types::Product;
use crate::currency::DisplayCurrency;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryStats {
    pub projects: usize,
    pub products: usize,
    pub units_in_stock: i64,
    /// Σ price × stock, in USD.
    pub total_value_usd: f64,
    pub currency: String,
    pub total_value: f64,
    pub total_value_display: String,
}

impl InventoryStats {
    pub fn compute(projects: usize, products: &[Product], currency: &DisplayCurrency) -> Self {
        let total_value_usd = products
            .iter()
            .fold(0.0, |acc, p| acc + p.stock_value());

        Self {
            projects,
            products: products.len(),
            units_in_stock: products
                .iter()
                .fold(0i64, |acc, p| acc.saturating_add(p.stock)),
            total_value_usd,
            currency: currency.code().to_string(),
            total_value: currency.convert(total_value_usd),
            total_value_display: currency.format(total_value_usd),
        }
    }
}
