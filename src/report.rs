// src/report.rs
// Text dashboard for the `report` command: the same totals the browser shows,
// optionally scoped to one project and priced in a display currency.

use anyhow::{anyhow, Result};
use std::fmt;
use tracing::warn;

use crate::currency::{DisplayCurrency, RateTable, BASE_CURRENCY};
use crate::inventory::{InventoryStats, ProductRepository, Project, ProjectRepository};
use crate::upstream::weather_code::{describe, format_temperature};
use crate::upstream::UpstreamClient;

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub project: Option<i64>,
    pub currency: String,
    pub weather: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            project: None,
            currency: BASE_CURRENCY.to_string(),
            weather: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub title: String,
    pub address: Option<String>,
    pub stats: InventoryStats,
    /// One line per product: name, sku, converted price, stock.
    pub lines: Vec<String>,
    pub weather: Option<String>,
    pub notes: Vec<String>,
}

/// Fetch rates for a non-USD currency. On failure the table stays empty, so
/// every rate reads as 1 and prices show unconverted.
async fn display_currency(upstream: &UpstreamClient, code: &str, notes: &mut Vec<String>) -> DisplayCurrency {
    let code = code.to_uppercase();
    if code == BASE_CURRENCY {
        return DisplayCurrency::base();
    }

    match upstream.rate_table().await {
        Ok(table) => {
            if !table.rates.contains_key(&code) {
                notes.push(format!("No exchange rate for {code}; showing USD amounts"));
            }
            DisplayCurrency::new(code, table.rates)
        }
        Err(e) => {
            warn!("Exchange rates unavailable: {}", e);
            notes.push("Exchange rates unavailable; showing USD amounts".to_string());
            DisplayCurrency::new(code, RateTable::new())
        }
    }
}

async fn weather_line(upstream: &UpstreamClient, project: &Project) -> String {
    let Some((lat, lng)) = project.coordinates() else {
        return "No coordinates for this project".to_string();
    };
    match upstream.current_weather(lat, lng).await {
        Ok(current) => {
            let info = describe(current.weathercode);
            format!("{} {} {}", format_temperature(current.temperature), info.icon, info.text)
        }
        Err(e) => {
            warn!("Weather unavailable for project {}: {}", project.id, e);
            "Weather unavailable".to_string()
        }
    }
}

pub async fn build_report(
    projects: &dyn ProjectRepository,
    products: &dyn ProductRepository,
    upstream: &UpstreamClient,
    options: &ReportOptions,
) -> Result<Report> {
    let mut notes = Vec::new();
    let currency = display_currency(upstream, &options.currency, &mut notes).await;
    let project_count = projects.list_projects().await?.len();

    let (title, address, items, weather) = match options.project {
        Some(id) => {
            let found = projects
                .get_project_with_products(id)
                .await?
                .ok_or_else(|| anyhow!("project {id} not found"))?;
            let weather = if options.weather {
                Some(weather_line(upstream, &found.project).await)
            } else {
                None
            };
            (found.project.name.clone(), found.project.address.clone(), found.products, weather)
        }
        None => ("All Products".to_string(), None, products.list_products().await?, None),
    };

    let lines = items
        .iter()
        .map(|p| format!("{:<24} {:<12} {:>16} {:>6} in stock", p.name, p.sku, currency.format(p.price), p.stock))
        .collect();
    let stats = InventoryStats::compute(project_count, &items, &currency);

    Ok(Report {
        title,
        address,
        stats,
        lines,
        weather,
        notes,
    })
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if let Some(address) = &self.address {
            writeln!(f, "  {address}")?;
        }
        if let Some(weather) = &self.weather {
            writeln!(f, "  Weather: {weather}")?;
        }
        writeln!(f)?;
        writeln!(f, "Projects:    {}", self.stats.projects)?;
        writeln!(f, "Products:    {}", self.stats.products)?;
        writeln!(f, "Total value: {}", self.stats.total_value_display)?;
        writeln!(f)?;
        if self.lines.is_empty() {
            writeln!(f, "No products found.")?;
        }
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        for note in &self.notes {
            writeln!(f, "note: {note}")?;
        }
        Ok(())
    }
}
