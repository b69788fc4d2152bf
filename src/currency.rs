// src/currency.rs
// Display-currency conversion. Prices are stored in USD; conversion is a
// plain multiplication by the selected currency's rate.

use serde::Deserialize;
use std::collections::HashMap;

pub const BASE_CURRENCY: &str = "USD";

/// Currency shown without minor units.
pub const ZERO_DECIMAL_CURRENCY: &str = "KHR";

/// Rate table keyed by currency code, relative to USD.
pub type RateTable = HashMap<String, f64>;

/// The part of the exchange-rate payload the dashboard reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExchangeRates {
    #[serde(default)]
    pub rates: RateTable,
}

/// Rate for `currency`: 1 for USD, the table entry otherwise, 1 when unknown.
pub fn rate_for(rates: &RateTable, currency: &str) -> f64 {
    if currency == BASE_CURRENCY {
        return 1.0;
    }
    rates.get(currency).copied().unwrap_or(1.0)
}

pub fn convert(price: f64, rate: f64) -> f64 {
    price * rate
}

pub fn decimals_for(currency: &str) -> usize {
    if currency == ZERO_DECIMAL_CURRENCY { 0 } else { 2 }
}

pub fn symbol_for(currency: &str) -> &'static str {
    match currency {
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "KHR" => "៛",
        _ => "$",
    }
}

/// `"{amount} {symbol}"` with the currency's number of decimals.
pub fn format_price(amount: f64, currency: &str) -> String {
    let decimals = decimals_for(currency);
    format!("{amount:.decimals$} {}", symbol_for(currency))
}

/// A selected display currency together with the last fetched rate table.
#[derive(Debug, Clone)]
pub struct DisplayCurrency {
    code: String,
    rates: RateTable,
}

impl DisplayCurrency {
    pub fn new(code: impl Into<String>, rates: RateTable) -> Self {
        Self {
            code: code.into().to_uppercase(),
            rates,
        }
    }

    /// USD with an empty table; every price is shown as-is.
    pub fn base() -> Self {
        Self::new(BASE_CURRENCY, RateTable::new())
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn rate(&self) -> f64 {
        rate_for(&self.rates, &self.code)
    }

    pub fn convert(&self, usd: f64) -> f64 {
        convert(usd, self.rate())
    }

    pub fn format(&self, usd: f64) -> String {
        format_price(self.convert(usd), &self.code)
    }
}
