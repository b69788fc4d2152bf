// src/lib.rs

pub mod api;
pub mod config;
pub mod currency;
pub mod db;
pub mod inventory;
pub mod report;
pub mod state;
pub mod upstream;

pub use config::StockroomConfig;
pub use state::{create_app_state, AppState};
