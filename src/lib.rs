//! Equipment Repair Management System
//!
//! REST JSON API for tracking devices, the repair requests filed against
//! them, the spare parts consumed while fixing them, and the in-app
//! notifications exchanged between requesters, technicians and admins.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
