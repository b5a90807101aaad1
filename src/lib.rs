//! Bookshelf
//!
//! A small REST JSON service keeping a catalog of books in process memory,
//! with filtered, paginated listing and schema-validated writes.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Build the repository and services described by `config`
    pub fn new(config: AppConfig) -> Self {
        let seed = if config.catalog.seed {
            models::book::seed_books()
        } else {
            Vec::new()
        };
        let repository = repository::Repository::new(seed);
        let services = services::Services::new(repository, config.catalog.clone());

        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
