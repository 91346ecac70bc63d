//! Farmgate Produce pricing calculator.
//!
//! A single-page, form-driven web calculator for produce logistics: pick a
//! vegetable, enter a weight (and in distance-weighted deployments a
//! distance), accumulate line items into a batch and generate a customer
//! quote with GST. All state is in-memory and scoped to one browser
//! session.

pub mod config;
pub mod error;
pub mod pricing;
pub mod routes;
pub mod session;

use std::sync::Arc;

use config::AppConfig;
use session::SessionStore;

// Re-export commonly used items
pub use error::{AppError, Result};
pub use routes::router;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let config = Arc::new(config);
        Self {
            sessions: SessionStore::new(config.clone()),
            config,
        }
    }
}
