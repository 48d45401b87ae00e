//! LinkGuard Server Library
//!
//! This module exports the core types and functions for testing and reuse.

pub mod auth;
pub mod clock;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod scan;
pub mod security;

pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use db::{open_database, Db};
pub use error::{AppError, Result};

use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create a new AppState with the given database and configuration,
    /// using the system clock
    pub fn new(db: Db, config: Config) -> Self {
        Self {
            db,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Create an AppState with an explicit clock (tests pin time through this)
    pub fn with_clock(db: Db, config: Config, clock: Arc<dyn Clock>) -> Self {
        Self { db, config, clock }
    }
}
