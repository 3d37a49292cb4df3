//! Taxi fleet backend: manufacturers, drivers and cars behind a login gate.
//!
//! The binary in `main.rs` only loads settings, sets up logging and serves
//! the router built here, so tests can drive the full application in-process.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;

use crate::config::Settings;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(pool: SqlitePool, settings: Settings) -> Self {
        Self {
            pool,
            settings: Arc::new(settings),
        }
    }
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    api::router(state)
}
