//! Module for database connection setup and common utilities.
//!
//! This module initializes the SQLite connection pool and creates the schema
//! on startup. Entity structs live in `models`, data access in `queries`.
//!
//! Searchable text columns have a `*_key` twin holding the case-folded value
//! (see `queries::search_key`); SQLite's own `LIKE` only folds ASCII.

pub mod models;
pub mod queries;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::config::DatabaseSettings;

/// Open the pool described by `settings` and make sure the schema exists.
pub async fn connect(settings: &DatabaseSettings) -> Result<SqlitePool, sqlx::Error> {
    let mut options = SqliteConnectOptions::from_str(&settings.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new();
    if settings.is_in_memory() {
        // Every in-memory connection is its own database, so keep exactly one
        // and never let the pool recycle it.
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    } else {
        options = options.journal_mode(SqliteJournalMode::Wal);
        pool_options = pool_options.max_connections(settings.max_connections);
    }

    let pool = pool_options.connect_with(options).await?;
    initialize_schema(&pool).await?;

    info!(url = %settings.url, "database ready");
    Ok(pool)
}

async fn initialize_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS manufacturers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            name_key TEXT NOT NULL,
            country TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS drivers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            username_key TEXT NOT NULL,
            password TEXT NOT NULL,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            license_number TEXT UNIQUE
        );

        CREATE TABLE IF NOT EXISTS cars (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            model TEXT NOT NULL,
            model_key TEXT NOT NULL,
            manufacturer_id INTEGER NOT NULL
                REFERENCES manufacturers(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS car_drivers (
            car_id INTEGER NOT NULL REFERENCES cars(id) ON DELETE CASCADE,
            driver_id INTEGER NOT NULL REFERENCES drivers(id) ON DELETE CASCADE,
            PRIMARY KEY (car_id, driver_id)
        );

        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            driver_id INTEGER NOT NULL REFERENCES drivers(id) ON DELETE CASCADE,
            visits INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_cars_manufacturer ON cars(manufacturer_id);
        CREATE INDEX IF NOT EXISTS idx_car_drivers_driver ON car_drivers(driver_id);
        "#,
    )
    .execute(pool)
    .await?;

    debug!("SQLite schema initialized");
    Ok(())
}
