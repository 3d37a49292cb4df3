//! Core business logic for the authentication system.
//!
//! This service handles driver account creation, password hashing and session
//! management. Sessions are opaque random tokens stored server-side.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::errors::AuthError;
use super::models::{CurrentSession, Registration};
use crate::database::models::{Account, Driver, NewDriver};
use crate::database::queries;
use crate::errors::{AppError, Result};

pub fn hash_password(raw: &str) -> std::result::Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::PasswordHash(err.to_string()))
}

/// False for a wrong password and for a stored value that is not a PHC hash.
pub fn verify_password(raw: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(raw.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Hash the password and store a new driver account.
pub async fn register_driver(pool: &SqlitePool, registration: Registration<'_>) -> Result<Driver> {
    let new_driver = NewDriver {
        account: Account {
            username: registration.username.to_string(),
            password: hash_password(registration.password)?,
            first_name: registration.first_name.to_string(),
            last_name: registration.last_name.to_string(),
        },
        license_number: registration.license_number.map(str::to_string),
    };

    let id = queries::insert_driver(pool, &new_driver).await?;
    info!(driver_id = id, username = %new_driver.account.username, "driver registered");

    queries::find_driver(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Driver", id))
}

/// The driver matching the credentials, if any.
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Option<Driver>> {
    let Some(driver) = queries::find_driver_by_username(pool, username).await? else {
        debug!(username, "login attempt for unknown username");
        return Ok(None);
    };

    if verify_password(password, &driver.account.password) {
        Ok(Some(driver))
    } else {
        debug!(username, "login attempt with wrong password");
        Ok(None)
    }
}

/// Open a session for the driver and return its token.
pub async fn start_session(pool: &SqlitePool, driver_id: i64) -> Result<String> {
    let token = hex::encode(rand::random::<[u8; 32]>());
    queries::insert_session(pool, &token, driver_id).await?;
    info!(driver_id, "session started");
    Ok(token)
}

pub async fn resolve_session(pool: &SqlitePool, token: &str) -> Result<Option<CurrentSession>> {
    let driver = queries::find_session_driver(pool, token).await?;
    Ok(driver.map(|driver| CurrentSession {
        token: token.to_string(),
        driver,
    }))
}

pub async fn end_session(pool: &SqlitePool, token: &str) -> Result<()> {
    queries::delete_session(pool, token).await?;
    debug!("session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("password123test").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("password123test", &hash));
        assert!(!verify_password("password123tesT", &hash));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn plain_text_is_never_accepted() {
        assert!(!verify_password("<PASSWORD>", "<PASSWORD>"));
    }
}
