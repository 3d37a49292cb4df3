//! Authentication module for driver accounts, sessions, and access control.
//!
//! This module provides the public interface for login/logout, password
//! hashing, session management and the login gate middleware.

pub mod routes;
pub mod handlers;
pub mod models;
pub mod middleware;
pub mod service;
pub mod errors;

// Re-exports for convenience
pub use errors::AuthError;
pub use middleware::require_login;
pub use models::{CurrentSession, SESSION_COOKIE};
pub use routes::auth_router;
