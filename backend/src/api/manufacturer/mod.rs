//! Manufacturer list, search and CRUD endpoints.

pub mod handlers;
pub mod routes;
