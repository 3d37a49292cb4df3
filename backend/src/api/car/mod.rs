//! Car list, search, detail, CRUD and driver assignment endpoints.

pub mod handlers;
pub mod routes;
