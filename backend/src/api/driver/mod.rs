//! Driver list, search, detail and account endpoints.

pub mod handlers;
pub mod routes;
