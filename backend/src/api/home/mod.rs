//! Landing page with fleet totals.

pub mod handlers;
pub mod routes;
