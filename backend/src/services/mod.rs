//! Module for core business logic services.
//!
//! This module holds the logic that sits between the HTTP handlers and the
//! query layer: form validation, search filters, pagination and the
//! driver/car assignment toggle.

pub mod assignment;
pub mod forms;
pub mod pagination;
pub mod search;
