//! Rust structs that represent database table mappings.
//!
//! A `Driver` is an `Account` (identity and credential) composed with the
//! fleet-specific licence number. The driver/car many-to-many relation has no
//! struct of its own: it is the `car_drivers` edge table, read from either
//! side through `queries`.

use std::fmt;

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
    pub country: String,
}

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.country)
    }
}

/// Login identity shared by every user of the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Account {
    pub username: String,
    /// PHC-formatted password hash
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Driver {
    pub id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub account: Account,
    pub license_number: Option<String>,
}

impl Driver {
    pub fn username(&self) -> &str {
        &self.account.username
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {})",
            self.account.username, self.account.first_name, self.account.last_name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Car {
    pub id: i64,
    pub model: String,
    pub manufacturer_id: i64,
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.model)
    }
}

/// A car joined with the manufacturer it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarWithManufacturer {
    #[serde(flatten)]
    pub car: Car,
    pub manufacturer: Manufacturer,
}

/// Insert payload for a new driver; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewDriver {
    pub account: Account,
    pub license_number: Option<String>,
}

/// Outcome of flipping a driver/car assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Assignment {
    Assigned,
    Unassigned,
}
