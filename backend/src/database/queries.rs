//! Database query functions (Data Access Objects).
//!
//! Search filters arrive as ready-made LIKE patterns (see
//! `services::search::contains_pattern`) and are matched against the folded
//! `*_key` columns; `%` on its own matches every row.

use sqlx::{SqliteExecutor, SqlitePool};

use super::models::{Car, CarWithManufacturer, Driver, Manufacturer, NewDriver};
use crate::errors::Result;

/// Case-folded form of a searchable value, stored next to it and applied to
/// search terms.
pub fn search_key(value: &str) -> String {
    value.to_lowercase()
}

type CarJoinRow = (i64, String, i64, String, String);

fn car_from_join((id, model, manufacturer_id, name, country): CarJoinRow) -> CarWithManufacturer {
    CarWithManufacturer {
        car: Car {
            id,
            model,
            manufacturer_id,
        },
        manufacturer: Manufacturer {
            id: manufacturer_id,
            name,
            country,
        },
    }
}

const CAR_JOIN_SELECT: &str = "SELECT c.id, c.model, c.manufacturer_id, m.name, m.country \
     FROM cars c JOIN manufacturers m ON m.id = c.manufacturer_id";

// ---------------------------------------------------------------------------
// Manufacturers
// ---------------------------------------------------------------------------

pub async fn count_manufacturers(pool: &SqlitePool, name_pattern: &str) -> Result<i64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM manufacturers WHERE name_key LIKE ? ESCAPE '\\'")
            .bind(name_pattern)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

pub async fn list_manufacturers(
    pool: &SqlitePool,
    name_pattern: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Manufacturer>> {
    let rows = sqlx::query_as::<_, Manufacturer>(
        "SELECT id, name, country FROM manufacturers WHERE name_key LIKE ? ESCAPE '\\' \
         ORDER BY name, id LIMIT ? OFFSET ?",
    )
    .bind(name_pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn all_manufacturers(pool: &SqlitePool) -> Result<Vec<Manufacturer>> {
    let rows = sqlx::query_as::<_, Manufacturer>(
        "SELECT id, name, country FROM manufacturers ORDER BY name, id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_manufacturer(pool: &SqlitePool, id: i64) -> Result<Option<Manufacturer>> {
    let row = sqlx::query_as::<_, Manufacturer>(
        "SELECT id, name, country FROM manufacturers WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// True when another manufacturer (not `exclude_id`) already uses `name`.
pub async fn manufacturer_name_taken(
    pool: &SqlitePool,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<bool> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM manufacturers WHERE name = ? AND id != ?")
            .bind(name)
            .bind(exclude_id.unwrap_or(-1))
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

pub async fn insert_manufacturer(pool: &SqlitePool, name: &str, country: &str) -> Result<i64> {
    let id = sqlx::query("INSERT INTO manufacturers (name, name_key, country) VALUES (?, ?, ?)")
        .bind(name)
        .bind(search_key(name))
        .bind(country)
        .execute(pool)
        .await?
        .last_insert_rowid();
    Ok(id)
}

/// Returns false when no manufacturer has this id.
pub async fn update_manufacturer(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    country: &str,
) -> Result<bool> {
    let result =
        sqlx::query("UPDATE manufacturers SET name = ?, name_key = ?, country = ? WHERE id = ?")
            .bind(name)
            .bind(search_key(name))
            .bind(country)
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Deletes the manufacturer together with its cars.
pub async fn delete_manufacturer(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM manufacturers WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Drivers
// ---------------------------------------------------------------------------

const DRIVER_COLUMNS: &str = "id, username, password, first_name, last_name, license_number";

pub async fn count_drivers(pool: &SqlitePool, username_pattern: &str) -> Result<i64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM drivers WHERE username_key LIKE ? ESCAPE '\\'")
            .bind(username_pattern)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

pub async fn list_drivers(
    pool: &SqlitePool,
    username_pattern: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Driver>> {
    let rows = sqlx::query_as::<_, Driver>(&format!(
        "SELECT {DRIVER_COLUMNS} FROM drivers WHERE username_key LIKE ? ESCAPE '\\' \
         ORDER BY id LIMIT ? OFFSET ?"
    ))
    .bind(username_pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn all_drivers(pool: &SqlitePool) -> Result<Vec<Driver>> {
    let rows = sqlx::query_as::<_, Driver>(&format!(
        "SELECT {DRIVER_COLUMNS} FROM drivers ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_driver(pool: &SqlitePool, id: i64) -> Result<Option<Driver>> {
    let row = sqlx::query_as::<_, Driver>(&format!(
        "SELECT {DRIVER_COLUMNS} FROM drivers WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn find_driver_by_username(pool: &SqlitePool, username: &str) -> Result<Option<Driver>> {
    let row = sqlx::query_as::<_, Driver>(&format!(
        "SELECT {DRIVER_COLUMNS} FROM drivers WHERE username = ?"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn find_driver_by_license(
    pool: &SqlitePool,
    license_number: &str,
) -> Result<Option<Driver>> {
    let row = sqlx::query_as::<_, Driver>(&format!(
        "SELECT {DRIVER_COLUMNS} FROM drivers WHERE license_number = ?"
    ))
    .bind(license_number)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// True when a driver other than `exclude_id` holds `license_number`.
pub async fn license_taken(
    pool: &SqlitePool,
    license_number: &str,
    exclude_id: Option<i64>,
) -> Result<bool> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM drivers WHERE license_number = ? AND id != ?")
            .bind(license_number)
            .bind(exclude_id.unwrap_or(-1))
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

pub async fn insert_driver(pool: &SqlitePool, driver: &NewDriver) -> Result<i64> {
    let id = sqlx::query(
        "INSERT INTO drivers \
         (username, username_key, password, first_name, last_name, license_number) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&driver.account.username)
    .bind(search_key(&driver.account.username))
    .bind(&driver.account.password)
    .bind(&driver.account.first_name)
    .bind(&driver.account.last_name)
    .bind(&driver.license_number)
    .execute(pool)
    .await?
    .last_insert_rowid();
    Ok(id)
}

pub async fn update_driver_license(
    pool: &SqlitePool,
    id: i64,
    license_number: &str,
) -> Result<bool> {
    let result = sqlx::query("UPDATE drivers SET license_number = ? WHERE id = ?")
        .bind(license_number)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_driver(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM drivers WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// `Driver.cars`: every car assigned to the driver.
pub async fn cars_of_driver(pool: &SqlitePool, driver_id: i64) -> Result<Vec<CarWithManufacturer>> {
    let rows: Vec<CarJoinRow> = sqlx::query_as(&format!(
        "{CAR_JOIN_SELECT} JOIN car_drivers cd ON cd.car_id = c.id \
         WHERE cd.driver_id = ? ORDER BY c.id"
    ))
    .bind(driver_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(car_from_join).collect())
}

// ---------------------------------------------------------------------------
// Cars
// ---------------------------------------------------------------------------

pub async fn count_cars(pool: &SqlitePool, model_pattern: &str) -> Result<i64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM cars WHERE model_key LIKE ? ESCAPE '\\'")
            .bind(model_pattern)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

pub async fn list_cars(
    pool: &SqlitePool,
    model_pattern: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<CarWithManufacturer>> {
    let rows: Vec<CarJoinRow> = sqlx::query_as(&format!(
        "{CAR_JOIN_SELECT} WHERE c.model_key LIKE ? ESCAPE '\\' ORDER BY c.id LIMIT ? OFFSET ?"
    ))
    .bind(model_pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(car_from_join).collect())
}

pub async fn find_car(pool: &SqlitePool, id: i64) -> Result<Option<CarWithManufacturer>> {
    let row: Option<CarJoinRow> = sqlx::query_as(&format!("{CAR_JOIN_SELECT} WHERE c.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(car_from_join))
}

pub async fn car_exists<'e, E: SqliteExecutor<'e>>(executor: E, id: i64) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM cars WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(row.is_some())
}

pub async fn insert_car<'e, E: SqliteExecutor<'e>>(
    executor: E,
    model: &str,
    manufacturer_id: i64,
) -> Result<i64> {
    let id = sqlx::query("INSERT INTO cars (model, model_key, manufacturer_id) VALUES (?, ?, ?)")
        .bind(model)
        .bind(search_key(model))
        .bind(manufacturer_id)
        .execute(executor)
        .await?
        .last_insert_rowid();
    Ok(id)
}

pub async fn update_car<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: i64,
    model: &str,
    manufacturer_id: i64,
) -> Result<bool> {
    let result =
        sqlx::query("UPDATE cars SET model = ?, model_key = ?, manufacturer_id = ? WHERE id = ?")
            .bind(model)
            .bind(search_key(model))
            .bind(manufacturer_id)
            .bind(id)
            .execute(executor)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_car(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM cars WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// `Car.drivers`: every driver assigned to the car.
pub async fn drivers_of_car(pool: &SqlitePool, car_id: i64) -> Result<Vec<Driver>> {
    let rows = sqlx::query_as::<_, Driver>(
        "SELECT d.id, d.username, d.password, d.first_name, d.last_name, d.license_number \
         FROM drivers d JOIN car_drivers cd ON cd.driver_id = d.id \
         WHERE cd.car_id = ? ORDER BY d.id",
    )
    .bind(car_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Ids among `ids` that name an existing driver.
pub async fn existing_driver_ids(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<i64>> {
    let mut found = Vec::with_capacity(ids.len());
    for &id in ids {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM drivers WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        if let Some((id,)) = row {
            found.push(id);
        }
    }
    Ok(found)
}

// ---------------------------------------------------------------------------
// Driver/car edges
// ---------------------------------------------------------------------------

pub async fn is_assigned<'e, E: SqliteExecutor<'e>>(
    executor: E,
    driver_id: i64,
    car_id: i64,
) -> Result<bool> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT car_id FROM car_drivers WHERE car_id = ? AND driver_id = ?")
            .bind(car_id)
            .bind(driver_id)
            .fetch_optional(executor)
            .await?;
    Ok(row.is_some())
}

pub async fn assign<'e, E: SqliteExecutor<'e>>(
    executor: E,
    driver_id: i64,
    car_id: i64,
) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO car_drivers (car_id, driver_id) VALUES (?, ?)")
        .bind(car_id)
        .bind(driver_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn unassign<'e, E: SqliteExecutor<'e>>(
    executor: E,
    driver_id: i64,
    car_id: i64,
) -> Result<()> {
    sqlx::query("DELETE FROM car_drivers WHERE car_id = ? AND driver_id = ?")
        .bind(car_id)
        .bind(driver_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn clear_car_drivers<'e, E: SqliteExecutor<'e>>(executor: E, car_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM car_drivers WHERE car_id = ?")
        .bind(car_id)
        .execute(executor)
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

pub async fn insert_session(pool: &SqlitePool, token: &str, driver_id: i64) -> Result<()> {
    sqlx::query("INSERT INTO sessions (token, driver_id) VALUES (?, ?)")
        .bind(token)
        .bind(driver_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// The driver owning session `token`, if the session still exists.
pub async fn find_session_driver(pool: &SqlitePool, token: &str) -> Result<Option<Driver>> {
    let row = sqlx::query_as::<_, Driver>(
        "SELECT d.id, d.username, d.password, d.first_name, d.last_name, d.license_number \
         FROM sessions s JOIN drivers d ON d.id = s.driver_id WHERE s.token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Bumps the session's visit counter and returns the new value.
pub async fn increment_visits(pool: &SqlitePool, token: &str) -> Result<i64> {
    let row: Option<(i64,)> =
        sqlx::query_as("UPDATE sessions SET visits = visits + 1 WHERE token = ? RETURNING visits")
            .bind(token)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(visits,)| visits).unwrap_or(0))
}

// ---------------------------------------------------------------------------
// Home page counters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetCounts {
    pub drivers: i64,
    pub cars: i64,
    pub manufacturers: i64,
}

pub async fn fleet_counts(pool: &SqlitePool) -> Result<FleetCounts> {
    let (drivers, cars, manufacturers): (i64, i64, i64) = sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM drivers), \
                (SELECT COUNT(*) FROM cars), \
                (SELECT COUNT(*) FROM manufacturers)",
    )
    .fetch_one(pool)
    .await?;
    Ok(FleetCounts {
        drivers,
        cars,
        manufacturers,
    })
}
