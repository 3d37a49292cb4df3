//! Assigning drivers to cars.

use sqlx::SqlitePool;
use tracing::info;

use crate::database::models::Assignment;
use crate::database::queries;
use crate::errors::{AppError, Result};

/// Flip the driver's membership in the car's driver set.
///
/// Membership is read and changed inside one transaction: an existing edge is
/// removed, a missing one is added.
pub async fn toggle_assignment(
    pool: &SqlitePool,
    driver_id: i64,
    car_id: i64,
) -> Result<Assignment> {
    let mut tx = pool.begin().await?;

    if !queries::car_exists(&mut *tx, car_id).await? {
        return Err(AppError::not_found("Car", car_id));
    }

    let outcome = if queries::is_assigned(&mut *tx, driver_id, car_id).await? {
        queries::unassign(&mut *tx, driver_id, car_id).await?;
        Assignment::Unassigned
    } else {
        queries::assign(&mut *tx, driver_id, car_id).await?;
        Assignment::Assigned
    };

    tx.commit().await?;

    info!(driver_id, car_id, ?outcome, "toggled car assignment");
    Ok(outcome)
}

/// Replace the car's whole driver set.
pub async fn set_car_drivers(
    conn: &mut sqlx::SqliteConnection,
    car_id: i64,
    driver_ids: &[i64],
) -> Result<()> {
    queries::clear_car_drivers(&mut *conn, car_id).await?;
    for &driver_id in driver_ids {
        queries::assign(&mut *conn, driver_id, car_id).await?;
    }
    Ok(())
}
