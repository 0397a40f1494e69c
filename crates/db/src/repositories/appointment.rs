use std::time::Duration;

use crate::models::DbAppointment;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::Result;
use petcare_core::models::appointment::{AppointmentStatus, NewAppointment};
use petcare_core::models::slot::minute_of_day;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// SQLSTATE raised by `no_overlapping_appointments`.
pub const EXCLUSION_VIOLATION: &str = "23P01";

const APPOINTMENT_COLUMNS: &str = "id, business_id, service_id, client_id, pet_id, scheduled_date, \
     scheduled_time, duration_minutes, status, cancellation_reason, created_at, updated_at, deleted_at";

#[derive(Debug)]
pub enum InsertOutcome {
    Inserted(DbAppointment),
    /// Another active appointment already holds part of the interval.
    Overlaps,
}

/// Writes a new pending appointment. The exclusion constraint on the table
/// rejects the row if it would overlap an active appointment, so concurrent
/// callers cannot both succeed.
pub async fn insert_appointment(
    pool: &Pool<Postgres>,
    record: &NewAppointment,
    statement_timeout: Duration,
) -> Result<InsertOutcome> {
    let duration_minutes = i32::try_from(record.duration_minutes)?;
    let start_minute = minute_of_day(record.scheduled_time) as i32;

    tracing::debug!(
        "Inserting appointment: id={}, business={}, date={}, start_minute={}, duration={}",
        record.id, record.business_id, record.scheduled_date, start_minute, duration_minutes
    );

    let mut tx = pool.begin().await?;

    sqlx::query("SELECT set_config('statement_timeout', $1, true)")
        .bind(statement_timeout.as_millis().to_string())
        .execute(&mut *tx)
        .await?;

    let inserted = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        INSERT INTO appointments (
            id, business_id, service_id, client_id, pet_id, scheduled_date, scheduled_time,
            start_minute, duration_minutes, status, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
        RETURNING {}
        "#,
        APPOINTMENT_COLUMNS
    ))
    .bind(record.id)
    .bind(record.business_id)
    .bind(record.service_id)
    .bind(record.client_id)
    .bind(record.pet_id)
    .bind(record.scheduled_date)
    .bind(record.scheduled_time)
    .bind(start_minute)
    .bind(duration_minutes)
    .bind(AppointmentStatus::Pending.as_str())
    .bind(record.created_at)
    .fetch_one(&mut *tx)
    .await;

    match inserted {
        Ok(row) => {
            tx.commit().await?;
            Ok(InsertOutcome::Inserted(row))
        }
        Err(sqlx::Error::Database(db_err))
            if db_err.code().as_deref() == Some(EXCLUSION_VIOLATION) =>
        {
            tracing::debug!("Appointment {} rejected by overlap constraint", record.id);
            tx.rollback().await?;
            Ok(InsertOutcome::Overlaps)
        }
        Err(e) => Err(e.into()),
    }
}

/// Start times and durations of the active appointments of a business on a date.
pub async fn get_active_intervals(
    pool: &Pool<Postgres>,
    business_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<(NaiveTime, i32)>> {
    let intervals = sqlx::query_as::<_, (NaiveTime, i32)>(
        r#"
        SELECT scheduled_time, duration_minutes
        FROM appointments
        WHERE business_id = $1
          AND scheduled_date = $2
          AND status <> 'cancelled'
          AND deleted_at IS NULL
        ORDER BY scheduled_time ASC
        "#,
    )
    .bind(business_id)
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(intervals)
}

pub async fn get_appointment_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbAppointment>> {
    tracing::debug!("Getting appointment by id: {}", id);

    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {}
        FROM appointments
        WHERE id = $1
        "#,
        APPOINTMENT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

/// Moves an appointment from `from` to `to`. Returns `None` when the
/// appointment is missing, deleted, or no longer in `from`.
pub async fn update_status_if(
    pool: &Pool<Postgres>,
    id: Uuid,
    from: AppointmentStatus,
    to: AppointmentStatus,
    cancellation_reason: Option<&str>,
    updated_at: DateTime<Utc>,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET status = $3,
            cancellation_reason = COALESCE($4, cancellation_reason),
            updated_at = $5
        WHERE id = $1 AND status = $2 AND deleted_at IS NULL
        RETURNING {}
        "#,
        APPOINTMENT_COLUMNS
    ))
    .bind(id)
    .bind(from.as_str())
    .bind(to.as_str())
    .bind(cancellation_reason)
    .bind(updated_at)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

pub async fn get_pending_before(pool: &Pool<Postgres>, date: NaiveDate) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {}
        FROM appointments
        WHERE status = 'pending'
          AND deleted_at IS NULL
          AND scheduled_date < $1
        ORDER BY scheduled_date ASC, scheduled_time ASC
        "#,
        APPOINTMENT_COLUMNS
    ))
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}
