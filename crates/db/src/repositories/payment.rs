use crate::models::DbPayment;
use chrono::{DateTime, Utc};
use eyre::Result;
use petcare_core::models::payment::PaymentStatus;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_payment(
    pool: &Pool<Postgres>,
    appointment_id: Option<Uuid>,
    amount_cents: i64,
    status: PaymentStatus,
    paid_at: Option<DateTime<Utc>>,
) -> Result<DbPayment> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let payment = sqlx::query_as::<_, DbPayment>(
        r#"
        INSERT INTO payments (id, appointment_id, amount_cents, status, paid_at, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, appointment_id, amount_cents, status, paid_at, created_at
        "#,
    )
    .bind(id)
    .bind(appointment_id)
    .bind(amount_cents)
    .bind(status.as_str())
    .bind(paid_at)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(payment)
}

pub async fn get_paid_missing_timestamp(pool: &Pool<Postgres>) -> Result<Vec<DbPayment>> {
    let payments = sqlx::query_as::<_, DbPayment>(
        r#"
        SELECT id, appointment_id, amount_cents, status, paid_at, created_at
        FROM payments
        WHERE status = 'pago' AND paid_at IS NULL
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(payments)
}

/// Sets `paid_at` unless another writer already did.
pub async fn stamp_paid_at(
    pool: &Pool<Postgres>,
    id: Uuid,
    paid_at: DateTime<Utc>,
) -> Result<Option<DbPayment>> {
    let payment = sqlx::query_as::<_, DbPayment>(
        r#"
        UPDATE payments
        SET paid_at = COALESCE(paid_at, $2)
        WHERE id = $1
        RETURNING id, appointment_id, amount_cents, status, paid_at, created_at
        "#,
    )
    .bind(id)
    .bind(paid_at)
    .fetch_optional(pool)
    .await?;

    Ok(payment)
}
