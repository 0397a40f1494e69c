use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Needed for the uuid equality part of the appointment exclusion constraint
    sqlx::query("CREATE EXTENSION IF NOT EXISTS btree_gist;")
        .execute(pool)
        .await?;

    // Create businesses table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS businesses (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            timezone VARCHAR(64) NOT NULL DEFAULT 'UTC',
            slot_interval_minutes INTEGER NOT NULL DEFAULT 30,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT positive_slot_interval CHECK (slot_interval_minutes > 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create operating_hours table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS operating_hours (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            business_id UUID NOT NULL REFERENCES businesses(id) ON DELETE CASCADE,
            weekday SMALLINT NOT NULL,
            opens TIME NOT NULL,
            closes TIME NOT NULL,
            CONSTRAINT valid_weekday CHECK (weekday BETWEEN 0 AND 6),
            CONSTRAINT valid_window CHECK (closes > opens OR closes = TIME '00:00')
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create services table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS services (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            business_id UUID NOT NULL REFERENCES businesses(id) ON DELETE CASCADE,
            name VARCHAR(255) NOT NULL,
            duration_minutes INTEGER NOT NULL,
            price_cents BIGINT NOT NULL DEFAULT 0,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            CONSTRAINT positive_duration CHECK (duration_minutes > 0 AND duration_minutes <= 1440)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create pets table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pets (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            owner_id UUID NOT NULL,
            name VARCHAR(255) NOT NULL,
            species VARCHAR(64) NOT NULL,
            breed VARCHAR(255) NULL,
            age_years INTEGER NULL,
            weight_kg DOUBLE PRECISION NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create appointments table. The exclusion constraint is what keeps two
    // active appointments from sharing minutes, whichever process writes them.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id UUID PRIMARY KEY,
            business_id UUID NOT NULL REFERENCES businesses(id),
            service_id UUID NOT NULL REFERENCES services(id),
            client_id UUID NOT NULL,
            pet_id UUID NOT NULL REFERENCES pets(id),
            scheduled_date DATE NOT NULL,
            scheduled_time TIME NOT NULL,
            start_minute INTEGER NOT NULL,
            duration_minutes INTEGER NOT NULL,
            occupied INT4RANGE GENERATED ALWAYS AS
                (int4range(start_minute, start_minute + duration_minutes, '[)')) STORED,
            status VARCHAR(16) NOT NULL DEFAULT 'pending',
            cancellation_reason TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            deleted_at TIMESTAMP WITH TIME ZONE NULL,
            CONSTRAINT valid_status CHECK (status IN ('pending', 'confirmed', 'completed', 'cancelled')),
            CONSTRAINT positive_appointment_duration CHECK (duration_minutes > 0),
            CONSTRAINT no_overlapping_appointments EXCLUDE USING gist (
                business_id WITH =,
                scheduled_date WITH =,
                occupied WITH &&
            ) WHERE (status <> 'cancelled' AND deleted_at IS NULL)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create payments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS payments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            appointment_id UUID NULL REFERENCES appointments(id),
            amount_cents BIGINT NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'pendente',
            paid_at TIMESTAMP WITH TIME ZONE NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_payment_status CHECK (status IN ('pendente', 'pago', 'cancelled')),
            CONSTRAINT non_negative_amount CHECK (amount_cents >= 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_operating_hours_business_id ON operating_hours(business_id);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_services_business_id ON services(business_id);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_appointments_business_date ON appointments(business_id, scheduled_date);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_appointments_pending_date ON appointments(scheduled_date)
        WHERE status = 'pending' AND deleted_at IS NULL;
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_payments_paid_missing_timestamp ON payments(id)
        WHERE status = 'pago' AND paid_at IS NULL;
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully");
    Ok(())
}
