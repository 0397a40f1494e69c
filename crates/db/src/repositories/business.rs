use crate::models::{weekday_to_db, DbBusiness, DbOperatingWindow, DbPet, DbService};
use chrono::Utc;
use eyre::Result;
use petcare_core::models::business::OperatingWindow;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_business(
    pool: &Pool<Postgres>,
    name: &str,
    timezone: &str,
    slot_interval_minutes: i32,
) -> Result<DbBusiness> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating business: id={}, name={}, timezone={}, slot_interval={}",
        id, name, timezone, slot_interval_minutes
    );

    let business = sqlx::query_as::<_, DbBusiness>(
        r#"
        INSERT INTO businesses (id, name, timezone, slot_interval_minutes, active, created_at)
        VALUES ($1, $2, $3, $4, TRUE, $5)
        RETURNING id, name, timezone, slot_interval_minutes, active, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(timezone)
    .bind(slot_interval_minutes)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(business)
}

pub async fn get_business_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbBusiness>> {
    tracing::debug!("Getting business by id: {}", id);

    let business = sqlx::query_as::<_, DbBusiness>(
        r#"
        SELECT id, name, timezone, slot_interval_minutes, active, created_at
        FROM businesses
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(business)
}

pub async fn get_operating_hours(
    pool: &Pool<Postgres>,
    business_id: Uuid,
) -> Result<Vec<DbOperatingWindow>> {
    let hours = sqlx::query_as::<_, DbOperatingWindow>(
        r#"
        SELECT business_id, weekday, opens, closes
        FROM operating_hours
        WHERE business_id = $1
        ORDER BY weekday ASC, opens ASC
        "#,
    )
    .bind(business_id)
    .fetch_all(pool)
    .await?;

    Ok(hours)
}

/// Replaces the whole weekly operating schedule of a business.
pub async fn replace_operating_hours(
    pool: &Pool<Postgres>,
    business_id: Uuid,
    windows: &[OperatingWindow],
) -> Result<Vec<DbOperatingWindow>> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM operating_hours
        WHERE business_id = $1
        "#,
    )
    .bind(business_id)
    .execute(&mut *tx)
    .await?;

    let mut stored = Vec::with_capacity(windows.len());
    for window in windows {
        let row = sqlx::query_as::<_, DbOperatingWindow>(
            r#"
            INSERT INTO operating_hours (id, business_id, weekday, opens, closes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING business_id, weekday, opens, closes
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(business_id)
        .bind(weekday_to_db(window.weekday))
        .bind(window.opens)
        .bind(window.closes)
        .fetch_one(&mut *tx)
        .await?;
        stored.push(row);
    }

    tx.commit().await?;
    tracing::debug!("Stored {} operating windows for business {}", stored.len(), business_id);
    Ok(stored)
}

pub async fn create_service(
    pool: &Pool<Postgres>,
    business_id: Uuid,
    name: &str,
    duration_minutes: i32,
    price_cents: i64,
) -> Result<DbService> {
    let id = Uuid::new_v4();

    let service = sqlx::query_as::<_, DbService>(
        r#"
        INSERT INTO services (id, business_id, name, duration_minutes, price_cents, active)
        VALUES ($1, $2, $3, $4, $5, TRUE)
        RETURNING id, business_id, name, duration_minutes, price_cents, active
        "#,
    )
    .bind(id)
    .bind(business_id)
    .bind(name)
    .bind(duration_minutes)
    .bind(price_cents)
    .fetch_one(pool)
    .await?;

    Ok(service)
}

pub async fn get_service(
    pool: &Pool<Postgres>,
    business_id: Uuid,
    service_id: Uuid,
) -> Result<Option<DbService>> {
    let service = sqlx::query_as::<_, DbService>(
        r#"
        SELECT id, business_id, name, duration_minutes, price_cents, active
        FROM services
        WHERE id = $1 AND business_id = $2
        "#,
    )
    .bind(service_id)
    .bind(business_id)
    .fetch_optional(pool)
    .await?;

    Ok(service)
}

pub async fn create_pet(
    pool: &Pool<Postgres>,
    owner_id: Uuid,
    name: &str,
    species: &str,
) -> Result<DbPet> {
    let id = Uuid::new_v4();

    let pet = sqlx::query_as::<_, DbPet>(
        r#"
        INSERT INTO pets (id, owner_id, name, species)
        VALUES ($1, $2, $3, $4)
        RETURNING id, owner_id, name, species, breed, age_years, weight_kg
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .bind(name)
    .bind(species)
    .fetch_one(pool)
    .await?;

    Ok(pet)
}

pub async fn get_pet_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbPet>> {
    let pet = sqlx::query_as::<_, DbPet>(
        r#"
        SELECT id, owner_id, name, species, breed, age_years, weight_kg
        FROM pets
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(pet)
}
