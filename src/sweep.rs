//! One-shot maintenance run, meant for cron or a scheduled job runner.

use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use petcare_api::config::log_level_from_env;
use petcare_core::clock::{Clock, SystemClock};
use petcare_core::events::NullEventSink;
use petcare_core::scheduling::maintenance::heal_paid_payments;
use petcare_core::Scheduler;
use petcare_db::store::DEFAULT_RESERVATION_TIMEOUT;
use petcare_db::{create_pool, PgBookingLedger, PgBusinessCatalog, PgPaymentStore};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();
    petcare_api::init_tracing(log_level_from_env())?;

    let database_url = std::env::var("DATABASE_URL")
        .wrap_err("DATABASE_URL environment variable must be set")?;
    let db_pool = create_pool(&database_url).await?;

    let clock = Arc::new(SystemClock);
    let now = clock.now();

    // Nobody is listening for events in a one-shot run
    let scheduler = Scheduler::new(
        Arc::new(PgBookingLedger::new(db_pool.clone(), DEFAULT_RESERVATION_TIMEOUT)),
        Arc::new(PgBusinessCatalog::new(db_pool.clone())),
        clock,
        Arc::new(NullEventSink),
    );

    let appointments = scheduler.sweep_overdue_appointments(now).await?;
    println!(
        "Overdue appointments: processed={}, failed={}",
        appointments.processed, appointments.failed
    );

    let payments = heal_paid_payments(&PgPaymentStore::new(db_pool), now).await?;
    println!(
        "Paid payments healed: processed={}, failed={}",
        payments.processed, payments.failed
    );

    Ok(())
}
