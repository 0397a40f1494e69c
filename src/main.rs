use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use petcare_api::config::ApiConfig;
use petcare_api::notifications::{notifier_from_config, spawn_dispatcher, ChannelEventSink};
use petcare_api::{background, ApiState};
use petcare_core::clock::SystemClock;
use petcare_core::Scheduler;
use petcare_db::{create_pool, schema::initialize_database, PgBookingLedger, PgBusinessCatalog, PgPaymentStore};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;
    petcare_api::init_tracing(config.log_level)?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    // Notification delivery runs beside the server
    let (events, rx) = ChannelEventSink::channel();
    spawn_dispatcher(rx, notifier_from_config(config.notify_webhook_url.as_deref()));

    let scheduler = Scheduler::new(
        Arc::new(PgBookingLedger::new(db_pool.clone(), config.reservation_timeout)),
        Arc::new(PgBusinessCatalog::new(db_pool.clone())),
        Arc::new(SystemClock),
        Arc::new(events),
    );
    let state = Arc::new(ApiState {
        scheduler: Arc::new(scheduler),
        payments: Arc::new(PgPaymentStore::new(db_pool)),
    });

    match config.sweep_interval {
        Some(period) => {
            background::spawn_maintenance_worker(state.clone(), period);
        }
        None => info!("Background maintenance disabled"),
    }

    // Start API server
    petcare_api::start_server(config, state).await?;

    Ok(())
}
