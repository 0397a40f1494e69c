use std::sync::Arc;
use std::time::Duration;

use petcare_core::scheduling::maintenance::heal_paid_payments;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, info_span, Instrument};

use crate::ApiState;

/// Runs both maintenance jobs once.
pub async fn run_maintenance(state: &ApiState) {
    let now = state.scheduler.now();

    async {
        match state.scheduler.sweep_overdue_appointments(now).await {
            Ok(report) => info!(processed = report.processed, failed = report.failed, "sweep done"),
            Err(e) => error!("Overdue appointment sweep aborted: {}", e),
        }
    }
    .instrument(info_span!("maintenance_job", job = "overdue_sweep"))
    .await;

    async {
        match heal_paid_payments(state.payments.as_ref(), now).await {
            Ok(report) => info!(processed = report.processed, failed = report.failed, "healing done"),
            Err(e) => error!("Payment healing aborted: {}", e),
        }
    }
    .instrument(info_span!("maintenance_job", job = "payment_healing"))
    .await;
}

/// Starts the periodic maintenance worker.
pub fn spawn_maintenance_worker(state: Arc<ApiState>, period: Duration) -> JoinHandle<()> {
    info!("Starting maintenance worker, every {}s", period.as_secs());

    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            run_maintenance(&state).await;
        }
    })
}
