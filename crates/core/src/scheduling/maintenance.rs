//! Periodic batch jobs. Both jobs work record by record: a failing record is
//! counted and logged, and the batch moves on.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{SchedulingError, SchedulingResult};
use crate::models::appointment::{Actor, AppointmentStatus};
use crate::models::business::Business;
use crate::models::maintenance::SweepReport;
use crate::ports::PaymentStore;
use crate::scheduling::{state_machine, Scheduler};

pub const OVERDUE_CANCELLATION_REASON: &str = "auto-cancelled: appointment date passed while pending";

impl Scheduler {
    /// Cancels pending appointments whose date is before the business-local
    /// today.
    ///
    /// Only a failure to list candidates aborts the sweep; per-appointment
    /// failures end up in `SweepReport::failed`.
    pub async fn sweep_overdue_appointments(&self, now: DateTime<Utc>) -> SchedulingResult<SweepReport> {
        // No timezone is more than a day ahead of UTC, so this bound catches
        // every appointment that is overdue somewhere.
        let horizon = now.date_naive() + Duration::days(1);
        let candidates = self.ledger.find_pending_before(horizon).await?;

        let mut businesses: HashMap<Uuid, Business> = HashMap::new();
        let mut report = SweepReport::default();

        for appointment in candidates {
            if !businesses.contains_key(&appointment.business_id) {
                match self.catalog.find_business(appointment.business_id).await {
                    Ok(Some(business)) => {
                        businesses.insert(business.id, business);
                    }
                    Ok(None) => {
                        warn!(
                            appointment_id = %appointment.id,
                            business_id = %appointment.business_id,
                            "sweep skipped appointment of unknown business"
                        );
                        report.failed += 1;
                        continue;
                    }
                    Err(e) => {
                        warn!(appointment_id = %appointment.id, "sweep could not load business: {}", e);
                        report.failed += 1;
                        continue;
                    }
                }
            }
            let Some(business) = businesses.get(&appointment.business_id) else {
                continue;
            };

            let local_now = business.local_now(now);
            if state_machine::check_transition(
                &appointment,
                AppointmentStatus::Cancelled,
                Actor::Maintenance,
                local_now,
            )
            .is_err()
            {
                // Still today in the business's timezone.
                continue;
            }

            match self
                .apply_transition(
                    &appointment,
                    AppointmentStatus::Cancelled,
                    Actor::Maintenance,
                    Some(OVERDUE_CANCELLATION_REASON.to_string()),
                    local_now,
                    now,
                )
                .await
            {
                Ok(_) => report.processed += 1,
                Err(e) => {
                    warn!(appointment_id = %appointment.id, "sweep failed to cancel appointment: {}", e);
                    report.failed += 1;
                }
            }
        }

        info!(
            processed = report.processed,
            failed = report.failed,
            "overdue appointment sweep finished"
        );
        Ok(report)
    }
}

/// Stamps `paid_at` on payments that are `pago` without one.
pub async fn heal_paid_payments(store: &dyn PaymentStore, now: DateTime<Utc>) -> SchedulingResult<SweepReport> {
    let broken = store.find_paid_missing_timestamp().await?;
    let mut report = SweepReport::default();

    for payment in broken {
        match store.stamp_paid_at(payment.id, now).await {
            Ok(healed) if healed.paid_at.is_some() => report.processed += 1,
            Ok(healed) => {
                warn!(payment_id = %healed.id, "payment still has no paid_at after healing");
                report.failed += 1;
            }
            Err(SchedulingError::NotFound(msg)) => {
                warn!(payment_id = %payment.id, "payment vanished during healing: {}", msg);
                report.failed += 1;
            }
            Err(e) => {
                warn!(payment_id = %payment.id, "failed to heal payment: {}", e);
                report.failed += 1;
            }
        }
    }

    info!(
        processed = report.processed,
        failed = report.failed,
        "paid payment healing finished"
    );
    Ok(report)
}
