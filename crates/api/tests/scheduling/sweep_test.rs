use std::collections::HashMap;
use std::sync::Arc;

use mockall::predicate::eq;
use petcare_api::background::run_maintenance;
use petcare_core::errors::SchedulingError;
use petcare_core::events::AppointmentEventKind;
use petcare_core::models::appointment::{Appointment, AppointmentStatus};
use petcare_core::models::maintenance::SweepReport;
use petcare_core::models::payment::{Payment, PaymentStatus};
use petcare_core::scheduling::maintenance::{heal_paid_payments, OVERDUE_CANCELLATION_REASON};
use petcare_db::mock::repositories::{MockCatalog, MockLedger, MockPayments};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use crate::test_utils::{at, date, default_now, TestContext};

#[test_log::test(tokio::test)]
async fn test_sweep_cancels_only_overdue_pending() {
    let ctx = TestContext::new();
    let scheduler = ctx.scheduler();

    let overdue: Vec<Appointment> = [date(2026, 10, 29), date(2026, 10, 30), date(2026, 10, 31)]
        .into_iter()
        .map(|day| ctx.seed(day, at(9, 0), AppointmentStatus::Pending))
        .collect();
    // Today and tomorrow stay untouched
    let today = ctx.seed(date(2026, 11, 1), at(9, 0), AppointmentStatus::Pending);
    let tomorrow = ctx.seed(date(2026, 11, 2), at(9, 0), AppointmentStatus::Pending);
    // Past but not pending
    let confirmed = ctx.seed(date(2026, 10, 30), at(10, 0), AppointmentStatus::Confirmed);

    let report = scheduler.sweep_overdue_appointments(default_now()).await.unwrap();
    assert_eq!(report, SweepReport { processed: 3, failed: 0 });

    let stored: HashMap<Uuid, Appointment> = ctx.ledger.all().into_iter().map(|a| (a.id, a)).collect();
    for appointment in &overdue {
        let after = &stored[&appointment.id];
        assert_eq!(after.status, AppointmentStatus::Cancelled);
        assert_eq!(after.cancellation_reason.as_deref(), Some(OVERDUE_CANCELLATION_REASON));
    }
    assert_eq!(stored[&today.id].status, AppointmentStatus::Pending);
    assert_eq!(stored[&tomorrow.id].status, AppointmentStatus::Pending);
    assert_eq!(stored[&confirmed.id].status, AppointmentStatus::Confirmed);

    let cancellations = ctx
        .events
        .events()
        .into_iter()
        .filter(|e| e.kind == AppointmentEventKind::BookingCancelled)
        .count();
    assert_eq!(cancellations, 3);

    // Second run has nothing left to do
    let again = scheduler.sweep_overdue_appointments(default_now()).await.unwrap();
    assert_eq!(again, SweepReport::default());
}

#[test_log::test(tokio::test)]
async fn test_sweep_counts_storage_failure_and_continues() {
    let ctx = TestContext::new();
    let candidates: Vec<Appointment> = [date(2026, 10, 29), date(2026, 10, 30), date(2026, 10, 31)]
        .into_iter()
        .map(|day| ctx.seed(day, at(9, 0), AppointmentStatus::Pending))
        .collect();
    let failing_id = candidates[1].id;
    let by_id: HashMap<Uuid, Appointment> = candidates.iter().cloned().map(|a| (a.id, a)).collect();

    let mut ledger = MockLedger::new();
    let listed = candidates.clone();
    // Day after the UTC date, so businesses ahead of UTC are covered
    ledger
        .expect_find_pending_before()
        .with(eq(date(2026, 11, 2)))
        .times(1)
        .returning(move |_| Ok(listed.clone()));
    ledger.expect_update_status().times(3).returning(move |change| {
        if change.appointment_id == failing_id {
            return Err(SchedulingError::Database(eyre::eyre!("connection reset by peer")));
        }
        let mut updated = by_id[&change.appointment_id].clone();
        updated.status = change.to;
        updated.cancellation_reason = change.reason;
        updated.updated_at = change.at;
        Ok(updated)
    });

    let scheduler = ctx.scheduler_with(Arc::new(ledger), ctx.catalog.clone());
    let report = scheduler.sweep_overdue_appointments(default_now()).await.unwrap();

    assert_eq!(report, SweepReport { processed: 2, failed: 1 });
    assert_eq!(ctx.events.events().len(), 2);
}

#[tokio::test]
async fn test_sweep_counts_unknown_business_as_failed() {
    let ctx = TestContext::new();
    let orphan = ctx.seed(date(2026, 10, 30), at(9, 0), AppointmentStatus::Pending);

    let mut catalog = MockCatalog::new();
    catalog
        .expect_find_business()
        .times(1)
        .returning(|_| Err(SchedulingError::Database(eyre::eyre!("pool timed out"))));

    let scheduler = ctx.scheduler_with(ctx.ledger.clone(), Arc::new(catalog));
    let report = scheduler.sweep_overdue_appointments(default_now()).await.unwrap();

    assert_eq!(report, SweepReport { processed: 0, failed: 1 });
    assert_eq!(ctx.ledger.all()[0].id, orphan.id);
    assert_eq!(ctx.ledger.all()[0].status, AppointmentStatus::Pending);
}

#[tokio::test]
async fn test_sweep_aborts_when_listing_fails() {
    let ctx = TestContext::new();
    let mut ledger = MockLedger::new();
    ledger
        .expect_find_pending_before()
        .returning(|_| Err(SchedulingError::Database(eyre::eyre!("relation does not exist"))));

    let scheduler = ctx.scheduler_with(Arc::new(ledger), ctx.catalog.clone());
    let err = scheduler.sweep_overdue_appointments(default_now()).await.unwrap_err();
    assert!(matches!(err, SchedulingError::Database(_)));
}

#[tokio::test]
async fn test_sweep_uses_business_local_date() {
    // Noon UTC on 2026-11-01 is already 2026-11-02 01:00 in Auckland
    let auckland = TestContext::in_timezone(chrono_tz::Pacific::Auckland);
    let local_yesterday = auckland.seed(date(2026, 11, 1), at(9, 0), AppointmentStatus::Pending);

    let report = auckland
        .scheduler()
        .sweep_overdue_appointments(default_now())
        .await
        .unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(auckland.ledger.all()[0].id, local_yesterday.id);
    assert_eq!(auckland.ledger.all()[0].status, AppointmentStatus::Cancelled);

    // ...and still 2026-11-01 09:00 in São Paulo
    let sao_paulo = TestContext::in_timezone(chrono_tz::America::Sao_Paulo);
    sao_paulo.seed(date(2026, 11, 1), at(8, 0), AppointmentStatus::Pending);

    let report = sao_paulo
        .scheduler()
        .sweep_overdue_appointments(default_now())
        .await
        .unwrap();
    assert_eq!(report, SweepReport::default());
    assert_eq!(sao_paulo.ledger.all()[0].status, AppointmentStatus::Pending);
}

fn paid_without_timestamp() -> Payment {
    Payment {
        id: Uuid::new_v4(),
        appointment_id: Some(Uuid::new_v4()),
        amount_cents: 6000,
        status: PaymentStatus::Pago,
        paid_at: None,
        created_at: default_now(),
    }
}

#[tokio::test]
async fn test_payment_healing_stamps_missing_paid_at() {
    let ctx = TestContext::new();
    let broken = paid_without_timestamp();
    let mut pending = paid_without_timestamp();
    pending.status = PaymentStatus::Pendente;
    ctx.payments.add_payment(broken.clone());
    ctx.payments.add_payment(pending.clone());

    let report = heal_paid_payments(ctx.payments.as_ref(), default_now()).await.unwrap();

    assert_eq!(report, SweepReport { processed: 1, failed: 0 });
    let stored = ctx.payments.all();
    let healed = stored.iter().find(|p| p.id == broken.id).unwrap();
    assert_eq!(healed.paid_at, Some(default_now()));
    assert!(healed.validate().is_ok());
    let untouched = stored.iter().find(|p| p.id == pending.id).unwrap();
    assert_eq!(untouched.paid_at, None);
}

#[tokio::test]
async fn test_payment_healing_reports_partial_failure() {
    let first = paid_without_timestamp();
    let second = paid_without_timestamp();
    let failing_id = second.id;
    let listed = vec![first.clone(), second.clone()];

    let mut store = MockPayments::new();
    store
        .expect_find_paid_missing_timestamp()
        .returning(move || Ok(listed.clone()));
    store.expect_stamp_paid_at().times(2).returning(move |id, at| {
        if id == failing_id {
            return Err(SchedulingError::NotFound(format!("Payment with ID {} not found", id)));
        }
        let mut healed = first.clone();
        healed.paid_at = Some(at);
        Ok(healed)
    });

    let report = heal_paid_payments(&store, default_now()).await.unwrap();
    assert_eq!(report, SweepReport { processed: 1, failed: 1 });
}

#[test_log::test(tokio::test)]
async fn test_run_maintenance_runs_both_jobs() {
    let ctx = TestContext::new();
    let overdue = ctx.seed(date(2026, 10, 30), at(9, 0), AppointmentStatus::Pending);
    let upcoming = ctx.seed(date(2026, 11, 2), at(9, 0), AppointmentStatus::Pending);
    let broken = paid_without_timestamp();
    ctx.payments.add_payment(broken.clone());

    let state = ctx.build_state();
    run_maintenance(&state).await;

    let stored: HashMap<Uuid, Appointment> = ctx.ledger.all().into_iter().map(|a| (a.id, a)).collect();
    assert_eq!(stored[&overdue.id].status, AppointmentStatus::Cancelled);
    assert_eq!(stored[&upcoming.id].status, AppointmentStatus::Pending);

    let healed = ctx.payments.all().into_iter().find(|p| p.id == broken.id).unwrap();
    assert_eq!(healed.paid_at, Some(default_now()));
}
