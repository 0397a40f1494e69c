use std::sync::Arc;

use chrono::Duration;
use petcare_core::errors::SchedulingError;
use petcare_core::events::AppointmentEventKind;
use petcare_core::models::appointment::AppointmentStatus;
use petcare_core::models::slot::OccupiedInterval;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use crate::test_utils::{at, booking_day, date, pet_of, TestContext};

#[tokio::test]
async fn test_adjacent_slot_stays_open() {
    let ctx = TestContext::new();
    let scheduler = ctx.scheduler();

    let before = scheduler
        .available_slots(ctx.business.id, ctx.service.id, booking_day())
        .await
        .unwrap();
    assert_eq!(
        before,
        vec![at(9, 0), at(9, 15), at(9, 30), at(9, 45), at(10, 0), at(10, 15), at(10, 30)]
    );

    scheduler
        .reserve(ctx.business.id, ctx.reserve_request(booking_day(), at(9, 0)))
        .await
        .unwrap();

    let after = scheduler
        .available_slots(ctx.business.id, ctx.service.id, booking_day())
        .await
        .unwrap();
    assert!(after.contains(&at(9, 30)));
    assert!(!after.contains(&at(9, 15)));
    assert!(!after.contains(&at(9, 0)));
}

#[tokio::test]
async fn test_availability_read_is_idempotent() {
    let ctx = TestContext::new();
    let scheduler = ctx.scheduler();
    ctx.seed(booking_day(), at(10, 0), AppointmentStatus::Confirmed);

    let first = scheduler
        .available_slots(ctx.business.id, ctx.service.id, booking_day())
        .await
        .unwrap();
    let second = scheduler
        .available_slots(ctx.business.id, ctx.service.id, booking_day())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(ctx.ledger.all().len(), 1);
}

#[tokio::test]
async fn test_past_date_is_rejected() {
    let ctx = TestContext::new();
    let scheduler = ctx.scheduler();
    let last_week = date(2026, 10, 26);

    let err = scheduler
        .available_slots(ctx.business.id, ctx.service.id, last_week)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::InvalidDate(_)));

    let err = scheduler
        .reserve(ctx.business.id, ctx.reserve_request(last_week, at(9, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::InvalidDate(_)));
    assert!(ctx.ledger.all().is_empty());
}

#[tokio::test]
async fn test_started_slots_are_hidden_today() {
    let ctx = TestContext::new();
    let scheduler = ctx.scheduler();
    // 09:20 on the booking day
    ctx.clock
        .set(booking_day().and_time(at(9, 20)).and_utc());

    let slots = scheduler
        .available_slots(ctx.business.id, ctx.service.id, booking_day())
        .await
        .unwrap();
    assert_eq!(slots.first(), Some(&at(9, 30)));

    let err = scheduler
        .reserve(ctx.business.id, ctx.reserve_request(booking_day(), at(9, 15)))
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));
}

#[tokio::test]
async fn test_reservation_is_pending_and_emits_event() {
    let ctx = TestContext::new();
    let scheduler = ctx.scheduler();

    let appointment = scheduler
        .reserve(ctx.business.id, ctx.reserve_request(booking_day(), at(10, 0)))
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.duration_minutes, ctx.service.duration_minutes);
    assert_eq!(appointment.client_id, ctx.client_id);

    let events = ctx.events.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AppointmentEventKind::BookingCreated);
    assert_eq!(events[0].recipient, ctx.client_id);
}

#[tokio::test]
async fn test_overlapping_reservation_conflicts() {
    let ctx = TestContext::new();
    let scheduler = ctx.scheduler();

    scheduler
        .reserve(ctx.business.id, ctx.reserve_request(booking_day(), at(9, 0)))
        .await
        .unwrap();

    let err = scheduler
        .reserve(ctx.business.id, ctx.reserve_request(booking_day(), at(9, 15)))
        .await
        .unwrap_err();
    match err {
        SchedulingError::Conflict(conflict) => {
            assert_eq!(conflict.blocking.len(), 1);
            assert_eq!(conflict.blocking[0].start, at(9, 0));
        }
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(ctx.events.events().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_reservations_admit_exactly_one() {
    let ctx = TestContext::new();
    let scheduler = Arc::new(ctx.scheduler());

    let first = {
        let scheduler = scheduler.clone();
        let request = ctx.reserve_request(booking_day(), at(10, 0));
        let business_id = ctx.business.id;
        tokio::spawn(async move { scheduler.reserve(business_id, request).await })
    };
    let second = {
        let scheduler = scheduler.clone();
        let request = ctx.reserve_request(booking_day(), at(10, 15));
        let business_id = ctx.business.id;
        tokio::spawn(async move { scheduler.reserve(business_id, request).await })
    };

    let outcomes = [first.await.unwrap(), second.await.unwrap()];
    let won = outcomes.iter().filter(|r| r.is_ok()).count();
    let conflicted = outcomes
        .iter()
        .filter(|r| matches!(r, Err(SchedulingError::Conflict(_))))
        .count();

    assert_eq!(won, 1);
    assert_eq!(conflicted, 1);
    assert_eq!(ctx.ledger.all().len(), 1);
}

#[tokio::test]
async fn test_active_appointments_never_overlap() {
    let ctx = TestContext::new();
    let scheduler = ctx.scheduler();

    // Try every grid start, forwards then backwards
    let starts = [
        at(9, 0), at(9, 15), at(9, 30), at(9, 45), at(10, 0), at(10, 15), at(10, 30),
    ];
    for start in starts.iter().chain(starts.iter().rev()) {
        let _ = scheduler
            .reserve(ctx.business.id, ctx.reserve_request(booking_day(), *start))
            .await;
    }

    let active: Vec<_> = ctx
        .ledger
        .all()
        .into_iter()
        .filter(|a| a.is_active())
        .collect();
    assert_eq!(active.len(), 4);
    for (i, a) in active.iter().enumerate() {
        for b in &active[i + 1..] {
            assert!(
                !a.occupied_interval().overlaps(&b.occupied_interval()),
                "{} overlaps {}",
                a.occupied_interval(),
                b.occupied_interval()
            );
        }
    }
}

#[tokio::test]
async fn test_overlapping_legacy_rows_are_both_avoided() {
    let ctx = TestContext::new();
    let scheduler = ctx.scheduler();
    // Rows written around the guard, overlapping each other
    let first = ctx.seed(booking_day(), at(9, 0), AppointmentStatus::Confirmed);
    let second = ctx.seed(booking_day(), at(9, 15), AppointmentStatus::Pending);
    assert!(first.occupied_interval().overlaps(&second.occupied_interval()));

    let slots = scheduler
        .available_slots(ctx.business.id, ctx.service.id, booking_day())
        .await
        .unwrap();

    assert_eq!(slots, vec![at(9, 45), at(10, 0), at(10, 15), at(10, 30)]);
    for slot in &slots {
        let offered = OccupiedInterval::new(*slot, ctx.service.duration_minutes);
        assert!(!offered.overlaps(&first.occupied_interval()));
        assert!(!offered.overlaps(&second.occupied_interval()));
    }
}

#[tokio::test]
async fn test_off_grid_and_out_of_hours_starts_are_rejected() {
    let ctx = TestContext::new();
    let scheduler = ctx.scheduler();

    for start in [at(9, 5), at(10, 45), at(8, 30)] {
        let err = scheduler
            .reserve(ctx.business.id, ctx.reserve_request(booking_day(), start))
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Validation(_)), "{start} should be rejected");
    }
}

#[tokio::test]
async fn test_unknown_references_are_not_found() {
    let ctx = TestContext::new();
    let scheduler = ctx.scheduler();

    let err = scheduler
        .reserve(Uuid::new_v4(), ctx.reserve_request(booking_day(), at(9, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound(_)));

    // Someone else's pet
    let stranger_pet = pet_of(Uuid::new_v4());
    ctx.catalog.add_pet(stranger_pet.clone());
    let mut request = ctx.reserve_request(booking_day(), at(9, 0));
    request.pet_id = stranger_pet.id;
    let err = scheduler.reserve(ctx.business.id, request).await.unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound(_)));

    let mut retired = ctx.service.clone();
    retired.active = false;
    ctx.catalog.add_service(retired);
    let err = scheduler
        .available_slots(ctx.business.id, ctx.service.id, booking_day())
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound(_)));
}

#[tokio::test]
async fn test_closed_day_has_no_slots() {
    let mut ctx = TestContext::new();
    ctx.business.operating_hours.retain(|w| w.weekday != chrono::Weekday::Tue);
    ctx.catalog.add_business(ctx.business.clone());

    let tuesday = booking_day() + Duration::days(1);
    let slots = ctx
        .scheduler()
        .available_slots(ctx.business.id, ctx.service.id, tuesday)
        .await
        .unwrap();
    assert!(slots.is_empty());
}
