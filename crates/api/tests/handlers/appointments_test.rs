use axum::http::StatusCode;
use petcare_core::models::appointment::{Appointment, AppointmentStatus};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::test_utils::{at, booking_day, TestContext};

fn reserve_body(ctx: &TestContext, start: &str) -> Value {
    json!({
        "service_id": ctx.service.id,
        "client_id": ctx.client_id,
        "pet_id": ctx.pet.id,
        "date": "2026-11-02",
        "start_time": start,
    })
}

#[tokio::test]
async fn test_reserve_appointment() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post(&format!("/api/businesses/{}/appointments", ctx.business.id))
        .json(&reserve_body(&ctx, "09:00"))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let appointment: Appointment = response.json();
    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.scheduled_date, booking_day());
    assert_eq!(appointment.scheduled_time, at(9, 0));

    let fetched = server.get(&format!("/api/appointments/{}", appointment.id)).await;
    assert_eq!(fetched.status_code(), StatusCode::OK);
    assert_eq!(fetched.json::<Appointment>(), appointment);
}

#[tokio::test]
async fn test_reserve_overlapping_slot_conflicts() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let path = format!("/api/businesses/{}/appointments", ctx.business.id);

    server.post(&path).json(&reserve_body(&ctx, "09:00")).await;
    let response = server.post(&path).json(&reserve_body(&ctx, "09:15")).await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["conflict"]["blocking"][0]["start"], "09:00");

    let adjacent = server.post(&path).json(&reserve_body(&ctx, "09:30")).await;
    assert_eq!(adjacent.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_reserve_off_grid_start() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post(&format!("/api/businesses/{}/appointments", ctx.business.id))
        .json(&reserve_body(&ctx, "09:07"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_appointment() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get(&format!("/api/appointments/{}", Uuid::new_v4())).await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_confirm_appointment() {
    let ctx = TestContext::new();
    let seeded = ctx.seed(booking_day(), at(10, 0), AppointmentStatus::Pending);
    let server = ctx.server();

    let response = server
        .post(&format!("/api/appointments/{}/status", seeded.id))
        .json(&json!({ "status": "confirmed", "actor": "business" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Appointment>().status, AppointmentStatus::Confirmed);
}

#[rstest]
#[case(AppointmentStatus::Completed, json!({ "status": "cancelled", "actor": "business" }), StatusCode::CONFLICT)]
#[case(AppointmentStatus::Cancelled, json!({ "status": "confirmed", "actor": "business" }), StatusCode::CONFLICT)]
#[case(AppointmentStatus::Pending, json!({ "status": "confirmed", "actor": "client" }), StatusCode::CONFLICT)]
#[case(AppointmentStatus::Pending, json!({ "status": "cancelled", "actor": "maintenance" }), StatusCode::BAD_REQUEST)]
#[case(AppointmentStatus::Pending, json!({ "status": "archived", "actor": "business" }), StatusCode::UNPROCESSABLE_ENTITY)]
#[tokio::test]
async fn test_rejected_status_changes(
    #[case] current: AppointmentStatus,
    #[case] body: Value,
    #[case] expected: StatusCode,
) {
    let ctx = TestContext::new();
    let seeded = ctx.seed(booking_day(), at(10, 0), current);
    let server = ctx.server();

    let response = server
        .post(&format!("/api/appointments/{}/status", seeded.id))
        .json(&body)
        .await;

    assert_eq!(response.status_code(), expected);
    assert_eq!(ctx.ledger.all()[0].status, current);
}
