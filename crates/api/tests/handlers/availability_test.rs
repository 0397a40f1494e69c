use axum::http::StatusCode;
use petcare_core::models::appointment::AppointmentStatus;
use petcare_core::models::availability::AvailabilityResponse;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use crate::test_utils::{at, booking_day, TestContext};

fn availability_path(ctx: &TestContext) -> String {
    format!(
        "/api/businesses/{}/services/{}/availability",
        ctx.business.id, ctx.service.id
    )
}

#[tokio::test]
async fn test_get_availability() {
    let ctx = TestContext::new();
    ctx.seed(booking_day(), at(9, 0), AppointmentStatus::Pending);
    let server = ctx.server();

    let response = server
        .get(&availability_path(&ctx))
        .add_query_param("date", "2026-11-02")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: AvailabilityResponse = response.json();
    assert_eq!(body.date, booking_day());
    assert_eq!(body.duration_minutes, 30);
    assert_eq!(body.slots, vec!["09:30", "09:45", "10:00", "10:15", "10:30"]);
}

#[tokio::test]
async fn test_get_availability_past_date() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .get(&availability_path(&ctx))
        .add_query_param("date", "2026-10-31")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid date"));
}

#[tokio::test]
async fn test_get_availability_unknown_service() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .get(&format!(
            "/api/businesses/{}/services/{}/availability",
            ctx.business.id,
            Uuid::new_v4()
        ))
        .add_query_param("date", "2026-11-02")
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_availability_requires_date() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get(&availability_path(&ctx)).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
