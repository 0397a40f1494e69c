use axum::body::to_bytes;
use axum::http::StatusCode;
use chrono::{NaiveDate, NaiveTime};
use petcare_api::middleware::error_handling::{log_level, map_error};
use petcare_core::errors::{InvalidTransition, SchedulingError, SlotConflict};
use petcare_core::models::appointment::{Actor, AppointmentStatus};
use petcare_core::models::slot::OccupiedInterval;
use rstest::rstest;
use serde_json::Value;
use tracing::Level;
use uuid::Uuid;

fn conflict() -> SchedulingError {
    let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    let quarter_past = NaiveTime::from_hms_opt(9, 15, 0).unwrap();
    SchedulingError::Conflict(SlotConflict {
        business_id: Uuid::new_v4(),
        date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
        requested: OccupiedInterval::new(quarter_past, 30),
        blocking: vec![OccupiedInterval::new(nine, 30)],
    })
}

fn invalid_transition() -> SchedulingError {
    SchedulingError::InvalidTransition(InvalidTransition {
        appointment_id: Uuid::new_v4(),
        from: AppointmentStatus::Cancelled,
        to: AppointmentStatus::Confirmed,
        actor: Actor::Business,
        reason: "appointment is already in a terminal status".to_string(),
    })
}

#[rstest]
#[case(SchedulingError::NotFound("Appointment not found".into()), StatusCode::NOT_FOUND)]
#[case(SchedulingError::InvalidDate("2026-10-01 is in the past".into()), StatusCode::BAD_REQUEST)]
#[case(SchedulingError::Validation("Invalid input".into()), StatusCode::BAD_REQUEST)]
#[case(conflict(), StatusCode::CONFLICT)]
#[case(invalid_transition(), StatusCode::CONFLICT)]
#[case(SchedulingError::Database(eyre::eyre!("Database error")), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(
    SchedulingError::Internal(Box::new(std::io::Error::new(std::io::ErrorKind::Other, "Internal error"))),
    StatusCode::INTERNAL_SERVER_ERROR
)]
#[tokio::test]
async fn test_error_status_mapping(#[case] error: SchedulingError, #[case] expected: StatusCode) {
    let response = map_error(error);
    assert_eq!(response.status(), expected);
}

#[rstest]
#[case(SchedulingError::NotFound("Pet not found".into()), Level::DEBUG)]
#[case(SchedulingError::InvalidDate("2026-10-01 is in the past".into()), Level::DEBUG)]
#[case(SchedulingError::Validation("Invalid input".into()), Level::DEBUG)]
#[case(conflict(), Level::DEBUG)]
#[case(invalid_transition(), Level::ERROR)]
#[case(SchedulingError::Database(eyre::eyre!("pool timed out")), Level::ERROR)]
fn test_log_level_separates_user_errors(#[case] error: SchedulingError, #[case] expected: Level) {
    assert_eq!(log_level(&error), expected);
    assert_eq!(error.is_user_error(), expected == Level::DEBUG);
}

#[tokio::test]
async fn test_conflict_body_lists_blocking_intervals() {
    let response = map_error(conflict());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert!(json["error"].as_str().unwrap().starts_with("Slot conflict"));
    assert_eq!(json["conflict"]["requested"]["start"], "09:15");
    assert_eq!(json["conflict"]["blocking"][0]["start"], "09:00");
    assert_eq!(json["conflict"]["blocking"][0]["duration_minutes"], 30);
}

#[tokio::test]
async fn test_invalid_transition_body_names_statuses() {
    let response = map_error(invalid_transition());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["transition"]["from"], "cancelled");
    assert_eq!(json["transition"]["to"], "confirmed");
    assert_eq!(json["transition"]["actor"], "business");
}
