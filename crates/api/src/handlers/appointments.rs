use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use petcare_core::{
    errors::SchedulingError,
    models::appointment::{Actor, Appointment, ReserveAppointmentRequest, TransitionRequest},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Reserves a slot for a pet
///
/// # Endpoint
///
/// ```text
/// POST /api/businesses/:business_id/appointments
/// ```
///
/// # Returns
///
/// `201 Created` with the pending appointment, or `409 Conflict` with the
/// blocking intervals when another booking got the slot first.
#[axum::debug_handler]
pub async fn reserve_appointment(
    State(state): State<Arc<ApiState>>,
    Path(business_id): Path<Uuid>,
    Json(payload): Json<ReserveAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment = state.scheduler.reserve(business_id, payload).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state.scheduler.appointment(id).await?;
    Ok(Json(appointment))
}

/// Moves an appointment to a new status
///
/// # Endpoint
///
/// ```text
/// POST /api/appointments/:id/status
/// {"status": "confirmed", "actor": "business"}
/// ```
///
/// # Errors
///
/// * `SchedulingError::NotFound` - Unknown appointment
/// * `SchedulingError::InvalidTransition` - Change not allowed for this actor or status
/// * `SchedulingError::Validation` - The maintenance actor was requested over HTTP
#[axum::debug_handler]
pub async fn transition_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionRequest>,
) -> Result<Json<Appointment>, AppError> {
    if payload.actor == Actor::Maintenance {
        return Err(AppError(SchedulingError::Validation(
            "The maintenance actor is reserved for the overdue sweep".to_string(),
        )));
    }

    let appointment = state
        .scheduler
        .transition(id, payload.status, payload.actor, payload.reason)
        .await?;

    Ok(Json(appointment))
}
