//! # Availability Handlers
//!
//! Serves the open slot starts of one service on one date. Reading
//! availability never writes anything, so repeated calls with no booking in
//! between return the same list.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use petcare_core::models::availability::{AvailabilityQuery, AvailabilityResponse};
use std::sync::Arc;
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Lists bookable slot starts
///
/// # Endpoint
///
/// ```text
/// GET /api/businesses/:business_id/services/:service_id/availability?date=2026-11-02
/// ```
///
/// # Errors
///
/// * `SchedulingError::NotFound` - Unknown or inactive business or service
/// * `SchedulingError::InvalidDate` - Date before the business-local today
/// * `SchedulingError::Database` - Database error
#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<ApiState>>,
    Path((business_id, service_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let response = state
        .scheduler
        .availability(business_id, service_id, query.date)
        .await?;

    Ok(Json(response))
}
