use axum::{extract::State, Json};
use petcare_core::{models::maintenance::SweepReport, scheduling::maintenance::heal_paid_payments};
use std::sync::Arc;

use crate::{middleware::error_handling::AppError, ApiState};

/// Runs the overdue appointment sweep now
///
/// # Endpoint
///
/// ```text
/// POST /api/maintenance/sweep
/// ```
///
/// # Returns
///
/// `{"processed": n, "failed": m}`. Per-appointment failures are counted,
/// not returned as errors.
#[axum::debug_handler]
pub async fn run_sweep(State(state): State<Arc<ApiState>>) -> Result<Json<SweepReport>, AppError> {
    let now = state.scheduler.now();
    let report = state.scheduler.sweep_overdue_appointments(now).await?;
    Ok(Json(report))
}

/// Stamps `paid_at` on paid payments that lack it
#[axum::debug_handler]
pub async fn heal_payments(State(state): State<Arc<ApiState>>) -> Result<Json<SweepReport>, AppError> {
    let now = state.scheduler.now();
    let report = heal_paid_payments(state.payments.as_ref(), now).await?;
    Ok(Json(report))
}
