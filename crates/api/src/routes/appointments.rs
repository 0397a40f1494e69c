use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/businesses/:business_id/appointments",
            post(handlers::appointments::reserve_appointment),
        )
        .route("/api/appointments/:id", get(handlers::appointments::get_appointment))
        .route(
            "/api/appointments/:id/status",
            post(handlers::appointments::transition_appointment),
        )
}
