use axum::{routing::post, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/maintenance/sweep", post(handlers::maintenance::run_sweep))
        .route(
            "/api/maintenance/payments/heal",
            post(handlers::maintenance::heal_payments),
        )
}
