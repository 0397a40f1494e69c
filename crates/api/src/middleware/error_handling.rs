//! # Error Handling Middleware
//!
//! Maps [`SchedulingError`] to HTTP status codes and JSON error bodies so
//! every handler reports failures the same way.
//!
//! | Error | Status |
//! |-------|--------|
//! | `NotFound` | 404 |
//! | `InvalidDate`, `Validation` | 400 |
//! | `Conflict` | 409, body carries the blocking intervals |
//! | `InvalidTransition` | 409 |
//! | `Database`, `Internal` | 500 |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use petcare_core::errors::SchedulingError;
use serde_json::json;
use tracing::Level;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use petcare_api::middleware::error_handling::AppError;
/// use petcare_core::errors::SchedulingError;
///
/// async fn handler(found: bool) -> Result<Json<&'static str>, AppError> {
///     if !found {
///         return Err(AppError(SchedulingError::NotFound("Appointment not found".into())));
///     }
///     Ok(Json("ok"))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub SchedulingError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SchedulingError::NotFound(_) => StatusCode::NOT_FOUND,
            SchedulingError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            SchedulingError::Validation(_) => StatusCode::BAD_REQUEST,
            SchedulingError::Conflict(_) => StatusCode::CONFLICT,
            SchedulingError::InvalidTransition(_) => StatusCode::CONFLICT,
            SchedulingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SchedulingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if log_level(&self.0) == Level::ERROR {
            tracing::error!("Request failed: {:?}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }

        let message = self.0.to_string();
        let body = match &self.0 {
            SchedulingError::Conflict(conflict) => json!({ "error": message, "conflict": conflict }),
            SchedulingError::InvalidTransition(rejected) => {
                json!({ "error": message, "transition": rejected })
            }
            _ => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Level a failed request is logged at. Caller mistakes stay at debug;
/// rejected status changes and infrastructure failures are errors.
pub fn log_level(err: &SchedulingError) -> Level {
    if err.is_user_error() {
        Level::DEBUG
    } else {
        Level::ERROR
    }
}

/// Allows `?` on `SchedulingResult` inside handlers.
impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        AppError(err)
    }
}

/// Wraps adapter errors as `SchedulingError::Database`.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(SchedulingError::Database(err))
    }
}

/// Maps a SchedulingError to an HTTP response
pub fn map_error(err: SchedulingError) -> Response {
    AppError(err).into_response()
}
