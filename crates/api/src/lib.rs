//! # Pet-Care Scheduling API
//!
//! The API crate provides the web server for the pet-care appointment
//! scheduling service. It exposes availability lookups, reservations,
//! appointment lifecycle changes and maintenance triggers over HTTP.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate HTTP requests into [`Scheduler`] calls
//! - **Middleware**: Map scheduling errors onto HTTP responses
//! - **Notifications**: Deliver appointment events off the request path
//! - **Background**: Periodic overdue sweep and payment healing
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework. Storage is reached only through
//! the ports in `petcare_core::ports`, so the same router runs against
//! Postgres in production and in-memory adapters in tests.

/// Periodic maintenance jobs
pub mod background;
/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Error mapping
pub mod middleware;
/// Appointment event delivery
pub mod notifications;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, http::StatusCode, BoxError, Router};
use eyre::Result;
use petcare_core::ports::PaymentStore;
use petcare_core::Scheduler;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(ApiState { scheduler, payments });
/// let app = build_router(state);
/// ```
pub struct ApiState {
    /// Scheduling service wired to the ledger, catalog, clock and event sink
    pub scheduler: Arc<Scheduler>,
    /// Payment records, used by the healing job
    pub payments: Arc<dyn PaymentStore>,
}

/// Installs the global `tracing` subscriber.
pub fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Builds the application router with every route and the trace layer.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Slot availability endpoints
        .merge(routes::availability::routes())
        // Reservation and lifecycle endpoints
        .merge(routes::appointments::routes())
        // Maintenance triggers
        .merge(routes::maintenance::routes())
        // Attach shared state to all routes
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Starts the API server with the provided configuration and state
///
/// # Arguments
///
/// * `config` - API configuration including host, port, and other settings
/// * `state` - Scheduler and adapters shared by all handlers
///
/// # Example
///
/// ```ignore
/// let config = ApiConfig::from_env()?;
/// start_server(config, state).await?;
/// ```
pub async fn start_server(config: config::ApiConfig, state: Arc<ApiState>) -> Result<()> {
    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let allowed = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {}", origin);
                    None
                }
            })
            .collect::<Vec<_>>();

        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(allowed)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(HandleErrorLayer::new(|_: BoxError| async {
                StatusCode::REQUEST_TIMEOUT
            }))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
