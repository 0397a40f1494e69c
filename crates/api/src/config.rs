//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the pet-care
//! scheduling server. It retrieves configuration values from environment
//! variables and provides defaults where appropriate.
//!
//! ## Environment Variables
//!
//! The following environment variables are used:
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `RESERVATION_TIMEOUT_MS`: Statement timeout for booking writes (default: 5000)
//! - `SWEEP_INTERVAL_SECONDS`: Period of the in-process overdue sweep, 0 disables it (default: 3600)
//! - `NOTIFY_WEBHOOK_URL`: Endpoint that receives appointment events as JSON (optional)

use eyre::{Result, WrapErr};
use std::env;
use std::time::Duration;
use tracing::Level;

/// Configuration for the scheduling API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use petcare_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Upper bound on a single reservation write
    pub reservation_timeout: Duration,

    /// How often the background sweep runs; `None` when disabled
    pub sweep_interval: Option<Duration>,

    /// Webhook for appointment notifications (optional)
    pub notify_webhook_url: Option<String>,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - The API_PORT value cannot be parsed as a u16
    /// - RESERVATION_TIMEOUT_MS or SWEEP_INTERVAL_SECONDS is not a number
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        let log_level = log_level_from_env();

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|origins| {
            origins.split(',').map(|s| s.trim().to_string()).collect()
        });

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let reservation_timeout_ms: u64 = env::var("RESERVATION_TIMEOUT_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .wrap_err("Invalid RESERVATION_TIMEOUT_MS value")?;

        // Maintenance settings
        let sweep_interval_seconds: u64 = env::var("SWEEP_INTERVAL_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .wrap_err("Invalid SWEEP_INTERVAL_SECONDS value")?;
        let sweep_interval = (sweep_interval_seconds > 0).then(|| Duration::from_secs(sweep_interval_seconds));

        // Notification settings
        let notify_webhook_url = env::var("NOTIFY_WEBHOOK_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            reservation_timeout: Duration::from_millis(reservation_timeout_ms),
            sweep_interval,
            notify_webhook_url,
        })
    }

    /// Returns the server address as a string
    ///
    /// # Returns
    ///
    /// * `String` - Formatted server address (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Reads `LOG_LEVEL`, falling back to `INFO` for unset or unknown values.
pub fn log_level_from_env() -> Level {
    match env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()).as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
