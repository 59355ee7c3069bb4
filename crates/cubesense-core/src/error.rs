// ── Core error types ──
//
// User-facing errors from cubesense-core. Consumers never see HTTP
// status codes or JSON parse failures directly: the
// `From<cubesense_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use std::time::Duration;

use thiserror::Error;

use crate::cache::CacheError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the sensor cloud: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// `timeout` is the per-call deadline that fired, or `None` when the
    /// HTTP client's own timeout cut the request short.
    #[error("Sensor cloud call timed out{}", elapsed(.timeout.as_ref()))]
    Timeout { timeout: Option<Duration> },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Cache errors ─────────────────────────────────────────────────
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<cubesense_api::Error> for CoreError {
    fn from(err: cubesense_api::Error) -> Self {
        match err {
            cubesense_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            cubesense_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout: None }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            cubesense_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            cubesense_api::Error::ClientBuild(message) => CoreError::Config { message },
            cubesense_api::Error::RateLimited { retry_after_secs } => CoreError::Api {
                message: format!("Rate limited -- retry after {retry_after_secs}s"),
                status: Some(429),
            },
            cubesense_api::Error::Api { status: 404, message } => CoreError::DeviceNotFound {
                identifier: message,
            },
            cubesense_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            cubesense_api::Error::Deserialization { message, .. } => CoreError::Api {
                message: format!("unexpected response: {message}"),
                status: None,
            },
        }
    }
}

fn elapsed(timeout: Option<&Duration>) -> String {
    match timeout {
        Some(limit) if limit.subsec_nanos() == 0 => format!(" after {}s", limit.as_secs()),
        Some(limit) => format!(" after {}ms", limit.as_millis()),
        None => String::new(),
    }
}
