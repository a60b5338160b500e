// ── Core error types ──
//
// User-facing errors from pifly-core. Consumers never match on raw HTTP
// details; the `From<pifly_api::Error>` impl translates transport-layer
// failures into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach device at {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("Coordinator is not running")]
    NotConnected,

    // ── Device errors (wrapped, not exposed raw) ─────────────────────
    #[error("Device error: {message}")]
    Api {
        message: String,
        /// HTTP status code returned by the device.
        status: Option<u16>,
    },

    #[error("Device returned malformed data from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` for failures that a later poll may recover from.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. } => true,
            Self::Api { status, .. } => status.is_some_and(|s| s >= 500),
            _ => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<pifly_api::Error> for CoreError {
    fn from(err: pifly_api::Error) -> Self {
        match err {
            pifly_api::Error::Transport {
                endpoint,
                status: None,
                message,
            } => CoreError::ConnectionFailed {
                endpoint,
                reason: message,
            },
            pifly_api::Error::Transport {
                endpoint,
                status: Some(status),
                message,
            } => CoreError::Api {
                message: format!("{endpoint}: {message}"),
                status: Some(status),
            },
            pifly_api::Error::Decode {
                endpoint,
                message,
                body: _,
            } => CoreError::Decode { endpoint, message },
            pifly_api::Error::UnsupportedFeature { endpoint } => CoreError::Api {
                message: format!("{endpoint} is not supported by this device"),
                status: None,
            },
            pifly_api::Error::InvalidArgument { field, reason } => CoreError::ValidationFailed {
                message: format!("{field}: {reason}"),
            },
            pifly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            pifly_api::Error::Client(message) => CoreError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_without_status_is_connection_failure() {
        let err: CoreError = pifly_api::Error::Transport {
            endpoint: "/api/current".into(),
            status: None,
            message: "request timed out".into(),
        }
        .into();

        assert!(matches!(err, CoreError::ConnectionFailed { .. }));
        assert!(err.is_transient());
    }

    #[test]
    fn http_status_is_preserved() {
        let err: CoreError = pifly_api::Error::Transport {
            endpoint: "/api/current".into(),
            status: Some(404),
            message: "HTTP 404 Not Found".into(),
        }
        .into();

        match err {
            CoreError::Api { status, ref message } => {
                assert_eq!(status, Some(404));
                assert!(message.starts_with("/api/current"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(!err.is_transient());
    }

    #[test]
    fn invalid_argument_becomes_validation_failure() {
        let err: CoreError = pifly_api::Error::InvalidArgument {
            field: "grams",
            reason: "must be a positive integer".into(),
        }
        .into();

        assert_eq!(
            err.to_string(),
            "Validation failed: grams: must be a positive integer"
        );
    }
}
