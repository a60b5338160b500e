//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use pifly_config::ConfigError;
use pifly_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach PiFire at {url}")]
    #[diagnostic(
        code(pifly::connection_failed),
        help(
            "Check that the controller is powered on and reachable.\n\
             Reason: {reason}\n\
             Try: pifly status --url http://<grill-ip>:8080"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Device ───────────────────────────────────────────────────────
    #[error("Device rejected the request: {message}")]
    #[diagnostic(code(pifly::device_error))]
    DeviceError { message: String, status: Option<u16> },

    #[error("Unexpected response from {endpoint}")]
    #[diagnostic(
        code(pifly::malformed_response),
        help(
            "{message}\n\
             Is the URL pointing at a PiFire controller?"
        )
    )]
    MalformedResponse { endpoint: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(pifly::validation))]
    Validation { field: String, reason: String },

    #[error("Refusing to {action} without confirmation")]
    #[diagnostic(code(pifly::confirm), help("Re-run with --yes to proceed."))]
    ConfirmationRequired { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(pifly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: pifly config init <url> --name {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(pifly::config))]
    Config(#[from] ConfigError),

    // ── Internal ─────────────────────────────────────────────────────
    #[error("I/O error: {0}")]
    #[diagnostic(code(pifly::io))]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    #[diagnostic(code(pifly::internal))]
    Internal(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::DeviceError {
                status: Some(404), ..
            }
            | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::ConfirmationRequired { .. } => exit_code::USAGE,
            Self::DeviceError { .. }
            | Self::MalformedResponse { .. }
            | Self::Config(_)
            | Self::Io(_)
            | Self::Internal(_) => exit_code::GENERAL,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { endpoint, reason } => {
                CliError::ConnectionFailed { url: endpoint, reason }
            }
            CoreError::Api { message, status } => CliError::DeviceError { message, status },
            CoreError::Decode { endpoint, message } => {
                CliError::MalformedResponse { endpoint, message }
            }
            // Core validation messages read "field: reason".
            CoreError::ValidationFailed { message } => match message.split_once(": ") {
                Some((field, reason)) => CliError::Validation {
                    field: field.into(),
                    reason: reason.into(),
                },
                None => CliError::Validation {
                    field: "argument".into(),
                    reason: message,
                },
            },
            CoreError::Config { message } => CliError::Validation {
                field: "device config".into(),
                reason: message,
            },
            CoreError::NotConnected => CliError::Internal("coordinator is not running".into()),
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_splits_into_field() {
        let err = CliError::from(CoreError::ValidationFailed {
            message: "grams: must be greater than zero".into(),
        });
        match &err {
            CliError::Validation { field, reason } => {
                assert_eq!(field, "grams");
                assert_eq!(reason, "must be greater than zero");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        let unreachable = CliError::from(CoreError::ConnectionFailed {
            endpoint: "http://grill/api/current".into(),
            reason: "connection refused".into(),
        });
        assert_eq!(unreachable.exit_code(), exit_code::CONNECTION);

        let missing = CliError::from(CoreError::Api {
            message: "/api/set/pmode/3: not found".into(),
            status: Some(404),
        });
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let busy = CliError::from(CoreError::Api {
            message: "overloaded".into(),
            status: Some(503),
        });
        assert_eq!(busy.exit_code(), exit_code::GENERAL);
    }
}
