use thiserror::Error;

/// Top-level error type for the `pifly-api` crate.
///
/// Covers every failure mode of a single device call: transport,
/// body decoding, argument validation, and client construction.
/// `pifly-core` maps these into domain-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Network failure, timeout, or a non-2xx response.
    ///
    /// `status` is present only when the device actually answered.
    #[error("{endpoint}: {message}")]
    Transport {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    /// Invalid base URL or endpoint path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Building the underlying `reqwest::Client` failed.
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    // ── Data ────────────────────────────────────────────────────────
    /// The body was not valid JSON, with the raw body for debugging.
    #[error("{endpoint}: malformed JSON: {message}")]
    Decode {
        endpoint: String,
        message: String,
        body: String,
    },

    /// Endpoint not available on this firmware. Only produced for the
    /// hopper endpoint and converted to an empty result before it
    /// reaches callers.
    #[error("{endpoint}: not supported by this device")]
    UnsupportedFeature { endpoint: String },

    // ── Validation ──────────────────────────────────────────────────
    /// Rejected locally before any request was sent.
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },
}

impl Error {
    /// Wrap a `reqwest` failure for the given endpoint.
    pub(crate) fn transport(endpoint: &str, err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_owned()
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        Self::Transport {
            endpoint: endpoint.to_owned(),
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }

    /// HTTP status code of the device response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns `true` if retrying the same call later might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { status: None, .. } => true,
            Self::Transport {
                status: Some(code), ..
            } => *code >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the device answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        let no_response = Error::Transport {
            endpoint: "/api/current".into(),
            status: None,
            message: "request timed out".into(),
        };
        assert!(no_response.is_transient());

        let server_error = Error::Transport {
            endpoint: "/api/current".into(),
            status: Some(502),
            message: "HTTP 502".into(),
        };
        assert!(server_error.is_transient());

        let not_found = Error::Transport {
            endpoint: "/api/hopper".into(),
            status: Some(404),
            message: "HTTP 404".into(),
        };
        assert!(!not_found.is_transient());
        assert!(not_found.is_not_found());

        let bad_arg = Error::InvalidArgument {
            field: "grams",
            reason: "must be positive".into(),
        };
        assert!(!bad_arg.is_transient());
        assert_eq!(bad_arg.status(), None);
    }

    #[test]
    fn display_includes_endpoint() {
        let err = Error::Decode {
            endpoint: "/api/current".into(),
            message: "expected value at line 1".into(),
            body: "<html>".into(),
        };
        assert_eq!(
            err.to_string(),
            "/api/current: malformed JSON: expected value at line 1"
        );
    }
}
