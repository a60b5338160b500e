// PiFire HTTP client
//
// Wraps `reqwest::Client` with base-URL handling, lenient JSON decoding,
// and uniform error mapping. Endpoint groups (status reads, control
// commands) are implemented as inherent methods in separate files to
// keep this module focused on transport mechanics.

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Longest body excerpt carried in error messages.
const BODY_PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for a single PiFire device.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted.
/// All reads return loosely-typed JSON; normalization happens in
/// `pifly-core`.
#[derive(Clone)]
pub struct PiFireClient {
    http: reqwest::Client,
    /// Device root with any trailing slash removed, e.g. `http://pifire.local:8080`.
    base: String,
}

impl std::fmt::Debug for PiFireClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PiFireClient")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl PiFireClient {
    /// Create a client from a base URL string and transport settings.
    ///
    /// The URL must carry scheme, host, and (optionally) port. A trailing
    /// slash is trimmed.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let url = parse_base_url(base_url)?;
        let http = transport.build_client()?;
        Ok(Self::with_client(http, &url))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &Url) -> Self {
        Self {
            http,
            base: base_url.as_str().trim_end_matches('/').to_owned(),
        }
    }

    /// The normalized device base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build the absolute URL for an `/api/...` path.
    pub(crate) fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!("{}{path}", self.base);
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the body as JSON.
    ///
    /// The declared content type is ignored: the device is known to
    /// label JSON responses as `text/html`.
    pub(crate) async fn get_json(&self, path: &str) -> Result<Value, Error> {
        let url = self.endpoint_url(path)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(path, &e))?;

        let body = read_success_body(path, resp).await?;
        serde_json::from_str(&body).map_err(|e| Error::Decode {
            endpoint: path.to_owned(),
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }

    /// Send a control request, discarding whatever the device answers.
    pub(crate) async fn send_command(&self, method: Method, path: &str) -> Result<(), Error> {
        let url = self.endpoint_url(path)?;
        debug!("{} {}", method, url);

        let resp = self
            .http
            .request(method, url)
            .send()
            .await
            .map_err(|e| Error::transport(path, &e))?;

        let body = read_success_body(path, resp).await?;
        trace!(endpoint = path, body = preview(&body), "command accepted");
        Ok(())
    }
}

/// Parse and sanity-check a device base URL.
fn parse_base_url(raw: &str) -> Result<Url, Error> {
    let url = Url::parse(raw.trim().trim_end_matches('/'))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(Error::InvalidArgument {
            field: "base_url",
            reason: format!("'{raw}' has no host"),
        });
    }
    Ok(url)
}

/// Fail with `Error::Transport` on non-2xx, otherwise return the body text.
async fn read_success_body(endpoint: &str, resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Transport {
            endpoint: endpoint.to_owned(),
            status: Some(status.as_u16()),
            message: format!("HTTP {status}: {}", preview(&body)),
        });
    }

    resp.text().await.map_err(|e| Error::transport(endpoint, &e))
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
