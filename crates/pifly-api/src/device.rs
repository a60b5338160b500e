// Status endpoints
//
// Read-only views of the device: the combined status/temperature payload
// and the optional pellet hopper report.

use serde_json::Value;
use tracing::debug;

use crate::client::PiFireClient;
use crate::error::Error;

pub(crate) const CURRENT_PATH: &str = "/api/current";
pub(crate) const HOPPER_PATH: &str = "/api/hopper";

impl PiFireClient {
    /// Fetch the primary status + temperature payload.
    ///
    /// `GET /api/current`
    ///
    /// Returns loosely-typed JSON because field types and section names
    /// vary by firmware version.
    pub async fn fetch_status(&self) -> Result<Value, Error> {
        self.get_json(CURRENT_PATH).await
    }

    /// Fetch the pellet hopper report, if the firmware provides one.
    ///
    /// `GET /api/hopper`
    ///
    /// Many firmware versions lack this endpoint, so every failure is
    /// treated as "unsupported" and yields `None` rather than an error.
    pub async fn fetch_hopper(&self) -> Option<Value> {
        match self.try_fetch_hopper().await {
            Ok(hopper) => Some(hopper),
            Err(e) => {
                debug!(error = %e, "hopper report unavailable");
                None
            }
        }
    }

    async fn try_fetch_hopper(&self) -> Result<Value, Error> {
        let value = self.get_json(HOPPER_PATH).await.map_err(|e| {
            debug!(error = %e, "hopper request failed");
            Error::UnsupportedFeature {
                endpoint: HOPPER_PATH.to_owned(),
            }
        })?;

        // Some builds answer 200 with `null` or a bare error string.
        if value.is_object() {
            Ok(value)
        } else {
            Err(Error::UnsupportedFeature {
                endpoint: HOPPER_PATH.to_owned(),
            })
        }
    }
}
