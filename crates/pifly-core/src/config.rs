// ── Runtime device configuration ──
//
// Describes *which* device to poll and how often. Never touches disk:
// the CLI (or any embedding application) builds a `DeviceConfig` and
// hands it to the coordinator.

use std::time::Duration;

use url::Url;

use crate::error::CoreError;

pub use pifly_api::DEFAULT_TIMEOUT;

/// Base URL used when nothing else is configured.
pub const DEFAULT_DEVICE_URL: &str = "http://pifire.local:8080";

/// Poll interval while the grill is actively cooking.
pub const FAST_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Poll interval while the grill is idle.
pub const SLOW_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for polling a single PiFire device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Device root, e.g. `http://192.168.1.50:8080`.
    pub url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Interval used while a cook is active (startup, smoke, monitor, hold).
    pub fast_interval: Duration,
    /// Interval used otherwise.
    pub slow_interval: Duration,
}

impl DeviceConfig {
    /// Config for `url` with default timeout and intervals.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: DEFAULT_TIMEOUT,
            fast_interval: FAST_POLL_INTERVAL,
            slow_interval: SLOW_POLL_INTERVAL,
        }
    }

    /// Parse `raw` as the device base URL.
    pub fn from_url_str(raw: &str) -> Result<Self, CoreError> {
        let url = Url::parse(raw.trim()).map_err(|e| CoreError::Config {
            message: format!("invalid device URL '{raw}': {e}"),
        })?;
        let config = Self::new(url);
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the coordinator relies on.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !matches!(self.url.scheme(), "http" | "https") || self.url.host_str().is_none() {
            return Err(CoreError::Config {
                message: format!("device URL must be http(s)://host[:port], got '{}'", self.url),
            });
        }
        if self.timeout.is_zero() {
            return Err(CoreError::Config {
                message: "timeout must be greater than zero".into(),
            });
        }
        if self.fast_interval.is_zero() || self.slow_interval.is_zero() {
            return Err(CoreError::Config {
                message: "poll intervals must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_device_behaviour() {
        let config = DeviceConfig::from_url_str(DEFAULT_DEVICE_URL).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.fast_interval, Duration::from_secs(5));
        assert_eq!(config.slow_interval, Duration::from_secs(30));
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(matches!(
            DeviceConfig::from_url_str("ftp://grill"),
            Err(CoreError::Config { .. })
        ));
        assert!(DeviceConfig::from_url_str("grill.local").is_err());
    }

    #[test]
    fn rejects_zero_intervals() {
        let mut config = DeviceConfig::from_url_str("http://10.0.0.5").unwrap();
        config.fast_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
