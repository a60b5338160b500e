//! Shared configuration for pifly front ends.
//!
//! TOML profiles merged with `PIFLY_`-prefixed environment variables, and
//! translation to `pifly_core::DeviceConfig`. The CLI layers its own flag
//! overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pifly_core::{
    DEFAULT_DEVICE_URL, DeviceConfig, FAST_POLL_INTERVAL, SLOW_POLL_INTERVAL,
};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    /// Global defaults, applied to every profile.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_fast_interval")]
    pub fast_interval_secs: u64,

    #[serde(default = "default_slow_interval")]
    pub slow_interval_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout_secs: default_timeout(),
            fast_interval_secs: default_fast_interval(),
            slow_interval_secs: default_slow_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    pifly_core::config::DEFAULT_TIMEOUT.as_secs()
}
fn default_fast_interval() -> u64 {
    FAST_POLL_INTERVAL.as_secs()
}
fn default_slow_interval() -> u64 {
    SLOW_POLL_INTERVAL.as_secs()
}

/// A named device profile. Unset fields inherit from [`Defaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Device base URL (e.g., "http://192.168.1.50:8080").
    pub url: String,

    /// Per-request timeout.
    pub timeout_secs: Option<u64>,

    /// Poll interval while cooking.
    pub fast_interval_secs: Option<u64>,

    /// Poll interval while idle.
    pub slow_interval_secs: Option<u64>,
}

impl Profile {
    /// A profile pointing at `url` with every other field inherited.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Fill unset fields from `defaults`.
    pub fn with_defaults(&self, defaults: &Defaults) -> Self {
        Self {
            url: self.url.clone(),
            timeout_secs: self.timeout_secs.or(Some(defaults.timeout_secs)),
            fast_interval_secs: self.fast_interval_secs.or(Some(defaults.fast_interval_secs)),
            slow_interval_secs: self.slow_interval_secs.or(Some(defaults.slow_interval_secs)),
        }
    }

    /// Build a validated `DeviceConfig`. Fields still unset fall back to
    /// the built-in defaults.
    pub fn to_device_config(&self) -> Result<DeviceConfig, ConfigError> {
        let url: url::Url = self.url.trim().parse().map_err(|_| ConfigError::Validation {
            field: "url".into(),
            reason: format!("invalid URL: {}", self.url),
        })?;

        let mut config = DeviceConfig::new(url);
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.fast_interval_secs {
            config.fast_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.slow_interval_secs {
            config.slow_interval = Duration::from_secs(secs);
        }

        config.validate().map_err(|e| ConfigError::Validation {
            field: "profile".into(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }
}

impl Config {
    /// Look up a profile by name (or the default profile) with defaults
    /// applied.
    ///
    /// With no profiles configured at all, the default profile name
    /// resolves to the well-known `pifire.local` address.
    pub fn resolve_profile(&self, name: Option<&str>) -> Result<(String, Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());

        let profile = match self.profiles.get(&name) {
            Some(profile) => profile.clone(),
            None if self.profiles.is_empty() && name == "default" => {
                Profile::new(DEFAULT_DEVICE_URL)
            }
            None => return Err(ConfigError::ProfileNotFound { name }),
        };

        Ok((name, profile.with_defaults(&self.defaults)))
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "pifly", "pifly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("pifly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file is not an error.
///
/// Environment keys use `__` for nesting, e.g.
/// `PIFLY_PROFILES__SMOKER__URL=http://10.0.0.7`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PIFLY_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
