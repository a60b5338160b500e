//! Profile resolution for the CLI.
//!
//! File and environment loading live in `pifly-config`; this module layers
//! the global `--profile`, `--url` and `--timeout` flags on top.

use std::time::Duration;

pub use pifly_config::{Config, Profile, config_path, load_config_or_default, save_config};
use pifly_config::ConfigError;
use pifly_core::DeviceConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Profile named by `--profile`, else the config's default, else "default".
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names for help text.
pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Resolve the active profile and apply CLI overrides.
///
/// A `--url` with no matching profile is enough on its own: the device is
/// then polled with the configured defaults.
pub fn resolve_profile(global: &GlobalOpts, cfg: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, cfg);

    let (name, mut profile) = match cfg.resolve_profile(Some(&name)) {
        Ok(resolved) => resolved,
        Err(ConfigError::ProfileNotFound { name }) => {
            let Some(url) = global.url.as_deref() else {
                return Err(CliError::ProfileNotFound {
                    available: available_profiles(cfg),
                    name,
                });
            };
            (name, Profile::new(url).with_defaults(&cfg.defaults))
        }
        Err(other) => return Err(other.into()),
    };

    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if let Some(secs) = global.timeout {
        profile.timeout_secs = Some(secs);
    }
    Ok((name, profile))
}

/// Build a `DeviceConfig` from the config file, profile, and CLI overrides.
pub fn build_device_config(global: &GlobalOpts) -> Result<DeviceConfig, CliError> {
    let cfg = load_config_or_default();
    let (name, profile) = resolve_profile(global, &cfg)?;
    tracing::debug!(profile = %name, url = %profile.url, "resolved device profile");

    profile.to_device_config().map_err(|err| match err {
        ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
        other => other.into(),
    })
}

/// Parse a whole number of seconds for `config set`.
pub fn parse_secs(field: &str, value: &str) -> Result<u64, CliError> {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(CliError::Validation {
            field: field.into(),
            reason: format!("expected a positive number of seconds, got '{value}'"),
        }),
        Ok(secs) => Ok(secs),
    }
}

/// Apply a `--fast-interval` / `--slow-interval` override.
pub fn override_interval(
    field: &str,
    target: &mut Duration,
    value: Option<humantime::Duration>,
) -> Result<(), CliError> {
    let Some(value) = value else {
        return Ok(());
    };
    let value: Duration = value.into();
    if value.is_zero() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "interval must be greater than zero".into(),
        });
    }
    *target = value;
    Ok(())
}
