// Control endpoints
//
// Mode changes, hold setpoint, P-mode, pellet priming, smoke plus, and
// system commands. Arguments are validated before any request is sent;
// nothing here retries.

use reqwest::Method;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::debug;

use crate::client::PiFireClient;
use crate::error::Error;

/// Highest P-mode level the firmware accepts.
pub const MAX_P_MODE: u8 = 9;

/// Modes reachable through `/api/set/mode/{mode}`.
///
/// Hold is excluded: it needs a setpoint and has its own endpoint
/// ([`PiFireClient::set_hold_mode`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ModeRequest {
    Stop,
    Startup,
    Smoke,
    Monitor,
    Shutdown,
}

/// Mode the device switches to once pellet priming finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PrimeNextMode {
    #[default]
    Stop,
    Startup,
    Smoke,
    Hold,
}

/// Host-level commands posted to `/api/cmd/{command}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SystemCommand {
    /// Restart the PiFire application.
    Restart,
    /// Reboot the controller host.
    Reboot,
    /// Power the controller host off.
    Shutdown,
}

// ── Argument checks ──────────────────────────────────────────────────
//
// Run by the client before every request; public so callers can reject
// bad input before touching the network at all.

pub fn validate_hold_temp(temp: f64) -> Result<(), Error> {
    if !temp.is_finite() || temp <= 0.0 {
        return Err(Error::InvalidArgument {
            field: "temperature",
            reason: format!("expected a positive temperature, got {temp}"),
        });
    }
    Ok(())
}

pub fn validate_p_mode(level: u8) -> Result<(), Error> {
    if level > MAX_P_MODE {
        return Err(Error::InvalidArgument {
            field: "p_mode",
            reason: format!("expected 0-{MAX_P_MODE}, got {level}"),
        });
    }
    Ok(())
}

pub fn validate_prime_grams(grams: u32) -> Result<(), Error> {
    if grams == 0 {
        return Err(Error::InvalidArgument {
            field: "grams",
            reason: "must be a positive integer".into(),
        });
    }
    Ok(())
}

impl PiFireClient {
    /// Switch operating mode.
    ///
    /// `GET /api/set/mode/{mode}`
    pub async fn set_mode(&self, mode: ModeRequest) -> Result<(), Error> {
        debug!(%mode, "setting mode");
        self.send_command(Method::GET, &format!("/api/set/mode/{mode}"))
            .await
    }

    /// Enter hold mode at the given target temperature.
    ///
    /// `GET /api/set/mode/hold/{temp}`. The device takes whole degrees,
    /// so the value is rounded.
    pub async fn set_hold_mode(&self, temp: f64) -> Result<(), Error> {
        validate_hold_temp(temp)?;
        debug!(temp, "entering hold mode");
        self.send_command(Method::GET, &format!("/api/set/mode/hold/{temp:.0}"))
            .await
    }

    /// Select a P-mode profile (0–9).
    ///
    /// `GET /api/set/pmode/{level}`
    pub async fn set_p_mode(&self, level: u8) -> Result<(), Error> {
        validate_p_mode(level)?;
        debug!(level, "setting P-mode");
        self.send_command(Method::GET, &format!("/api/set/pmode/{level}"))
            .await
    }

    /// Feed `grams` of pellets, then switch to `next_mode`.
    ///
    /// `GET /api/set/mode/prime/{grams}/{next_mode}`
    pub async fn prime_pellets(&self, grams: u32, next_mode: PrimeNextMode) -> Result<(), Error> {
        validate_prime_grams(grams)?;
        debug!(grams, %next_mode, "priming pellets");
        self.send_command(
            Method::GET,
            &format!("/api/set/mode/prime/{grams}/{next_mode}"),
        )
        .await
    }

    /// Toggle smoke plus.
    ///
    /// `GET /api/set/smokeplus/{true|false}`
    pub async fn set_smoke_plus(&self, enabled: bool) -> Result<(), Error> {
        debug!(enabled, "setting smoke plus");
        self.send_command(Method::GET, &format!("/api/set/smokeplus/{enabled}"))
            .await
    }

    /// Restart, reboot, or shut down the controller host.
    ///
    /// `POST /api/cmd/{command}`
    pub async fn system_command(&self, command: SystemCommand) -> Result<(), Error> {
        debug!(%command, "sending system command");
        self.send_command(Method::POST, &format!("/api/cmd/{command}"))
            .await
    }
}
