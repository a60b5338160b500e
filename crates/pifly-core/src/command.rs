// ── Command API ──
//
// Every write operation against the device is a `Command` variant. The
// coordinator hands them straight to the client: they run on the caller's
// task, alongside polling, and are never retried.

use pifly_api::control::{validate_hold_temp, validate_p_mode, validate_prime_grams};
use pifly_api::{ModeRequest, PiFireClient, PrimeNextMode, SystemCommand};
use tracing::debug;

use crate::error::CoreError;

/// All write operations against a PiFire device.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Switch to a mode that needs no arguments.
    SetMode(ModeRequest),
    /// Enter hold at a target temperature, in the device's units.
    SetHold { temp: f64 },
    /// Select a P-mode level, 0–9.
    SetPMode { level: u8 },
    /// Feed pellets, then move to `next_mode`.
    PrimePellets { grams: u32, next_mode: PrimeNextMode },
    SetSmokePlus { enabled: bool },
    /// Restart, reboot, or power off the controller host.
    System(SystemCommand),
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetMode(_) => "set_mode",
            Self::SetHold { .. } => "set_hold",
            Self::SetPMode { .. } => "set_p_mode",
            Self::PrimePellets { .. } => "prime_pellets",
            Self::SetSmokePlus { .. } => "set_smoke_plus",
            Self::System(_) => "system",
        }
    }
    /// Check arguments without contacting the device. The client runs the
    /// same checks before sending, so this only lets callers fail early.
    pub fn validate(&self) -> Result<(), CoreError> {
        match *self {
            Self::SetHold { temp } => validate_hold_temp(temp)?,
            Self::SetPMode { level } => validate_p_mode(level)?,
            Self::PrimePellets { grams, .. } => validate_prime_grams(grams)?,
            Self::SetMode(_) | Self::SetSmokePlus { .. } | Self::System(_) => {}
        }
        Ok(())
    }
}

pub(crate) async fn route_command(client: &PiFireClient, cmd: Command) -> Result<(), CoreError> {
    debug!(command = cmd.name(), "executing command");
    match cmd {
        Command::SetMode(mode) => client.set_mode(mode).await?,
        Command::SetHold { temp } => client.set_hold_mode(temp).await?,
        Command::SetPMode { level } => client.set_p_mode(level).await?,
        Command::PrimePellets { grams, next_mode } => {
            client.prime_pellets(grams, next_mode).await?;
        }
        Command::SetSmokePlus { enabled } => client.set_smoke_plus(enabled).await?,
        Command::System(command) => client.system_command(command).await?,
    }
    Ok(())
}
