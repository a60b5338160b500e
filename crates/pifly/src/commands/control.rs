//! Mode, hold, P-mode, priming, smoke plus, and system command handlers.
//!
//! Arguments are checked before connecting; the device is then polled
//! once, the command sent, and the refreshed status printed.

use pifly_core::{Command as CoreCommand, Coordinator, CoreError, DeviceConfig, Status};

use crate::cli::{GlobalOpts, HoldArgs, ModeArgs, PModeArgs, PrimeArgs, SmokePlusArgs, SystemArgs};
use crate::error::CliError;
use crate::output;

use super::status::render_line;

pub async fn mode(args: ModeArgs, config: DeviceConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let done = format!("Mode set to {}", args.mode);
    run(config, global, CoreCommand::SetMode(args.mode), &done).await
}

pub async fn p_mode(
    args: PModeArgs,
    config: DeviceConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let done = format!("P-mode set to {}", args.level);
    run(config, global, CoreCommand::SetPMode { level: args.level }, &done).await
}

pub async fn prime(args: PrimeArgs, config: DeviceConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let done = format!("Priming {} g, then {}", args.grams, args.next_mode);
    let cmd = CoreCommand::PrimePellets {
        grams: args.grams,
        next_mode: args.next_mode,
    };
    run(config, global, cmd, &done).await
}

pub async fn smoke_plus(
    args: SmokePlusArgs,
    config: DeviceConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let enabled = args.state.enabled();
    let done = format!("Smoke plus {}", if enabled { "enabled" } else { "disabled" });
    run(config, global, CoreCommand::SetSmokePlus { enabled }, &done).await
}

/// Hold needs the current status: the default target is the live
/// setpoint, and the accepted range depends on the grill's units.
pub async fn hold(args: HoldArgs, config: DeviceConfig, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(temp) = args.temperature {
        CoreCommand::SetHold { temp }.validate()?;
    }

    let (target, status) = Coordinator::oneshot(config, |c| async move {
        let current = c.current_status().ok_or(CoreError::NotConnected)?;
        let target = args.temperature.unwrap_or_else(|| current.hold_target());
        check_hold_range(&current, target)?;

        c.execute_and_refresh(CoreCommand::SetHold { temp: target })
            .await?;
        Ok((target, c.current_status()))
    })
    .await?;

    report(global, &format!("Holding at {target:.0}°"), status.as_deref());
    Ok(())
}

/// System commands may take the device down, so there is no refresh.
pub async fn system(args: SystemArgs, config: DeviceConfig, global: &GlobalOpts) -> Result<(), CliError> {
    if !args.yes {
        return Err(CliError::ConfirmationRequired {
            action: format!("{} the controller", args.command),
        });
    }

    let cmd = CoreCommand::System(args.command);
    Coordinator::oneshot(config, |c| async move { c.execute(cmd).await }).await?;

    if !global.quiet {
        eprintln!("✓ {} requested", args.command);
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────

fn check_hold_range(status: &Status, target: f64) -> Result<(), CoreError> {
    let (low, high) = status.temperature_bounds();
    if (low..=high).contains(&target) {
        Ok(())
    } else {
        Err(CoreError::ValidationFailed {
            message: format!(
                "temperature: {target} is outside {low}-{high} °{}",
                status.units
            ),
        })
    }
}

async fn run(
    config: DeviceConfig,
    global: &GlobalOpts,
    cmd: CoreCommand,
    done: &str,
) -> Result<(), CliError> {
    cmd.validate()?;
    tracing::debug!(command = cmd.name(), "sending command");

    let status = Coordinator::oneshot(config, |c| async move {
        c.execute_and_refresh(cmd).await?;
        Ok(c.current_status())
    })
    .await?;

    report(global, done, status.as_deref());
    Ok(())
}

fn report(global: &GlobalOpts, done: &str, status: Option<&Status>) {
    if global.quiet {
        return;
    }
    eprintln!("✓ {done}");
    if let Some(status) = status {
        output::print_output(&render_line(status, output::should_color(global.color)), false);
    }
}
