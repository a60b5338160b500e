//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod control;
pub mod status;
pub mod watch;

use pifly_core::DeviceConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: DeviceConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(config, global).await,
        Command::Sensors => status::sensors(config, global).await,
        Command::Watch(args) => watch::handle(args, config, global).await,
        Command::Mode(args) => control::mode(args, config, global).await,
        Command::Hold(args) => control::hold(args, config, global).await,
        Command::PMode(args) => control::p_mode(args, config, global).await,
        Command::Prime(args) => control::prime(args, config, global).await,
        Command::SmokePlus(args) => control::smoke_plus(args, config, global).await,
        Command::System(args) => control::system(args, config, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
