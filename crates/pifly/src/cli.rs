//! Clap derive structures for the `pifly` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

use pifly_core::{ModeRequest, PrimeNextMode, SystemCommand};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// pifly -- watch and drive a PiFire grill from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "pifly",
    version,
    about = "Monitor and control PiFire pellet grills",
    long_about = "Polls a PiFire controller over its local HTTP API.\n\n\
        Status is normalized across firmware versions; polling speeds up\n\
        while a cook is active and slows down when the grill is idle.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device profile to use
    #[arg(long, short = 'p', env = "PIFLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device URL (overrides profile)
    #[arg(long, short = 'u', env = "PIFLY_URL", global = true)]
    pub url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PIFLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "PIFLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable view (default)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Bare values, one per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Color when stdout is a terminal and NO_COLOR is unset
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Self::On
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the current grill status
    #[command(alias = "st")]
    Status,

    /// Follow status updates until interrupted
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// List the sensors the device exposes
    Sensors,

    /// Switch operating mode (stop, startup, smoke, monitor, shutdown)
    Mode(ModeArgs),

    /// Hold at a target temperature
    Hold(HoldArgs),

    /// Set the P-mode level (0-9)
    #[command(name = "pmode")]
    PMode(PModeArgs),

    /// Feed pellets into the fire pot, then switch mode
    Prime(PrimeArgs),

    /// Turn Smoke Plus on or off
    SmokePlus(SmokePlusArgs),

    /// Restart PiFire, or reboot / power off the controller host
    System(SystemArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Monitoring ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many updates
    #[arg(long, short = 'n')]
    pub count: Option<usize>,

    /// Poll interval while cooking (e.g. "2s")
    #[arg(long)]
    pub fast_interval: Option<humantime::Duration>,

    /// Poll interval while idle (e.g. "1m")
    #[arg(long)]
    pub slow_interval: Option<humantime::Duration>,
}

// ── Control ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ModeArgs {
    /// Target mode: stop, startup, smoke, monitor, shutdown
    pub mode: ModeRequest,
}

#[derive(Debug, Args)]
pub struct HoldArgs {
    /// Target temperature in the grill's units (defaults to the current
    /// setpoint, or 225 °F)
    pub temperature: Option<f64>,
}

#[derive(Debug, Args)]
pub struct PModeArgs {
    /// P-mode level
    #[arg(value_parser = clap::value_parser!(u8).range(0..=9))]
    pub level: u8,
}

#[derive(Debug, Args)]
pub struct PrimeArgs {
    /// Amount of pellets to feed, in grams
    pub grams: u32,

    /// Mode to enter once priming finishes: stop, startup, smoke, hold
    #[arg(long = "then", default_value = "stop")]
    pub next_mode: PrimeNextMode,
}

#[derive(Debug, Args)]
pub struct SmokePlusArgs {
    pub state: Toggle,
}

#[derive(Debug, Args)]
pub struct SystemArgs {
    /// restart, reboot, or shutdown
    pub command: SystemCommand,

    /// Confirm the action
    #[arg(long, short = 'y')]
    pub yes: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile and make it the default
    Init {
        /// Device URL, e.g. http://192.168.1.50:8080
        url: String,

        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,
    },

    /// Display current configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a value on the active profile (url, timeout, fast_interval, slow_interval)
    Set {
        key: String,
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
