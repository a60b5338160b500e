//! Polling and normalization layer between `pifly-api` and consumers
//! (CLI, dashboards, home-automation bridges).
//!
//! - **[`Coordinator`]**: Owns one device. [`connect()`](Coordinator::connect)
//!   runs the first poll, then a background task re-polls on an adaptive
//!   schedule (fast while cooking, slow otherwise). Listeners receive
//!   [`PollEvent`]s in registration order; [`StatusStream`] offers the same
//!   data as a `watch`-backed stream.
//!
//! - **[`normalize`](convert::normalize)**: Turns the device's loosely
//!   typed JSON into a canonical [`Status`]. Never fails.
//!
//! - **[`DiscoveredKeySet`]**: Append-only record of sensor-worthy keys
//!   (probes, pellet level, recipe, runtime), reported once each.
//!
//! - **[`Command`]**: Typed write operations, routed straight to the
//!   device client.

pub mod command;
pub mod config;
pub mod convert;
pub mod coordinator;
pub mod discovery;
pub mod error;
pub mod model;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::Command;
pub use config::{DEFAULT_DEVICE_URL, DeviceConfig, FAST_POLL_INTERVAL, SLOW_POLL_INTERVAL};
pub use convert::normalize;
pub use coordinator::{ConnectionState, Coordinator, ListenerHandle, PollEvent, PollInterval};
pub use discovery::{DiscoveredKeySet, DiscoveryKey, pretty_probe_name, slug};
pub use error::CoreError;
pub use model::{HeatingState, Mode, RecipeInfo, Relays, Status, Units};
pub use stream::{PollSnapshot, StatusStream};

// Request enums live in the API crate; re-exported so consumers need only
// depend on the core.
pub use pifly_api::{ModeRequest, PrimeNextMode, SystemCommand};
