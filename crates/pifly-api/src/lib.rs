// pifly-api: Async Rust client for the PiFire grill controller HTTP API

pub mod client;
pub mod control;
pub mod device;
pub mod error;
pub mod transport;

pub use client::PiFireClient;
pub use control::{MAX_P_MODE, ModeRequest, PrimeNextMode, SystemCommand};
pub use error::Error;
pub use transport::{DEFAULT_TIMEOUT, TransportConfig};
