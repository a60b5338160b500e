// ── Operating mode and unit types ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Canonical grill operating mode.
///
/// Devices report mixed-case names (`"Hold"`, `"SMOKE"`); anything not
/// listed here (including `"Prime"`, `"Error"`, or a missing field)
/// collapses to [`Mode::Stop`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Stop,
    Startup,
    Smoke,
    Hold,
    Monitor,
    Shutdown,
    Recipe,
}

impl Mode {
    /// Parse a device-reported mode, degrading unknown values to `Stop`.
    pub fn from_device(raw: &str) -> Self {
        raw.trim().parse().unwrap_or_default()
    }

    /// Modes in which temperatures move quickly and the device is polled
    /// on the fast interval.
    pub fn is_active_cook(self) -> bool {
        matches!(self, Self::Startup | Self::Smoke | Self::Monitor | Self::Hold)
    }

    /// Modes in which the cook timer is meaningful.
    pub fn tracks_runtime(self) -> bool {
        matches!(
            self,
            Self::Smoke | Self::Hold | Self::Monitor | Self::Startup | Self::Shutdown
        )
    }

    /// Modes in which the controller may be actively firing.
    pub fn can_heat(self) -> bool {
        matches!(self, Self::Startup | Self::Smoke | Self::Hold)
    }
}

/// Temperature units reported by the device.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Units {
    #[default]
    F,
    C,
}

impl Units {
    /// `"C"` (any case) is Celsius; everything else is Fahrenheit.
    pub fn from_device(raw: &str) -> Self {
        raw.trim().parse().unwrap_or_default()
    }

    /// Accepted hold-temperature range for these units, inclusive.
    pub fn temperature_bounds(self) -> (f64, f64) {
        match self {
            Self::F => (100.0, 500.0),
            Self::C => (38.0, 260.0),
        }
    }
}

/// What the controller is doing right now, from mode and relay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HeatingState {
    Off,
    Heating,
    Idle,
}
