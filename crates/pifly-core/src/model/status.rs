// ── Status snapshot ──

use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::mode::{HeatingState, Mode, Units};

/// Hold setpoint used when entering hold without an explicit target (°F).
pub const DEFAULT_HOLD_TEMP_F: f64 = 225.0;

/// Relay (output pin) states. `None` means the device did not report the
/// pin, which is distinct from "off".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relays {
    pub power: Option<bool>,
    pub fan: Option<bool>,
    pub auger: Option<bool>,
    pub igniter: Option<bool>,
}

/// Recipe details reported alongside the status section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeInfo {
    pub name: Option<String>,
    pub start_duration: Option<i64>,
    pub shutdown_duration: Option<i64>,
}

/// Canonical, immutable snapshot of one device poll.
///
/// Built fresh by [`crate::convert::normalize`] on every successful cycle
/// and shared as `Arc<Status>`; never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub mode: Mode,
    /// Mode string exactly as the device sent it.
    pub raw_mode: Option<String>,
    pub display_mode: Option<String>,
    pub units: Units,
    pub setpoint: Option<f64>,
    pub grill_temp: Option<f64>,
    /// Probe label → temperature, grill first then lexicographic.
    pub probe_temps: IndexMap<String, Option<f64>>,
    pub relays: Relays,
    pub p_mode_enabled: bool,
    pub p_mode_level: u8,
    pub smoke_plus_enabled: bool,
    pub hopper_level_percent: Option<u8>,
    pub hopper_pellet_type: Option<String>,
    pub start_time_epoch: Option<f64>,
    pub recipe: Option<RecipeInfo>,
    /// Per-label probe configuration, passed through untouched.
    pub raw_probe_metadata: IndexMap<String, Value>,
}

impl Status {
    pub fn is_recipe_active(&self) -> bool {
        self.mode == Mode::Recipe
    }

    /// Elapsed cook time at `now`.
    ///
    /// `None` outside runtime-tracking modes. Zero when the device has not
    /// reported a start time, and clamped at zero if the start time lies
    /// in the future.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn runtime(&self, now: DateTime<Utc>) -> Option<Duration> {
        if !self.mode.tracks_runtime() {
            return None;
        }
        let Some(start) = self.start_time_epoch else {
            return Some(Duration::ZERO);
        };
        let elapsed = now.timestamp_millis() as f64 / 1000.0 - start;
        let whole = Duration::try_from_secs_f64(elapsed.max(0.0)).unwrap_or_default();
        Some(Duration::from_secs(whole.as_secs()))
    }

    /// [`Self::runtime`] formatted as `HH:MM:SS`.
    pub fn format_runtime(&self, now: DateTime<Utc>) -> Option<String> {
        self.runtime(now).map(format_hms)
    }

    pub fn heating_state(&self) -> HeatingState {
        if !self.mode.can_heat() {
            return HeatingState::Off;
        }
        if self.relays.fan == Some(true) || self.relays.auger == Some(true) {
            HeatingState::Heating
        } else {
            HeatingState::Idle
        }
    }

    /// Target to use when switching into hold: the current setpoint, or
    /// 225 °F when the device has none.
    pub fn hold_target(&self) -> f64 {
        self.setpoint.unwrap_or(DEFAULT_HOLD_TEMP_F)
    }

    pub fn temperature_bounds(&self) -> (f64, f64) {
        self.units.temperature_bounds()
    }

    /// Label of the grill probe, if one is reported.
    pub fn grill_label(&self) -> Option<&str> {
        self.probe_temps
            .keys()
            .find(|label| is_grill_label(label))
            .map(String::as_str)
    }
}

/// The grill probe is identified by name, ignoring case.
pub fn is_grill_label(label: &str) -> bool {
    label.eq_ignore_ascii_case("grill")
}

/// Format a duration as zero-padded `HH:MM:SS`. Hours are not wrapped.
pub fn format_hms(duration: Duration) -> String {
    let total = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn status(mode: Mode, start: Option<f64>) -> Status {
        Status {
            mode,
            start_time_epoch: start,
            ..Status::default()
        }
    }

    #[test]
    fn runtime_only_in_tracking_modes() {
        assert_eq!(status(Mode::Stop, Some(0.0)).runtime(at(100)), None);
        assert_eq!(status(Mode::Recipe, Some(0.0)).runtime(at(100)), None);
        assert_eq!(
            status(Mode::Smoke, Some(1000.5)).runtime(at(4661)),
            Some(Duration::from_secs(3660))
        );
    }

    #[test]
    fn runtime_defaults_and_clamps() {
        let no_start = status(Mode::Hold, None);
        assert_eq!(no_start.format_runtime(at(50)).as_deref(), Some("00:00:00"));

        let future = status(Mode::Hold, Some(10_000.0));
        assert_eq!(future.runtime(at(5_000)), Some(Duration::ZERO));
    }

    #[test]
    fn hms_formatting() {
        assert_eq!(format_hms(Duration::from_secs(59)), "00:00:59");
        assert_eq!(format_hms(Duration::from_secs(3_725)), "01:02:05");
        assert_eq!(format_hms(Duration::from_secs(100 * 3600)), "100:00:00");
    }

    #[test]
    fn heating_state_follows_relays() {
        let mut s = status(Mode::Hold, None);
        assert_eq!(s.heating_state(), HeatingState::Idle);

        s.relays.auger = Some(true);
        assert_eq!(s.heating_state(), HeatingState::Heating);

        s.mode = Mode::Monitor;
        assert_eq!(s.heating_state(), HeatingState::Off);
    }

    #[test]
    fn hold_target_defaults_to_225() {
        let mut s = Status::default();
        assert!((s.hold_target() - 225.0).abs() < f64::EPSILON);
        s.setpoint = Some(250.0);
        assert!((s.hold_target() - 250.0).abs() < f64::EPSILON);
    }
}
