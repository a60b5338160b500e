// ── Device payload normalization ──
//
// Turns the loosely-typed `/api/current` (+ optional `/api/hopper`) JSON
// into a canonical `Status`. Field types vary by firmware: numbers arrive
// as strings, probes report "Unknown", whole sections go missing. All of
// that is absorbed here; nothing in this module returns an error.

use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

use crate::model::{Mode, RecipeInfo, Relays, Status, Units, is_grill_label};

type Object = Map<String, Value>;

/// Probe groups under `status.probe_status`, in priority order.
const PROBE_STATUS_GROUPS: [&str; 3] = ["P", "F", "AUX"];

/// P-mode level used when the device reports nothing usable.
const DEFAULT_P_MODE: u8 = 1;

/// Highest valid P-mode level.
const MAX_P_MODE: i64 = 9;

// ── Coercions ──────────────────────────────────────────────────────

/// Read a temperature-like value.
///
/// Numbers and numeric strings parse; `"unknown"` (any case) means a
/// disconnected probe and reads as `0.0`; anything else is `None`.
pub fn to_optional_f64(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("unknown") {
                Some(0.0)
            } else {
                s.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Read an integer. Floats and numeric strings are accepted only when they
/// carry no fractional part.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub fn to_optional_i64(value: Option<&Value>) -> Option<i64> {
    let whole = |f: f64| {
        (f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15).then_some(f as i64)
    };
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        _ => None,
    }
}

/// Read a flag. Accepts JSON booleans, numbers (non-zero is true), and the
/// usual string spellings. Unrecognized values are `None`.
pub fn to_bool(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Some(true),
            "false" | "off" | "no" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

// ── Normalization ──────────────────────────────────────────────────

/// Build a [`Status`] from the device's current payload and hopper report.
///
/// When `hopper` is `None`, a `hopper` section embedded in `payload` is
/// used instead. Never fails: missing or malformed fields become `None`
/// or their documented defaults.
pub fn normalize(payload: &Value, hopper: Option<&Value>) -> Status {
    let empty = Object::new();
    let status = object(payload.get("status")).unwrap_or(&empty);
    let current = object(payload.get("current")).unwrap_or(&empty);
    let hopper = object(hopper.or_else(|| payload.get("hopper")));

    let ftemps = object(current.get("F")).unwrap_or(&empty);
    let nt = object(current.get("NT")).unwrap_or(&empty);
    let pmap = object(current.get("P")).unwrap_or(&empty);

    let raw_mode = status
        .get("mode")
        .or_else(|| payload.get("mode"))
        .and_then(Value::as_str)
        .map(str::to_owned);
    let mode = raw_mode
        .as_deref()
        .map(Mode::from_device)
        .unwrap_or_default();

    let grill_temp = if mode == Mode::Stop {
        Some(0.0)
    } else {
        grill_entry(pmap)
    };

    let probe_temps = probe_labels(status, ftemps, nt, pmap)
        .into_iter()
        .map(|label| {
            let value = if is_grill_label(&label) {
                grill_temp
            } else {
                probe_value(&label, ftemps, nt)
            };
            (label, value)
        })
        .collect();

    let (p_mode_enabled, p_mode_level) = p_mode(status);

    Status {
        mode,
        raw_mode,
        display_mode: non_empty_str(status.get("display_mode")),
        units: status
            .get("units")
            .and_then(Value::as_str)
            .map(Units::from_device)
            .unwrap_or_default(),
        setpoint: to_optional_f64(current.get("PSP")).or_else(|| grill_entry(pmap)),
        grill_temp,
        probe_temps,
        relays: relays(status),
        p_mode_enabled,
        p_mode_level,
        smoke_plus_enabled: to_bool(status.get("s_plus")).unwrap_or(false),
        hopper_level_percent: hopper.and_then(|h| hopper_level(h.get("hopper_level"))),
        hopper_pellet_type: hopper.and_then(|h| non_empty_str(h.get("hopper_pellets"))),
        start_time_epoch: to_optional_f64(status.get("start_time")),
        recipe: recipe(status, mode),
        raw_probe_metadata: probe_metadata(status),
    }
}

// ── Helpers ────────────────────────────────────────────────────────

fn object(value: Option<&Value>) -> Option<&Object> {
    value.and_then(Value::as_object)
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// The grill reading in the primary group, matching the key loosely.
fn grill_entry(pmap: &Object) -> Option<f64> {
    let value = pmap.get("Grill").or_else(|| {
        pmap.iter()
            .find(|(label, _)| is_grill_label(label))
            .map(|(_, v)| v)
    });
    to_optional_f64(value)
}

/// Filtered reading first; the raw (no-transform) reading replaces it only
/// when the filtered one is missing or zero and the raw one is non-zero.
fn probe_value(label: &str, ftemps: &Object, nt: &Object) -> Option<f64> {
    let primary = to_optional_f64(ftemps.get(label));
    if primary.is_none_or(|v| v == 0.0) {
        let alt = to_optional_f64(nt.get(label));
        if alt.is_some_and(|v| v != 0.0) {
            return alt;
        }
    }
    primary
}

/// Labels to report, grill first then lexicographic.
///
/// Prefers the probes the device marks enabled under `probe_status`;
/// falls back to every label seen in the temperature groups. A label is
/// only kept if some temperature group actually carries it.
fn probe_labels(status: &Object, ftemps: &Object, nt: &Object, pmap: &Object) -> Vec<String> {
    let mut labels: IndexSet<String> = IndexSet::new();

    if let Some(probe_status) = object(status.get("probe_status")) {
        for group in PROBE_STATUS_GROUPS {
            let Some(entries) = object(probe_status.get(group)) else {
                continue;
            };
            for (label, meta) in entries {
                let enabled = object(Some(meta))
                    .and_then(|m| to_bool(m.get("enabled")))
                    .unwrap_or(false);
                if enabled {
                    labels.insert(label.clone());
                }
            }
        }
    }

    if labels.is_empty() {
        labels.extend(ftemps.keys().chain(nt.keys()).chain(pmap.keys()).cloned());
    }

    let mut labels: Vec<String> = labels
        .into_iter()
        .filter(|label| {
            ftemps.contains_key(label) || nt.contains_key(label) || pmap.contains_key(label)
        })
        .collect();
    labels.sort_by(|a, b| (!is_grill_label(a), a).cmp(&(!is_grill_label(b), b)));
    labels
}

fn probe_metadata(status: &Object) -> IndexMap<String, Value> {
    let mut metadata = IndexMap::new();
    let Some(probe_status) = object(status.get("probe_status")) else {
        return metadata;
    };
    for group in PROBE_STATUS_GROUPS {
        if let Some(entries) = object(probe_status.get(group)) {
            for (label, meta) in entries {
                metadata
                    .entry(label.clone())
                    .or_insert_with(|| meta.clone());
            }
        }
    }
    metadata
}

fn relays(status: &Object) -> Relays {
    let Some(outpins) = object(status.get("outpins")) else {
        return Relays::default();
    };
    Relays {
        power: to_bool(outpins.get("power")),
        fan: to_bool(outpins.get("fan")),
        auger: to_bool(outpins.get("auger")),
        igniter: to_bool(outpins.get("igniter")),
    }
}

/// `(enabled, level)`. The switch and the level are separate fields:
/// `p_mode` is an on/off flag (non-zero is on), while `pmode` carries the
/// level, falling back to the last used one, then to 1.
fn p_mode(status: &Object) -> (bool, u8) {
    let valid = |v: Option<&Value>| {
        to_optional_i64(v)
            .filter(|level| (0..=MAX_P_MODE).contains(level))
            .and_then(|level| u8::try_from(level).ok())
    };

    let enabled = to_optional_i64(status.get("p_mode")).is_some_and(|flag| flag != 0);
    let level = valid(status.get("pmode"))
        .or_else(|| object(status.get("settings")).and_then(|s| valid(s.get("last_pmode"))))
        .unwrap_or(DEFAULT_P_MODE);
    (enabled, level)
}

/// Whole percent, fractions truncated toward zero. Out of range is absent.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn hopper_level(value: Option<&Value>) -> Option<u8> {
    let level = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite() && (0.0..101.0).contains(f))?;
    u8::try_from(level.trunc() as i64).ok()
}

fn recipe(status: &Object, mode: Mode) -> Option<RecipeInfo> {
    let info = RecipeInfo {
        name: non_empty_str(status.get("name")),
        start_duration: to_optional_i64(status.get("start_duration")),
        shutdown_duration: to_optional_i64(status.get("shutdown_duration")),
    };
    let has_details =
        info.name.is_some() || info.start_duration.is_some() || info.shutdown_duration.is_some();
    (mode == Mode::Recipe || has_details).then_some(info)
}
