// ── Entity discovery ──
//
// Watches successive `Status` snapshots for sensor-worthy fields and
// reports each one exactly once. The set only grows: a probe that
// disappears from later payloads stays discovered.

use std::fmt;

use indexmap::IndexSet;
use serde::{Serialize, Serializer};

use crate::model::{Status, is_grill_label};

/// Something a consumer should create a sensor for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiscoveryKey {
    /// Recipe-active indicator. Always present.
    Recipe,
    /// Cook timer. Always present.
    Runtime,
    /// Hopper fill level, once the device reports one.
    PelletLevel,
    /// A temperature probe, by device label.
    Probe(String),
}

impl DiscoveryKey {
    /// Human-readable sensor name.
    pub fn display_name(&self) -> String {
        match self {
            Self::Recipe => "Recipe".into(),
            Self::Runtime => "Runtime".into(),
            Self::PelletLevel => "Pellet Level".into(),
            Self::Probe(label) => pretty_probe_name(label),
        }
    }

    /// Stable identifier suitable for entity ids and file names.
    pub fn slug(&self) -> String {
        match self {
            Self::Probe(label) => format!("probe_{}", slug(label)),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for DiscoveryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recipe => f.write_str("recipe"),
            Self::Runtime => f.write_str("runtime"),
            Self::PelletLevel => f.write_str("pellet_level"),
            Self::Probe(label) => write!(f, "probe:{label}"),
        }
    }
}

impl Serialize for DiscoveryKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Append-only record of everything reported so far.
#[derive(Debug, Clone, Default)]
pub struct DiscoveredKeySet {
    keys: IndexSet<DiscoveryKey>,
}

impl DiscoveredKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every key `status` exposes and return the ones not seen
    /// before, in discovery order. Scanning the same status twice yields
    /// nothing the second time.
    pub fn scan(&mut self, status: &Status) -> Vec<DiscoveryKey> {
        let mut candidates = vec![DiscoveryKey::Recipe, DiscoveryKey::Runtime];
        if status.hopper_level_percent.is_some() {
            candidates.push(DiscoveryKey::PelletLevel);
        }
        candidates.extend(status.probe_temps.keys().cloned().map(DiscoveryKey::Probe));

        candidates
            .into_iter()
            .filter(|key| self.keys.insert(key.clone()))
            .collect()
    }

    pub fn contains(&self, key: &DiscoveryKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiscoveryKey> {
        self.keys.iter()
    }
}

/// `"Probe1"` → `"Probe 1 Temperature"`, `"grill"` → `"Grill Temperature"`.
///
/// A trailing run of digits is split off with a space only when something
/// other than a digit precedes it.
pub fn pretty_probe_name(label: &str) -> String {
    if is_grill_label(label) {
        return "Grill Temperature".into();
    }
    let stem = label.trim_end_matches(|c: char| c.is_ascii_digit());
    if stem.is_empty() || stem.len() == label.len() {
        format!("{label} Temperature")
    } else {
        format!("{stem} {} Temperature", &label[stem.len()..])
    }
}

/// Lowercase, spaces to underscores, drop everything outside `[a-z0-9_]`.
pub fn slug(label: &str) -> String {
    label
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}
