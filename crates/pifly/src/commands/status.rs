//! Status and sensor command handlers, plus the shared status renderers.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Utc;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;

use pifly_core::{
    Coordinator, CoreError, DeviceConfig, DiscoveryKey, HeatingState, PollInterval, Status, Units,
    pretty_probe_name,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Serializable views ──────────────────────────────────────────────

/// Status plus the values derived from it, as emitted by `-o json`.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub status: Arc<Status>,
    pub heating_state: HeatingState,
    pub runtime: Option<String>,
    pub poll_interval: String,
}

impl StatusReport {
    pub fn new(status: Arc<Status>, interval: PollInterval) -> Self {
        Self {
            heating_state: status.heating_state(),
            runtime: status.format_runtime(Utc::now()),
            poll_interval: interval.to_string(),
            status,
        }
    }
}

#[derive(Debug, Serialize)]
struct SensorView {
    key: DiscoveryKey,
    name: String,
    slug: String,
}

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProbeRow {
    #[tabled(rename = "Probe")]
    name: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Temperature")]
    temp: String,
}

#[derive(Tabled)]
struct SensorRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Slug")]
    slug: String,
}

impl From<&SensorView> for SensorRow {
    fn from(view: &SensorView) -> Self {
        Self {
            key: view.key.to_string(),
            name: view.name.clone(),
            slug: view.slug.clone(),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(config: DeviceConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let (status, interval) = Coordinator::oneshot(config, |c| async move {
        let status = c.current_status().ok_or(CoreError::NotConnected)?;
        Ok((status, c.poll_interval()))
    })
    .await?;

    let report = StatusReport::new(status, interval);
    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &report,
        |r| render_detail(r, color),
        |r| render_plain(&r.status),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn sensors(config: DeviceConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let keys = Coordinator::oneshot(config, |c| async move { Ok(c.discovered_keys()) }).await?;
    let views: Vec<SensorView> = keys
        .into_iter()
        .map(|key| SensorView {
            name: key.display_name(),
            slug: key.slug(),
            key,
        })
        .collect();

    let out = output::render_list(
        global.output,
        &views,
        |v| SensorRow::from(v),
        |v| v.key.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Renderers ───────────────────────────────────────────────────────

pub fn format_temp(value: Option<f64>, units: Units) -> String {
    value.map_or_else(|| "-".into(), |t| format!("{t:.1}°{units}"))
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

fn paint_mode(status: &Status, color: bool) -> String {
    let label = status
        .display_mode
        .clone()
        .unwrap_or_else(|| status.mode.to_string());
    if !color {
        return label;
    }
    match status.heating_state() {
        HeatingState::Heating => label.red().bold().to_string(),
        HeatingState::Idle => label.yellow().to_string(),
        HeatingState::Off => label.dimmed().to_string(),
    }
}

/// Multi-line view for `-o table`.
pub fn render_detail(report: &StatusReport, color: bool) -> String {
    let status = &report.status;
    let units = status.units;
    let mut out = String::new();

    let _ = writeln!(out, "Mode:        {}", paint_mode(status, color));
    let _ = writeln!(out, "Heating:     {}", report.heating_state);
    let _ = writeln!(out, "Setpoint:    {}", format_temp(status.setpoint, units));
    let _ = writeln!(out, "Grill:       {}", format_temp(status.grill_temp, units));
    if let Some(ref runtime) = report.runtime {
        let _ = writeln!(out, "Runtime:     {runtime}");
    }
    let pmode = if status.p_mode_enabled {
        status.p_mode_level.to_string()
    } else {
        "off".into()
    };
    let _ = writeln!(
        out,
        "P-mode:      {pmode}  (smoke plus {})",
        on_off(status.smoke_plus_enabled)
    );
    if let Some(level) = status.hopper_level_percent {
        match status.hopper_pellet_type {
            Some(ref pellets) => {
                let _ = writeln!(out, "Hopper:      {level}% ({pellets})");
            }
            None => {
                let _ = writeln!(out, "Hopper:      {level}%");
            }
        }
    }
    if let Some(ref recipe) = status.recipe {
        let name = recipe.name.as_deref().unwrap_or("(unnamed)");
        let _ = writeln!(out, "Recipe:      {name}");
    }
    let _ = write!(out, "Polling:     {}", report.poll_interval);

    if !status.probe_temps.is_empty() {
        let rows: Vec<ProbeRow> = status
            .probe_temps
            .iter()
            .map(|(label, temp)| ProbeRow {
                name: pretty_probe_name(label),
                label: label.clone(),
                temp: format_temp(*temp, units),
            })
            .collect();
        let _ = write!(out, "\n\n{}", output::render_table(&rows));
    }
    out
}

/// `key=value` lines for `-o plain`.
pub fn render_plain(status: &Status) -> String {
    let mut lines = vec![format!("mode={}", status.mode)];
    if let Some(setpoint) = status.setpoint {
        lines.push(format!("setpoint={setpoint}"));
    }
    for (label, temp) in &status.probe_temps {
        let value = temp.map(|t| t.to_string()).unwrap_or_default();
        lines.push(format!("{label}={value}"));
    }
    if let Some(level) = status.hopper_level_percent {
        lines.push(format!("hopper={level}"));
    }
    lines.join("\n")
}

/// One-line summary used by `watch` and after control commands.
pub fn render_line(status: &Status, color: bool) -> String {
    let units = status.units;
    let mut line = format!(
        "{:<8} grill {:>9}  set {:>9}",
        paint_mode(status, color),
        format_temp(status.grill_temp, units),
        format_temp(status.setpoint, units)
    );
    for (label, temp) in &status.probe_temps {
        if Some(label.as_str()) == status.grill_label() {
            continue;
        }
        let _ = write!(line, "  {} {}", label, format_temp(*temp, units));
    }
    if let Some(level) = status.hopper_level_percent {
        let _ = write!(line, "  hopper {level}%");
    }
    line
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use pifly_core::Mode;

    use super::*;

    fn sample() -> Status {
        let mut probe_temps = IndexMap::new();
        probe_temps.insert("Grill".to_string(), Some(224.0));
        probe_temps.insert("Probe1".to_string(), Some(150.5));
        probe_temps.insert("Probe2".to_string(), None);
        Status {
            mode: Mode::Hold,
            setpoint: Some(225.0),
            grill_temp: Some(224.0),
            probe_temps,
            hopper_level_percent: Some(80),
            ..Status::default()
        }
    }

    #[test]
    fn plain_output_is_key_value() {
        let out = render_plain(&sample());
        assert_eq!(
            out,
            "mode=hold\nsetpoint=225\nGrill=224\nProbe1=150.5\nProbe2=\nhopper=80"
        );
    }

    #[test]
    fn line_skips_grill_probe() {
        let line = render_line(&sample(), false);
        assert!(line.starts_with("hold"));
        assert!(line.contains("grill   224.0°F"));
        assert!(line.contains("Probe1 150.5°F"));
        assert!(line.contains("Probe2 -"));
        assert!(!line.contains("Grill 224"));
        assert!(line.ends_with("hopper 80%"));
    }

    #[test]
    fn detail_includes_probe_table() {
        let report = StatusReport::new(Arc::new(sample()), PollInterval::Fast);
        let out = render_detail(&report, false);
        assert!(out.contains("Mode:        hold"));
        assert!(out.contains("Polling:     fast"));
        assert!(out.contains("Probe 1"));
        assert!(out.contains("150.5°F"));
    }

    #[test]
    fn report_flattens_status_fields() {
        let report = StatusReport::new(Arc::new(sample()), PollInterval::Fast);
        let json = serde_json::to_value(&report).unwrap_or_default();
        assert_eq!(json["mode"], "hold");
        assert_eq!(json["setpoint"], 225.0);
        assert_eq!(json["poll_interval"], "fast");
        assert_eq!(json["heating_state"], "idle");
    }
}
