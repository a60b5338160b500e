//! `watch`: follow poll results until Ctrl-C or `--count` updates.
//!
//! Structured formats emit one document per update (JSON lines, or YAML
//! documents separated by `---`).

use chrono::Local;
use tokio::sync::mpsc;

use pifly_core::{Coordinator, DeviceConfig, PollEvent};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config::override_interval;
use crate::error::CliError;
use crate::output;

use super::status::{StatusReport, render_line, render_plain};

pub async fn handle(
    args: WatchArgs,
    mut config: DeviceConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    override_interval("fast_interval", &mut config.fast_interval, args.fast_interval)?;
    override_interval("slow_interval", &mut config.slow_interval, args.slow_interval)?;

    let coordinator = Coordinator::new(config)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let listener = coordinator.subscribe(move |event: &PollEvent| {
        let _ = tx.send(event.clone());
    });

    coordinator.connect().await?;
    tracing::info!(
        url = %coordinator.config().url,
        interval = %coordinator.poll_interval(),
        "watching device"
    );

    let color = output::should_color(global.color);
    let mut shown = 0usize;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    PollEvent::Updated(status) => {
                        let report = StatusReport::new(status, coordinator.poll_interval());
                        let rendered = render_update(global.output, &report, color);
                        output::print_output(&rendered, global.quiet);
                        shown += 1;
                        if args.count.is_some_and(|limit| shown >= limit) {
                            break;
                        }
                    }
                    // Already logged at warn by the coordinator.
                    PollEvent::Failed(_) => {}
                    PollEvent::Discovered(key) => {
                        tracing::info!(sensor = %key, "discovered sensor");
                    }
                }
            }
        }
    }

    coordinator.unsubscribe(listener);
    coordinator.shutdown().await;
    Ok(())
}

fn render_update(format: OutputFormat, report: &StatusReport, color: bool) -> String {
    match format {
        OutputFormat::Table => format!(
            "[{}] {}",
            Local::now().format("%H:%M:%S"),
            render_line(&report.status, color)
        ),
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json_compact(report),
        OutputFormat::Yaml => format!("---\n{}", output::render_yaml(report).trim_end()),
        OutputFormat::Plain => render_plain(&report.status),
    }
}
