//! Application - Service Wiring and Terminal Session
//!
//! Builds the service hub and dashboard state, then pumps state events and
//! user input until the session ends.

use crate::app::console::{Command, HELP};
use crate::constants::INGEST_INTERVAL_MS;
use crate::domain::config::AppConfig;
use crate::domain::metrics::{Level, MetricKind, MetricsSnapshot};
use crate::error::Result;
use crate::services::ServiceHub;
use crate::state::DashboardState;
use crate::state::snapshot_store::StoreUpdate;
use crate::state::tabs_state::DashboardTab;
use crate::state::ui_event::UiEvent;
use std::io::BufRead;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Run the dashboard until the user quits or ctrl-c is received
pub async fn run_app(config: AppConfig) -> Result<()> {
    let hub = ServiceHub::new(&config)?;
    let mut dashboard = DashboardState::new(hub, &config.anomaly);
    let metrics = dashboard.subscribe_metrics();

    info!("Connecting to {}", config.api.base_url);
    dashboard.start();
    println!("{HELP}");

    let mut lines = spawn_line_reader(std::io::BufReader::new(std::io::stdin()));
    let mut stdin_open = true;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut ticker = tokio::time::interval(Duration::from_millis(INGEST_INTERVAL_MS));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for event in dashboard.drain() {
                    render_event(&dashboard, &event);
                }
                for update in metrics.try_iter() {
                    render_update(&update);
                }
            }

            line = lines.recv(), if stdin_open => match line {
                Some(line) => {
                    if !handle_command(&mut dashboard, Command::parse(&line)) {
                        break;
                    }
                }
                None => {
                    info!("Input closed; streaming until interrupted");
                    stdin_open = false;
                }
            },

            _ = &mut shutdown => {
                info!("Interrupted");
                break;
            }
        }
    }

    dashboard.stop();
    Ok(())
}

/// Read lines on a dedicated OS thread
///
/// A blocked read there never holds up runtime shutdown; the thread is left
/// behind when the process exits.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::UnboundedReceiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read input: {}", e);
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        warn!("Failed to start input reader: {}", e);
    }
    rx
}

/// Apply a command; returns `false` when the session should end
fn handle_command(dashboard: &mut DashboardState, command: Command) -> bool {
    match command {
        Command::Tab(tab) => {
            dashboard.select_tab(tab);
            println!("[{}]", dashboard.active_tab().title());
        }
        Command::Similar => dashboard.find_similar(),
        Command::Analyze => dashboard.analyze(),
        Command::Refresh => match dashboard.active_tab() {
            DashboardTab::Dashboard => dashboard.analyze(),
            DashboardTab::History => dashboard.refresh_history(),
            DashboardTab::Forecast => dashboard.refresh_forecast(),
        },
        Command::Status => render_status(dashboard),
        Command::Help => println!("{HELP}"),
        Command::Quit => return false,
        Command::Chat(text) => {
            if dashboard.send_chat(&text) {
                println!("You: {text}");
            }
        }
        Command::Unknown(text) => println!("Unknown command {text:?}; try /help"),
        Command::Empty => {}
    }
    true
}

// ==================== Rendering ====================

fn render_event(dashboard: &DashboardState, event: &UiEvent) {
    match event {
        UiEvent::FeedChanged { label, detail, .. } => println!("● {label} ({detail})"),
        UiEvent::AnomalyRaised { message } => println!("⚠ {message}"),
        UiEvent::AnomalyProcessed => println!("⚠ Corrective workflows processed"),
        UiEvent::AnomalyCleared => println!("Anomaly banner cleared"),
        UiEvent::AnalysisUpdated => {
            let analysis = dashboard.analysis();
            println!("Recommendation: {}", analysis.summary());
            for workflow in analysis.recommended() {
                println!("  - {}: {}", workflow.title(), workflow.reason);
            }
            for workflow in analysis.triggered() {
                println!("  ✓ triggered {}", workflow.title());
            }
        }
        UiEvent::ForecastUpdated => {
            let forecast = dashboard.forecast();
            if let Some(text) = forecast.text() {
                println!("Forecast: {text}");
            }
            for point in forecast.structured() {
                println!(
                    "  {}: {:.1} -> {:.1}",
                    point.metric, point.latest, point.predicted
                );
            }
        }
        UiEvent::HistoryUpdated { .. } => {
            let history = dashboard.history();
            if let Some(message) = history.empty_message() {
                println!("History: {message}");
            }
            for record in history.records() {
                println!("  {}", describe(record));
            }
        }
        UiEvent::SimilarUpdated { count } => {
            println!("Similar samples: {count}");
            for record in dashboard.history().similar() {
                println!("  {} (score {:.3})", describe(&record.snapshot), record.score);
            }
        }
        UiEvent::ChatAnswered { text } => println!("Bot: {text}"),
        UiEvent::ErrorOccurred { source, message } => {
            warn!("{} request failed: {}", source, message);
        }
    }
}

fn render_update(update: &StoreUpdate) {
    let snapshot = &update.point.snapshot;
    let levels: Vec<String> = MetricKind::all()
        .iter()
        .map(|kind| {
            let value = snapshot.value(*kind);
            format!("{} {:.1} [{}]", kind.label(), value, Level::of(*kind, value).label())
        })
        .collect();
    println!("{} | {}", update.point.time, levels.join(" | "));
}

fn render_status(dashboard: &DashboardState) {
    println!("Tab: {}", dashboard.active_tab().title());
    println!("Feed: {}", dashboard.feed().label());
    println!("Current: {}", describe(dashboard.store().current()));
    println!("Chart window: {} points", dashboard.store().history().len());

    let anomaly = dashboard.anomaly();
    if anomaly.active {
        let phase = if anomaly.processing { "processing" } else { "processed" };
        println!("Anomaly ({phase}): {}", anomaly.message);
    }
    println!("Recommendation: {}", dashboard.analysis().summary());
}

fn describe(snapshot: &MetricsSnapshot) -> String {
    let values: Vec<String> = MetricKind::all()
        .iter()
        .map(|kind| format!("{} {:.1}", kind.label(), snapshot.value(*kind)))
        .collect();
    match &snapshot.timestamp {
        Some(timestamp) => format!("{timestamp} {}", values.join(", ")),
        None => values.join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    /// Reader that blocks until its sender is dropped
    struct Blocked(std::sync::mpsc::Receiver<u8>);

    impl Read for Blocked {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.0.recv() {
                Ok(byte) if !buf.is_empty() => {
                    buf[0] = byte;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[tokio::test]
    async fn test_line_reader_forwards_lines_until_eof() {
        let mut lines = spawn_line_reader(Cursor::new("/history\nhow is waste?\n"));
        assert_eq!(lines.recv().await.as_deref(), Some("/history"));
        assert_eq!(lines.recv().await.as_deref(), Some("how is waste?"));
        assert_eq!(lines.recv().await, None);
    }

    #[test]
    fn test_blocked_reader_does_not_hold_runtime_shutdown() {
        let (_keep_open, rx) = std::sync::mpsc::channel::<u8>();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("runtime");

        let started = std::time::Instant::now();
        runtime.block_on(async {
            let mut lines = spawn_line_reader(std::io::BufReader::new(Blocked(rx)));
            let waited =
                tokio::time::timeout(Duration::from_millis(50), lines.recv()).await;
            assert!(waited.is_err());
        });
        drop(runtime);
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
