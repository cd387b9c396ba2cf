//! Overlay Alerts - headless donation-alert overlay runner
//!
//! This binary drives one overlay identity's playback loop against the
//! backing store and prints show/remove/acknowledge transitions for an
//! external display surface to consume.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use overlay_alerts_core::timestamps::now_micros;
use overlay_alerts_core::{Alert, AlertPayload, Config, Result};
use overlay_alerts_db::AlertStore;
use overlay_alerts_engine::{
    HistoryLoadState, HistoryView, OverlayState, PlaybackDriver, PlaybackEvent, StoreSource,
    subscribe,
};

#[derive(Parser)]
#[command(name = "overlay-alerts")]
#[command(version, about = "Donation alert overlay runner (playback + history)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an overlay identity with default settings
    Init {
        /// Overlay id to create (minted when omitted)
        #[arg(long)]
        overlay_id: Option<String>,
    },

    /// Run the playback loop for one overlay
    Run {
        overlay_id: String,

        /// Emit playback events as JSON lines instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the alert history for one overlay, newest first
    History {
        overlay_id: String,

        /// Hide test alerts from the listing
        #[arg(long)]
        hide_test: bool,

        /// Keep refreshing on the history interval instead of printing once
        #[arg(long)]
        watch: bool,
    },

    /// Insert a test alert (shows up in playback and history)
    SendTest {
        overlay_id: String,

        #[arg(long, default_value = "3.00")]
        amount: String,

        #[arg(long, default_value = "USD")]
        currency: String,

        #[arg(long, default_value = "Test Sender")]
        from_name: String,

        #[arg(long)]
        message: Option<String>,
    },

    /// Show resolved configuration
    Config,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = Config::from_env();

    if cli.verbose {
        tracing::info!("Configuration loaded: {config:?}");
    }

    let outcome = match cli.command {
        Commands::Init { overlay_id } => init_overlay(&config, overlay_id.as_deref()),
        Commands::Run { overlay_id, json } => run_playback(&config, &overlay_id, json),
        Commands::History {
            overlay_id,
            hide_test,
            watch,
        } => print_history(&config, &overlay_id, hide_test, watch),
        Commands::SendTest {
            overlay_id,
            amount,
            currency,
            from_name,
            message,
        } => send_test(&config, &overlay_id, amount, currency, from_name, message),
        Commands::Config => {
            println!("{config:#?}");
            Ok(())
        }
    };

    if let Err(err) = outcome {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn init_overlay(config: &Config, overlay_id: Option<&str>) -> Result<()> {
    let store = AlertStore::open_url(&config.database_url)?;
    let created = store.create_overlay(overlay_id)?;
    println!("{created}");
    Ok(())
}

/// Run the playback loop until the process is terminated.
fn run_playback(config: &Config, overlay_id: &str, json: bool) -> Result<()> {
    let store = AlertStore::open_url(&config.database_url)?;
    // Fails early when the overlay does not exist; also seeds the duration
    // so the first alert never falls back to the embedded default.
    let snapshot = store.get_settings(overlay_id)?;
    drop(store);

    let state = Arc::new(OverlayState::new());
    state.update_settings(snapshot.settings);

    let watch_state = Arc::clone(&state);
    let _subscription = subscribe(
        config.database_url.clone(),
        overlay_id,
        config.settings_watch_interval(),
        move |settings| watch_state.update_settings(settings),
    );

    let driver = PlaybackDriver::new(
        Arc::clone(&state),
        Box::new(StoreSource::new(config.database_url.clone())),
        overlay_id,
        config,
    );
    let _handle = driver.start();
    tracing::info!(overlay_id, "playback running");

    loop {
        for event in state.drain_events() {
            if json {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(err) => tracing::warn!("event serialization failed: {err}"),
                }
                continue;
            }
            render_event(&state, &event);
        }
        thread::sleep(Duration::from_millis(100));
    }
}

fn render_event(state: &OverlayState, event: &PlaybackEvent) {
    match event {
        PlaybackEvent::Shown { alert } => {
            let settings = state.settings().unwrap_or_default();
            println!(
                "SHOW  [{}] {}",
                alert.payload.kind.label(),
                settings.render_message(&alert.payload)
            );
            if let Some(message) = &alert.payload.message {
                println!("      \"{message}\"");
            }
        }
        PlaybackEvent::RemovalStarted { alert_id } => println!("HIDE  {alert_id}"),
        PlaybackEvent::Cleared { alert_id } => println!("CLEAR {alert_id}"),
        PlaybackEvent::Acknowledged { alert_id } => {
            tracing::debug!(alert_id = %alert_id, "acknowledged");
        }
        PlaybackEvent::AcknowledgeFailed { alert_id } => {
            tracing::warn!(alert_id = %alert_id, "acknowledge failed; alert may replay");
        }
    }
}

fn print_history(config: &Config, overlay_id: &str, hide_test: bool, watch: bool) -> Result<()> {
    let mut view = HistoryView::new(StoreSource::new(config.database_url.clone()), overlay_id);
    view.set_hide_test_alerts(hide_test);
    // Unbounded viewport: the terminal listing mounts every row.
    view.set_viewport_height(f32::INFINITY);

    loop {
        view.refresh();
        match view.load_state() {
            HistoryLoadState::Loading => println!("Loading..."),
            HistoryLoadState::Empty => println!("No alerts yet..."),
            HistoryLoadState::Ready => {
                for row in view.visible_rows() {
                    println!("{}", history_line(&row.alert));
                }
            }
        }
        if !watch {
            return Ok(());
        }
        println!("---");
        thread::sleep(config.history_refresh_interval());
    }
}

fn history_line(alert: &Alert) -> String {
    let payload = &alert.payload;
    let money = payload.money().unwrap_or_else(|| "Money".to_string());
    let from = payload.from_name.as_deref().unwrap_or("Someone");
    let mut line = format!(
        "{} [{}{}] {} from {}",
        format_age(alert.created_at),
        payload.kind.label(),
        if payload.is_test { ", test" } else { "" },
        money,
        from,
    );
    if let Some(message) = &payload.message {
        line.push_str(&format!(" - \"{message}\""));
    }
    line
}

/// Compact relative age, e.g. `3m ago`.
fn format_age(created_at_micros: i64) -> String {
    let elapsed_secs = (now_micros() - created_at_micros).max(0) / 1_000_000;
    match elapsed_secs {
        0..=59 => format!("{elapsed_secs}s ago"),
        60..=3599 => format!("{}m ago", elapsed_secs / 60),
        3600..=86_399 => format!("{}h ago", elapsed_secs / 3600),
        _ => format!("{}d ago", elapsed_secs / 86_400),
    }
}

fn send_test(
    config: &Config,
    overlay_id: &str,
    amount: String,
    currency: String,
    from_name: String,
    message: Option<String>,
) -> Result<()> {
    let store = AlertStore::open_url(&config.database_url)?;
    // Fail early with a useful error when the overlay does not exist.
    store.get_settings(overlay_id)?;

    let alert = Alert::new(
        overlay_id,
        AlertPayload {
            amount: Some(amount),
            currency: Some(currency),
            from_name: Some(from_name),
            message,
            is_test: true,
            ..AlertPayload::default()
        },
    );
    store.insert_alert(&alert)?;
    println!("{}", alert.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_command_parses_with_json_flag() {
        let cli = Cli::try_parse_from(["overlay-alerts", "run", "o1", "--json"])
            .expect("should parse");
        match cli.command {
            Commands::Run { overlay_id, json } => {
                assert_eq!(overlay_id, "o1");
                assert!(json);
            }
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn history_command_defaults_to_showing_test_alerts() {
        let cli =
            Cli::try_parse_from(["overlay-alerts", "history", "o1"]).expect("should parse");
        match cli.command {
            Commands::History {
                overlay_id,
                hide_test,
                watch,
            } => {
                assert_eq!(overlay_id, "o1");
                assert!(!hide_test);
                assert!(!watch);
            }
            other => panic!("expected History, got {other:?}"),
        }
    }

    #[test]
    fn send_test_has_usable_defaults() {
        let cli = Cli::try_parse_from(["overlay-alerts", "send-test", "o1"])
            .expect("should parse");
        match cli.command {
            Commands::SendTest {
                amount, currency, ..
            } => {
                assert_eq!(amount, "3.00");
                assert_eq!(currency, "USD");
            }
            other => panic!("expected SendTest, got {other:?}"),
        }
    }

    #[test]
    fn init_overlay_id_is_optional() {
        let cli = Cli::try_parse_from(["overlay-alerts", "init"]).expect("should parse");
        assert!(matches!(
            cli.command,
            Commands::Init { overlay_id: None }
        ));
    }

    #[test]
    fn missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["overlay-alerts"]).is_err());
    }

    #[test]
    fn format_age_buckets() {
        let now = now_micros();
        assert!(format_age(now).ends_with("s ago"));
        assert_eq!(format_age(now - 90 * 1_000_000), "1m ago");
        assert_eq!(format_age(now - 2 * 3600 * 1_000_000), "2h ago");
        assert_eq!(format_age(now - 3 * 86_400 * 1_000_000), "3d ago");
    }

    #[test]
    fn history_line_renders_best_effort_defaults() {
        let alert = Alert {
            id: "a1".into(),
            overlay_id: "o1".into(),
            created_at: now_micros(),
            payload: AlertPayload::default(),
            acknowledged: false,
        };
        let line = history_line(&alert);
        assert!(line.contains("Money from Someone"), "{line}");
        assert!(line.contains("[Donation]"), "{line}");
    }
}
