use anyhow::Result;
use packet_viz::config::{self, Config};
use packet_viz::engine::{Snapshot, TimelineEngine};
use packet_viz::{headless, tui};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let headless_mode = args.iter().any(|arg| arg == "--headless");

    let log_file = std::fs::File::create("packet-viz.log")?;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("packet_viz=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let mut config = Config::load_or_default(config::config_path(&args))?;
    config.apply_args(&args)?;
    tracing::debug!(?config, "configuration loaded");

    if headless_mode {
        let stdout = std::io::stdout();
        return headless::run_headless(&config, &mut stdout.lock()).await;
    }

    let app = tui::state::AppState::from_config(&config)?;

    // One engine task per viewing session.
    let (state_tx, state_rx) = watch::channel(Snapshot::default());
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let engine = TimelineEngine::new(state_tx, config.animation.timing());
    let session = tokio::spawn(engine.run(cmd_rx));

    let result = tui::run_tui(
        app,
        state_rx,
        cmd_tx,
        Duration::from_millis(config.display.tick_rate_ms),
    )
    .await;

    session.abort();
    tracing::debug!("shutting down");
    result
}
