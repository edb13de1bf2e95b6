pub mod input;
pub mod render;
pub mod state;

use crate::engine::{EngineCommand, Snapshot};
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures_util::StreamExt;
use ratatui::prelude::*;
use state::AppState;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Run the dashboard. Reads frames from `state_rx`, sends commands on
/// `cmd_tx`. Returns after the user quits or the engine goes away.
pub async fn run_tui(
    app: AppState,
    state_rx: watch::Receiver<Snapshot>,
    cmd_tx: mpsc::Sender<EngineCommand>,
    tick_rate: Duration,
) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = tui_loop(&mut terminal, app, state_rx, cmd_tx, tick_rate).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut app: AppState,
    mut state_rx: watch::Receiver<Snapshot>,
    cmd_tx: mpsc::Sender<EngineCommand>,
    tick_rate: Duration,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(tick_rate);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut spinner_frame: u8 = 0;

    loop {
        let snapshot = state_rx.borrow_and_update().clone();
        app.apply_snapshot(snapshot);
        terminal.draw(|f| render::draw(f, &app, spinner_frame))?;

        tokio::select! {
            _ = ticker.tick() => {
                if app.snapshot.is_running {
                    spinner_frame = spinner_frame.wrapping_add(1);
                }
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    tracing::warn!("timeline engine stopped, closing dashboard");
                    return Ok(());
                }
            }
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if let Some(cmd) = input::handle_key(&mut app, key) {
                        let quit = matches!(cmd, EngineCommand::Quit);
                        if cmd_tx.send(cmd).await.is_err() {
                            tracing::warn!("timeline engine not accepting commands");
                            return Ok(());
                        }
                        if quit {
                            return Ok(());
                        }
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
        }
    }
}
