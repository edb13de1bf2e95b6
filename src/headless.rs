//! Terminal-free presentation: runs one timeline and prints every frame as a
//! JSON line.

use crate::config::Config;
use crate::engine::{EngineCommand, RunPhase, TimelineEngine};
use anyhow::{Context, Result};
use std::io::Write;
use tokio::sync::mpsc;

pub async fn run_headless<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    let speed = config.animation.initial_speed()?;
    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::channel(16);

    let engine = TimelineEngine::new(frame_tx, config.animation.timing());
    let session = tokio::spawn(engine.run(cmd_rx));

    tracing::info!(
        destination = %config.session.destination,
        protocol = config.session.protocol.label(),
        speed = speed.get(),
        "headless run"
    );
    cmd_tx
        .send(EngineCommand::Start { speed })
        .await
        .context("timeline engine exited before start")?;

    while let Some(frame) = frame_rx.recv().await {
        let line = serde_json::to_string(&frame)?;
        writeln!(out, "{}", line)?;
        if frame.phase == RunPhase::Completed {
            break;
        }
    }
    out.flush()?;

    let _ = cmd_tx.send(EngineCommand::Quit).await;
    session.await.context("timeline session failed")?;
    Ok(())
}
