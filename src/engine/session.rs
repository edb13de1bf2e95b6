//! The timeline engine. One instance per viewing session, normally driven
//! from its own task by [`TimelineEngine::run`].

use super::speed::SpeedFactor;
use super::steps::STEPS;
use super::timeline::{Marker, RunPhase, Snapshot, TimelineState};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub enum EngineCommand {
    Start { speed: SpeedFactor },
    Reset,
    Quit,
}

/// Receives every frame the engine renders.
pub trait FrameSink: Send {
    fn emit(&mut self, frame: Snapshot);
}

/// Latest-frame-wins. Suits a redraw loop that only needs the current state.
impl FrameSink for watch::Sender<Snapshot> {
    fn emit(&mut self, frame: Snapshot) {
        self.send_replace(frame);
    }
}

/// Every frame, in order.
impl FrameSink for mpsc::UnboundedSender<Snapshot> {
    fn emit(&mut self, frame: Snapshot) {
        if self.send(frame).is_err() {
            tracing::debug!("frame dropped: receiver closed");
        }
    }
}

impl FrameSink for Vec<Snapshot> {
    fn emit(&mut self, frame: Snapshot) {
        self.push(frame);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTiming {
    /// Delay after each step at speed 1.0.
    pub base_step_delay: Duration,
    /// Sub-frames drawn per hop between two distinct nodes.
    pub motion_frames: u32,
    pub continuous_motion: bool,
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self {
            base_step_delay: Duration::from_millis(1500),
            motion_frames: 10,
            continuous_motion: true,
        }
    }
}

impl AnimationTiming {
    pub fn step_delay(&self, speed: SpeedFactor) -> Duration {
        self.base_step_delay.div_f64(speed.get())
    }

    pub fn frame_delay(&self, speed: SpeedFactor) -> Duration {
        self.step_delay(speed) / self.motion_frames.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// A run was already in progress.
    Ignored,
    /// Reset arrived mid-run; state is back at defaults.
    Cancelled,
    /// Quit arrived mid-run.
    Shutdown,
}

enum Interrupt {
    Reset,
    Quit,
}

pub struct TimelineEngine<S> {
    state: TimelineState,
    sink: S,
    timing: AnimationTiming,
}

impl<S: FrameSink> TimelineEngine<S> {
    pub fn new(sink: S, timing: AnimationTiming) -> Self {
        Self {
            state: TimelineState::default(),
            sink,
            timing,
        }
    }

    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Session loop. Handles commands until `Quit` or until every sender is
    /// dropped, then hands the engine back.
    pub async fn run(mut self, mut commands: mpsc::Receiver<EngineCommand>) -> Self {
        while let Some(cmd) = commands.recv().await {
            match cmd {
                EngineCommand::Start { speed } => {
                    if self.start(speed, &mut commands).await == RunOutcome::Shutdown {
                        break;
                    }
                }
                EngineCommand::Reset => self.reset(),
                EngineCommand::Quit => break,
            }
        }
        tracing::debug!("timeline session closed");
        self
    }

    pub fn reset(&mut self) {
        self.state = TimelineState::default();
        tracing::info!("timeline reset");
        self.publish(self.state.resting_snapshot());
    }

    /// Walk every step in order, suspending between frames. Commands that
    /// arrive on `commands` meanwhile are honoured at each suspension point:
    /// `Reset` cancels, `Quit` shuts down, `Start` is ignored.
    pub async fn start(
        &mut self,
        speed: SpeedFactor,
        commands: &mut mpsc::Receiver<EngineCommand>,
    ) -> RunOutcome {
        if self.state.is_running() {
            tracing::debug!("start ignored: run already in progress");
            return RunOutcome::Ignored;
        }

        self.state = TimelineState {
            phase: RunPhase::Running,
            ..TimelineState::default()
        };
        let started = Instant::now();
        let step_delay = self.timing.step_delay(speed);
        let frame_delay = self.timing.frame_delay(speed);
        tracing::info!(
            speed = speed.get(),
            step_delay_ms = step_delay.as_millis() as u64,
            motion = self.timing.continuous_motion,
            "run started"
        );

        let mut previous_node: Option<usize> = None;
        for (i, step) in STEPS.iter().enumerate() {
            if let Some(from) = previous_node {
                if self.timing.continuous_motion && from != step.node_index {
                    let frames = self.timing.motion_frames;
                    for k in 0..frames {
                        let t = f64::from(k) / f64::from(frames);
                        self.state.elapsed_seconds = started.elapsed().as_secs_f64();
                        self.publish(self.state.snapshot(Marker::InTransit {
                            from,
                            to: step.node_index,
                            t,
                        }));
                        if let Some(interrupt) = suspend(frame_delay, commands).await {
                            return self.interrupted(interrupt);
                        }
                    }
                }
            }

            self.state.current_step_index = i;
            if step.is_security_relevant {
                self.state.security_check_count += 1;
            }
            self.state.elapsed_seconds = started.elapsed().as_secs_f64();
            tracing::info!(
                step = i,
                node = step.node_index,
                security = step.is_security_relevant,
                title = step.title,
                "step reached"
            );
            self.publish(self.state.resting_snapshot());

            if let Some(interrupt) = suspend(step_delay, commands).await {
                return self.interrupted(interrupt);
            }
            previous_node = Some(step.node_index);
        }

        self.state.phase = RunPhase::Completed;
        self.state.elapsed_seconds = started.elapsed().as_secs_f64();
        tracing::info!(
            elapsed_s = self.state.elapsed_seconds,
            security_checks = self.state.security_check_count,
            hops = self.state.hop_count(),
            "run completed"
        );
        self.publish(self.state.resting_snapshot());
        RunOutcome::Completed
    }

    fn interrupted(&mut self, interrupt: Interrupt) -> RunOutcome {
        match interrupt {
            Interrupt::Reset => {
                tracing::info!(step = self.state.current_step_index, "run cancelled");
                self.reset();
                RunOutcome::Cancelled
            }
            Interrupt::Quit => {
                tracing::info!(step = self.state.current_step_index, "run abandoned on quit");
                self.state = TimelineState::default();
                self.publish(self.state.resting_snapshot());
                RunOutcome::Shutdown
            }
        }
    }

    fn publish(&mut self, frame: Snapshot) {
        self.sink.emit(frame);
    }
}

/// Sleep for `delay` while watching for commands. A closed channel just
/// lets the sleep finish.
async fn suspend(
    delay: Duration,
    commands: &mut mpsc::Receiver<EngineCommand>,
) -> Option<Interrupt> {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    let mut open = true;
    loop {
        tokio::select! {
            biased;
            cmd = commands.recv(), if open => match cmd {
                Some(EngineCommand::Start { .. }) => {
                    tracing::debug!("start ignored: run already in progress");
                }
                Some(EngineCommand::Reset) => return Some(Interrupt::Reset),
                Some(EngineCommand::Quit) => return Some(Interrupt::Quit),
                None => open = false,
            },
            _ = &mut sleep => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::speed::SpeedRange;

    fn speed(v: f64) -> SpeedFactor {
        SpeedFactor::new(v, &SpeedRange::default()).unwrap()
    }

    #[test]
    fn test_step_delay_scales_with_speed() {
        let timing = AnimationTiming::default();
        assert_eq!(timing.step_delay(speed(1.0)), Duration::from_millis(1500));
        assert_eq!(timing.step_delay(speed(3.0)), Duration::from_millis(500));
        assert_eq!(timing.step_delay(speed(0.5)), Duration::from_millis(3000));
    }

    #[test]
    fn test_frame_delay_is_tenth_of_step() {
        let timing = AnimationTiming::default();
        assert_eq!(timing.frame_delay(speed(1.0)), Duration::from_millis(150));
    }

    #[test]
    fn test_zero_motion_frames_does_not_divide_by_zero() {
        let timing = AnimationTiming {
            motion_frames: 0,
            ..AnimationTiming::default()
        };
        assert_eq!(timing.frame_delay(speed(1.0)), Duration::from_millis(1500));
    }

    #[test]
    fn test_reset_publishes_default_frame() {
        let mut engine = TimelineEngine::new(Vec::new(), AnimationTiming::default());
        engine.reset();
        assert_eq!(engine.state(), &TimelineState::default());
        assert_eq!(engine.sink().as_slice(), &[Snapshot::default()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_is_ignored() {
        let mut engine = TimelineEngine::new(Vec::new(), AnimationTiming::default());
        engine.state.phase = RunPhase::Running;
        engine.state.elapsed_seconds = 4.2;
        let (_tx, mut rx) = mpsc::channel(1);
        assert_eq!(engine.start(speed(1.0), &mut rx).await, RunOutcome::Ignored);
        assert_eq!(engine.state().elapsed_seconds, 4.2);
        assert!(engine.sink().is_empty());
    }

    #[test]
    fn test_closed_receiver_drops_frames_quietly() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut engine = TimelineEngine::new(tx, AnimationTiming::default());
        engine.reset();
        assert!(engine.sink().is_closed());
    }
}
