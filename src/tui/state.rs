use crate::config::{Config, Protocol, RenderMode};
use crate::engine::{RunPhase, Snapshot, SpeedFactor, SpeedRange, STEPS};
use anyhow::Result;
use std::collections::VecDeque;

const MAX_LOGS: usize = 200;

/// Everything the dashboard draws. The engine's part arrives as a
/// [`Snapshot`] and is never modified here.
#[derive(Debug, Clone)]
pub struct AppState {
    pub snapshot: Snapshot,
    pub destination: String,
    pub editing_destination: bool,
    pub edit_buffer: String,
    pub protocol: Protocol,
    pub speed: SpeedFactor,
    pub speed_range: SpeedRange,
    pub render_mode: RenderMode,
    pub show_info: bool,
    /// Step catalogue shows each step's description.
    pub show_step_details: bool,
    pub logs: VecDeque<LogEntry>,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub message: String,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            snapshot: Snapshot::default(),
            destination: config.session.destination.clone(),
            editing_destination: false,
            edit_buffer: String::new(),
            protocol: config.session.protocol,
            speed: config.animation.initial_speed()?,
            speed_range: config.animation.speed_range(),
            render_mode: config.display.render_mode,
            show_info: false,
            show_step_details: false,
            logs: VecDeque::with_capacity(MAX_LOGS),
        })
    }

    pub fn push_log(&mut self, level: &str, message: String) {
        let time = chrono::Local::now().format("%H:%M:%S%.3f").to_string();
        if self.logs.len() >= MAX_LOGS {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            time,
            level: level.to_string(),
            message,
        });
    }

    /// Take the latest engine frame, logging step and phase transitions.
    pub fn apply_snapshot(&mut self, snap: Snapshot) {
        let phase_changed = snap.phase != self.snapshot.phase;
        let step_changed = snap.current_step_index != self.snapshot.current_step_index;

        match snap.phase {
            RunPhase::Running if phase_changed || step_changed => {
                if let Some(step) = STEPS.get(snap.current_step_index) {
                    let badge = if step.is_security_relevant { " [secured]" } else { "" };
                    self.push_log("STEP", format!("{}{}", step.title, badge));
                }
            }
            RunPhase::Completed if phase_changed => {
                self.push_log(
                    "INFO",
                    format!(
                        "Transmission to {} successful in {:.1}s ({} hops, {} security checks)",
                        self.destination, snap.elapsed_seconds, snap.hop_count, snap.security_check_count
                    ),
                );
            }
            RunPhase::Idle if phase_changed => {
                self.push_log("INFO", "Timeline reset".to_string());
            }
            _ => {}
        }

        self.snapshot = snap;
    }

    pub fn speed_faster(&mut self) {
        self.speed = self.speed_range.faster(self.speed);
    }

    pub fn speed_slower(&mut self) {
        self.speed = self.speed_range.slower(self.speed);
    }

    /// Where the slider knob sits, `0.0..=1.0`.
    pub fn speed_fraction(&self) -> f64 {
        let span = self.speed_range.max - self.speed_range.min;
        if span <= 0.0 {
            return 1.0;
        }
        ((self.speed.get() - self.speed_range.min) / span).clamp(0.0, 1.0)
    }
}
