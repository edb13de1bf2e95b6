//! Session timeline state and the pure queries a renderer needs per frame.

use super::steps::{security_checks_through, STEPS, STEP_COUNT, TLS_ENCRYPTION_STEP};
use super::topology::{interpolated_position, node_position, Position};
use serde::Serialize;
use std::collections::HashSet;

pub const PLAIN_GLYPH: &str = "📦";
pub const ENCRYPTED_GLYPH: &str = "🔒";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    /// Reached the last step by running, as opposed to a fresh reset.
    Completed,
}

/// Mutable per-session state. Only the engine writes it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimelineState {
    pub phase: RunPhase,
    pub current_step_index: usize,
    pub elapsed_seconds: f64,
    pub security_check_count: u32,
}

impl TimelineState {
    /// State as it would be after a run reached step `index`, not running.
    pub fn at_step(index: usize) -> Self {
        Self {
            phase: RunPhase::Idle,
            current_step_index: index,
            elapsed_seconds: 0.0,
            security_check_count: security_checks_through(index),
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    pub fn current_node_index(&self) -> usize {
        STEPS
            .get(self.current_step_index)
            .map_or(STEPS[0].node_index, |s| s.node_index)
    }

    /// Distinct nodes touched so far, minus one. Repeated steps at the same
    /// node are not hops.
    pub fn hop_count(&self) -> usize {
        let end = self.current_step_index.saturating_add(1).min(STEP_COUNT);
        let distinct: HashSet<usize> = STEPS[..end].iter().map(|s| s.node_index).collect();
        distinct.len().saturating_sub(1)
    }

    pub fn packet_marker_glyph(&self) -> &'static str {
        if self.current_step_index >= TLS_ENCRYPTION_STEP {
            ENCRYPTED_GLYPH
        } else {
            PLAIN_GLYPH
        }
    }

    pub fn snapshot(&self, marker: Marker) -> Snapshot {
        Snapshot {
            phase: self.phase,
            is_running: self.is_running(),
            current_step_index: self.current_step_index,
            current_node_index: self.current_node_index(),
            elapsed_seconds: self.elapsed_seconds,
            security_check_count: self.security_check_count,
            hop_count: self.hop_count(),
            packet_marker_glyph: self.packet_marker_glyph(),
            marker,
        }
    }

    /// Snapshot with the marker resting on the current node.
    pub fn resting_snapshot(&self) -> Snapshot {
        self.snapshot(Marker::AtNode(self.current_node_index()))
    }
}

/// Where the packet glyph is drawn in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Marker {
    AtNode(usize),
    InTransit { from: usize, to: usize, t: f64 },
}

impl Marker {
    pub fn position(&self) -> Position {
        match *self {
            Marker::AtNode(i) => node_position(i),
            Marker::InTransit { from, to, t } => interpolated_position(from, to, t),
        }
    }

    /// Fractional node slot, `0.0` at the client and `NODE_COUNT - 1` at the
    /// server. Box layouts place the glyph proportionally with this.
    pub fn slot(&self) -> f64 {
        match *self {
            Marker::AtNode(i) => i as f64,
            Marker::InTransit { from, to, t } => {
                let t = t.clamp(0.0, 1.0);
                from as f64 + (to as f64 - from as f64) * t
            }
        }
    }
}

/// Read-only view of one rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: RunPhase,
    pub is_running: bool,
    pub current_step_index: usize,
    pub current_node_index: usize,
    pub elapsed_seconds: f64,
    pub security_check_count: u32,
    pub hop_count: usize,
    pub packet_marker_glyph: &'static str,
    pub marker: Marker,
}

impl Default for Snapshot {
    fn default() -> Self {
        TimelineState::default().resting_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = TimelineState::default();
        assert_eq!(s.phase, RunPhase::Idle);
        assert!(!s.is_running());
        assert_eq!(s.current_step_index, 0);
        assert_eq!(s.elapsed_seconds, 0.0);
        assert_eq!(s.security_check_count, 0);
    }

    #[test]
    fn test_current_node_follows_step_table() {
        for (i, step) in STEPS.iter().enumerate() {
            assert_eq!(TimelineState::at_step(i).current_node_index(), step.node_index);
        }
    }

    #[test]
    fn test_current_node_clamps_out_of_range() {
        let s = TimelineState::at_step(STEP_COUNT + 3);
        assert_eq!(s.current_node_index(), 0);
    }

    #[test]
    fn test_hop_count_ignores_repeated_nodes() {
        let hops: Vec<usize> = (0..STEP_COUNT)
            .map(|i| TimelineState::at_step(i).hop_count())
            .collect();
        assert_eq!(hops, vec![0, 0, 0, 1, 2, 3, 4, 5, 5]);
    }

    #[test]
    fn test_hop_count_out_of_range_is_total() {
        assert_eq!(TimelineState::at_step(100).hop_count(), 5);
    }

    #[test]
    fn test_glyph_switches_at_tls_step() {
        assert_eq!(TimelineState::at_step(0).packet_marker_glyph(), PLAIN_GLYPH);
        assert_eq!(TimelineState::at_step(1).packet_marker_glyph(), PLAIN_GLYPH);
        for i in 2..STEP_COUNT {
            assert_eq!(TimelineState::at_step(i).packet_marker_glyph(), ENCRYPTED_GLYPH);
        }
    }

    #[test]
    fn test_security_count_bounded_by_visits() {
        for i in 0..STEP_COUNT {
            let s = TimelineState::at_step(i);
            assert!(s.security_check_count as usize <= i + 1);
            assert!(s.security_check_count <= 3);
        }
    }

    #[test]
    fn test_marker_slot() {
        assert_eq!(Marker::AtNode(3).slot(), 3.0);
        let m = Marker::InTransit { from: 1, to: 2, t: 0.25 };
        assert!((m.slot() - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_carries_derived_metrics() {
        let snap = TimelineState::at_step(6).resting_snapshot();
        assert_eq!(snap.current_node_index, 4);
        assert_eq!(snap.hop_count, 4);
        assert_eq!(snap.security_check_count, 3);
        assert_eq!(snap.packet_marker_glyph, ENCRYPTED_GLYPH);
        assert_eq!(snap.marker, Marker::AtNode(4));
    }

    #[test]
    fn test_snapshot_serializes_marker_tag() {
        let json = serde_json::to_string(&Snapshot::default()).unwrap();
        assert!(json.contains("\"phase\":\"idle\""));
        assert!(json.contains("\"kind\":\"at_node\""));
    }
}
