use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::BoundedRing;
use crate::ids::SessionId;
use crate::node_state::ResponseDepth;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Abandoned,
}

/// Per-graph-kind EWMA velocity tracker used by saturation signals
/// (spec §4.8 stage 10): `delta = max(current - prev, 0)`,
/// `ewma' = α·delta + (1-α)·ewma`, `peak' = max(peak, delta)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VelocityTracker {
    pub prev_count: u32,
    pub ewma: f64,
    pub peak: f64,
}

impl VelocityTracker {
    const ALPHA: f64 = 0.4;

    pub fn observe(&mut self, current_count: u32) -> f64 {
        let delta = current_count.saturating_sub(self.prev_count) as f64;
        self.ewma = Self::ALPHA * delta + (1.0 - Self::ALPHA) * self.ewma;
        self.peak = self.peak.max(delta);
        self.prev_count = current_count;
        delta
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VelocityState {
    pub surface: VelocityTracker,
    pub canonical: VelocityTracker,
}

/// Mutable per-session state carried across turns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub turn_count: u32,
    pub last_strategy: Option<String>,
    pub focus_history: BoundedRing<String>,
    /// Selected strategy per turn, oldest first — what `GraphState`'s
    /// `strategy_history` and the `temporal.*` detectors key on.
    pub strategy_history: BoundedRing<String>,
    pub velocity: VelocityState,
    pub recent_node_labels: BoundedRing<String>,
    /// Rehydrates `interview_graph::velocity::SaturationTracker` across
    /// process restarts (spec §4.8 stage 5 saturation signals).
    pub saturation_consecutive_low_info: u32,
    pub saturation_recent_yields: Vec<bool>,
    /// Last `RESPONSE_DEPTH_WINDOW` response-depth classifications, oldest
    /// first — feeds `llm.global_response_trend` (spec §4.3).
    pub response_depth_window: BoundedRing<ResponseDepth>,
}

/// Default size of `SessionState::response_depth_window` (spec §4.3:
/// "last N, default 10").
pub const RESPONSE_DEPTH_WINDOW: usize = 10;

impl SessionState {
    pub fn new() -> Self {
        Self {
            turn_count: 0,
            last_strategy: None,
            focus_history: BoundedRing::new(30),
            strategy_history: BoundedRing::new(30),
            velocity: VelocityState::default(),
            recent_node_labels: BoundedRing::new(30),
            saturation_consecutive_low_info: 0,
            saturation_recent_yields: Vec::new(),
            response_depth_window: BoundedRing::new(RESPONSE_DEPTH_WINDOW),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub methodology: String,
    pub concept_id: String,
    pub concept_name: String,
    pub status: SessionStatus,
    pub state: SessionState,
    pub max_turns: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(methodology: impl Into<String>, concept_id: impl Into<String>, concept_name: impl Into<String>, max_turns: u32) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::generate(),
            methodology: methodology.into(),
            concept_id: concept_id.into(),
            concept_name: concept_name.into(),
            status: SessionStatus::Active,
            state: SessionState::new(),
            max_turns,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_tracker_tracks_peak_and_ewma() {
        let mut v = VelocityTracker::default();
        let d1 = v.observe(2);
        assert_eq!(d1, 2.0);
        assert_eq!(v.ewma, 0.8);
        assert_eq!(v.peak, 2.0);

        let d2 = v.observe(3);
        assert_eq!(d2, 1.0);
        assert!((v.ewma - (0.4 * 1.0 + 0.6 * 0.8)).abs() < 1e-9);
        assert_eq!(v.peak, 2.0);
    }

    #[test]
    fn velocity_tracker_clamps_negative_delta_to_zero() {
        let mut v = VelocityTracker::default();
        v.observe(5);
        let delta = v.observe(3);
        assert_eq!(delta, 0.0);
    }
}
