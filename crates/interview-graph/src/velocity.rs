//! Information-saturation computation (spec §4.8 stage 5, "StateComputation").
//!
//! The field's own documentation in the source this project is modeled on
//! marks `chao1_ratio` a "placeholder for future" value — no concrete
//! estimator ships there. This module supplies one: `chao1_ratio` is a
//! species-richness ratio (the Chao1 estimator from ecology, treating
//! distinct node types as "species" observed across the surface graph) —
//! as the graph samples more of a type's instances, the gap between
//! observed and estimated richness closes, so the ratio climbs toward 1.0
//! as a topic's type-space is exhausted.

use std::collections::HashMap;

use interview_types::SaturationMetrics;

/// Tracks turn-over-turn saturation inputs. Call `observe` once per turn
/// with that turn's yield and the graph's current type histogram.
#[derive(Debug, Clone, Default)]
pub struct SaturationTracker {
    consecutive_low_info: u32,
    recent_yields: Vec<bool>,
}

const NEW_INFO_WINDOW: usize = 5;

impl SaturationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrates a tracker from the counters persisted on
    /// `SessionState` — the EWMA/ring-buffer idiom used throughout this
    /// crate (cf. `NodeStateTracker::from_states`) for surviving a
    /// process restart without a dedicated saturation table.
    pub fn from_parts(consecutive_low_info: u32, recent_yields: Vec<bool>) -> Self {
        Self { consecutive_low_info, recent_yields }
    }

    pub fn consecutive_low_info(&self) -> u32 {
        self.consecutive_low_info
    }

    pub fn recent_yields(&self) -> &[bool] {
        &self.recent_yields
    }

    /// `produced_yield` is this turn's `GraphChangeSummary::produced_yield()`.
    /// `nodes_by_type` is the full surface-graph type histogram after this
    /// turn's update.
    pub fn observe(&mut self, produced_yield: bool, nodes_by_type: &HashMap<String, u32>) -> SaturationMetrics {
        if produced_yield {
            self.consecutive_low_info = 0;
        } else {
            self.consecutive_low_info += 1;
        }

        self.recent_yields.push(produced_yield);
        if self.recent_yields.len() > NEW_INFO_WINDOW {
            self.recent_yields.remove(0);
        }
        let new_info_rate = self.recent_yields.iter().filter(|y| **y).count() as f64 / self.recent_yields.len() as f64;

        SaturationMetrics {
            chao1_ratio: chao1_richness_ratio(nodes_by_type),
            consecutive_low_info: self.consecutive_low_info,
            new_info_rate,
        }
    }
}

/// `S_obs / (S_obs + f1*(f1-1)/(2*(f2+1)))`, clamped to `[0, 1]`, where
/// `f1`/`f2` are the counts of types observed exactly once/twice. Ratio
/// is 0.0 (no saturation signal) until at least one type has been seen
/// more than once — there is nothing to estimate a ceiling from yet.
fn chao1_richness_ratio(nodes_by_type: &HashMap<String, u32>) -> f64 {
    let observed_types = nodes_by_type.values().filter(|count| **count > 0).count() as f64;
    if observed_types == 0.0 {
        return 0.0;
    }

    let singletons = nodes_by_type.values().filter(|count| **count == 1).count() as f64;
    let doubletons = nodes_by_type.values().filter(|count| **count == 2).count() as f64;

    if singletons == 0.0 {
        return 1.0;
    }

    let estimated_unseen = singletons * (singletons - 1.0) / (2.0 * (doubletons + 1.0));
    let estimated_total = observed_types + estimated_unseen;
    (observed_types / estimated_total).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram(pairs: &[(&str, u32)]) -> HashMap<String, u32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn empty_graph_has_zero_chao1_ratio() {
        assert_eq!(chao1_richness_ratio(&HashMap::new()), 0.0);
    }

    #[test]
    fn all_types_seen_more_than_once_saturates_to_one() {
        let hist = histogram(&[("attribute", 4), ("consequence", 3)]);
        assert_eq!(chao1_richness_ratio(&hist), 1.0);
    }

    #[test]
    fn many_singletons_relative_to_doubletons_keeps_ratio_low() {
        let hist = histogram(&[("a", 1), ("b", 1), ("c", 1), ("d", 1), ("e", 2)]);
        let ratio = chao1_richness_ratio(&hist);
        assert!(ratio < 0.9, "ratio {ratio} should stay below the saturation threshold while singletons dominate");
    }

    #[test]
    fn consecutive_low_info_resets_on_yield() {
        let mut tracker = SaturationTracker::new();
        let hist = histogram(&[("attribute", 1)]);
        tracker.observe(false, &hist);
        tracker.observe(false, &hist);
        let metrics = tracker.observe(false, &hist);
        assert_eq!(metrics.consecutive_low_info, 3);

        let metrics = tracker.observe(true, &hist);
        assert_eq!(metrics.consecutive_low_info, 0);
    }

    #[test]
    fn new_info_rate_is_windowed_yield_fraction() {
        let mut tracker = SaturationTracker::new();
        let hist = histogram(&[("attribute", 1)]);
        for produced in [true, true, false, false, false, false] {
            tracker.observe(produced, &hist);
        }
        let metrics = tracker.observe(false, &hist);
        assert_eq!(metrics.new_info_rate, 0.0);
    }

    #[test]
    fn is_saturated_fires_on_sustained_low_info() {
        let mut tracker = SaturationTracker::new();
        let hist = histogram(&[("attribute", 1)]);
        tracker.observe(false, &hist);
        tracker.observe(false, &hist);
        let metrics = tracker.observe(false, &hist);
        assert!(metrics.is_saturated());
    }
}
