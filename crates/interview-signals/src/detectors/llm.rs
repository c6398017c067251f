//! `llm.*` detectors (spec §4.3). Recomputed fresh from the current
//! response every turn — never cached, since a participant's engagement
//! can shift turn to turn in either direction.

use interview_core::text_heuristics::{
    ambiguity_score, hedging_language_label, response_depth_label, sentiment_label, uncertainty_score,
};
use interview_types::{ResponseDepth, SignalMap};

use crate::registry::{DetectorContext, GlobalSignalDetector, Pool, SignalRegistry};

pub fn register(registry: &mut SignalRegistry) {
    registry.register_global(Box::new(ResponseQualityDetector));
    registry.register_global(Box::new(TrendDetector));
}

struct ResponseQualityDetector;

impl GlobalSignalDetector for ResponseQualityDetector {
    fn name(&self) -> &'static str {
        "llm.quality"
    }
    fn pool(&self) -> Pool {
        Pool::Llm
    }
    fn detect(&self, ctx: &DetectorContext) -> SignalMap {
        let text = ctx.current_response_text;
        let mut out = SignalMap::new();
        out.insert("llm.response_depth".into(), response_depth_label(text).into());
        out.insert("llm.sentiment".into(), sentiment_label(text).into());
        out.insert("llm.uncertainty".into(), uncertainty_score(text).into());
        out.insert("llm.ambiguity".into(), ambiguity_score(text).into());
        out.insert("llm.hedging_language".into(), hedging_language_label(text).into());
        out
    }
}

const TREND_WINDOW: usize = 10;

struct TrendDetector;

impl GlobalSignalDetector for TrendDetector {
    fn name(&self) -> &'static str {
        "llm.trend"
    }
    fn pool(&self) -> Pool {
        Pool::Llm
    }
    fn detect(&self, ctx: &DetectorContext) -> SignalMap {
        let mut out = SignalMap::new();
        let window: Vec<&ResponseDepth> = ctx.response_depths_window.iter().rev().take(TREND_WINDOW).collect();
        out.insert("llm.global_response_trend".into(), classify_trend(&window).into());
        out
    }
}

/// `fatigued` iff >=4 of the last 5 (most-recent-first) are surface/shallow;
/// otherwise compares the earlier vs. later half of the window to call
/// `deepening`/`shallowing`/`stable`.
fn classify_trend(most_recent_first: &[&ResponseDepth]) -> &'static str {
    let last_five: Vec<&&ResponseDepth> = most_recent_first.iter().take(5).collect();
    if !last_five.is_empty() {
        let shallow_count = last_five.iter().filter(|d| d.is_shallow_ish()).count();
        if last_five.len() >= 5 && shallow_count >= 4 {
            return "fatigued";
        }
    }

    if most_recent_first.len() < 2 {
        return "stable";
    }

    let half = most_recent_first.len() / 2;
    let recent_avg = depth_score_avg(&most_recent_first[..half]);
    let older_avg = depth_score_avg(&most_recent_first[half..]);

    if recent_avg - older_avg > 0.15 {
        "deepening"
    } else if older_avg - recent_avg > 0.15 {
        "shallowing"
    } else {
        "stable"
    }
}

fn depth_score_avg(depths: &[&ResponseDepth]) -> f64 {
    if depths.is_empty() {
        return 0.0;
    }
    let sum: f64 = depths
        .iter()
        .map(|d| match d {
            ResponseDepth::Surface => 0.0,
            ResponseDepth::Shallow => 1.0,
            ResponseDepth::Moderate => 2.0,
            ResponseDepth::Deep => 3.0,
        })
        .sum();
    sum / depths.len() as f64
}
