//! Custom assertion helpers for graph/session state, kept as plain
//! functions that panic with a descriptive message rather than a trait,
//! so call sites read like ordinary `assert!`s.

use interview_repo::{InMemoryRepositories, NodeStateRepository, SurfaceGraphRepository};
use interview_signals::detectors::graph::exhaustion_score;
use interview_types::{SessionId, TurnResult};

pub async fn assert_node_count_at_least(repo: &InMemoryRepositories, session_id: &SessionId, minimum: usize) {
    let nodes = repo
        .active_nodes(session_id)
        .await
        .expect("listing active nodes should not fail against an in-memory store");
    assert!(
        nodes.len() >= minimum,
        "expected at least {minimum} active node(s), found {}",
        nodes.len()
    );
}

pub async fn assert_node_state_exhausted(repo: &InMemoryRepositories, session_id: &SessionId, label: &str) {
    let states = repo
        .node_states_for_session(session_id)
        .await
        .expect("listing node states should not fail against an in-memory store");
    let matched = states.iter().find(|s| s.label == label);
    match matched {
        Some(state) => {
            let score = exhaustion_score(state);
            assert!(score >= 0.7, "expected slot '{label}' to be exhausted, exhaustion_score was {score}");
        }
        None => panic!("no node state found for slot '{label}'"),
    }
}

pub fn assert_continues(result: &TurnResult) {
    assert!(result.should_continue, "expected the session to continue");
}

pub fn assert_stops(result: &TurnResult) {
    assert!(!result.should_continue, "expected the session to stop, but should_continue was true");
}

pub fn assert_asked_non_empty_question(result: &TurnResult) {
    assert!(!result.next_question.trim().is_empty(), "expected a non-empty follow-up question");
}
