//! Reasoning-chain depth (spec §4.8 stage 5, §9 Open Question 1).
//!
//! The graph is walked as undirected: a "chain" is the longest simple path
//! reachable from a node regardless of edge direction, because laddering
//! interviews often loop back ("so that's important because...") and the
//! ladder's psychological depth is about *distance traveled*, not about
//! following edges forward only.
//!
//! Open Question 1 resolution: ladder length is methodology-configured
//! (`Methodology::ladder_length`) rather than a fixed constant. There is
//! no safe default — a silently-wrong ladder length would silently distort
//! every depth-derived signal and score — so callers must supply it; see
//! `DepthCalculator::new`.

use std::collections::{HashMap, HashSet};

use interview_types::{DepthMetrics, KGEdge, KGNode, NodeId};

pub struct DepthCalculator {
    ladder_length: u32,
}

impl DepthCalculator {
    /// `ladder_length` must be `>= 1`; it is the methodology's configured
    /// maximum ladder rungs (e.g. means-end-chain interviews conventionally
    /// use 5: attribute -> functional consequence -> psychosocial
    /// consequence -> instrumental value -> terminal value).
    pub fn new(ladder_length: u32) -> Self {
        Self { ladder_length: ladder_length.max(1) }
    }

    pub fn compute(&self, nodes: &[KGNode], edges: &[KGEdge]) -> DepthMetrics {
        if nodes.is_empty() {
            return DepthMetrics::default();
        }

        let mut adjacency: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for node in nodes {
            adjacency.entry(node.id.clone()).or_default();
        }
        for edge in edges {
            adjacency.entry(edge.source_node_id.clone()).or_default().push(edge.target_node_id.clone());
            adjacency.entry(edge.target_node_id.clone()).or_default().push(edge.source_node_id.clone());
        }

        let mut longest_path: Vec<NodeId> = Vec::new();
        let mut depth_by_node: HashMap<NodeId, u32> = HashMap::new();

        for node in nodes {
            let mut visited = HashSet::new();
            let mut path = vec![node.id.clone()];
            visited.insert(node.id.clone());
            let chain = longest_chain_from(&node.id, &adjacency, &mut visited, &mut path);

            depth_by_node.insert(node.id.clone(), (chain.len() as u32).saturating_sub(1));
            if chain.len() > longest_path.len() {
                longest_path = chain;
            }
        }

        // A lone node still counts as depth 1 — `max_depth` measures rungs
        // reached, and reaching the first node is reaching one rung.
        let max_depth = longest_path.len().saturating_sub(1).max(1) as u32;
        let avg_depth = if depth_by_node.is_empty() {
            0.0
        } else {
            depth_by_node.values().map(|d| *d as f64).sum::<f64>() / depth_by_node.len() as f64
        };

        let depth_by_element = nodes
            .iter()
            .map(|n| {
                let depth = depth_by_node.get(&n.id).copied().unwrap_or(0);
                (n.id.to_string(), depth as f64 / self.ladder_length as f64)
            })
            .collect();

        DepthMetrics { max_depth, avg_depth, depth_by_element, longest_chain_path: longest_path }
    }
}

/// Depth-first backtracking search for the longest simple path starting at
/// `current`. Each candidate path carries its own visited set (passed by
/// reference and restored on backtrack) rather than a single shared set,
/// so sibling branches don't spuriously prune each other.
fn longest_chain_from(
    current: &NodeId,
    adjacency: &HashMap<NodeId, Vec<NodeId>>,
    visited: &mut HashSet<NodeId>,
    path: &mut Vec<NodeId>,
) -> Vec<NodeId> {
    let mut best = path.clone();

    if let Some(neighbors) = adjacency.get(current) {
        for neighbor in neighbors {
            if visited.contains(neighbor) {
                continue;
            }
            visited.insert(neighbor.clone());
            path.push(neighbor.clone());

            let candidate = longest_chain_from(neighbor, adjacency, visited, path);
            if candidate.len() > best.len() {
                best = candidate;
            }

            path.pop();
            visited.remove(neighbor);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_types::SessionId;

    #[test]
    fn empty_graph_has_zero_depth() {
        let calc = DepthCalculator::new(5);
        let metrics = calc.compute(&[], &[]);
        assert_eq!(metrics.max_depth, 0);
        assert!(metrics.longest_chain_path.is_empty());
    }

    #[test]
    fn single_node_has_depth_one() {
        let calc = DepthCalculator::new(5);
        let session_id = SessionId::generate();
        let node = KGNode::new(session_id, "creamy", "attribute", 0.9, 1);
        let metrics = calc.compute(&[node], &[]);
        assert_eq!(metrics.max_depth, 1);
        assert_eq!(metrics.avg_depth, 0.0);
    }

    #[test]
    fn linear_chain_reports_its_full_length_as_max_depth() {
        let calc = DepthCalculator::new(5);
        let session_id = SessionId::generate();
        let a = KGNode::new(session_id.clone(), "creamy", "attribute", 0.9, 1);
        let b = KGNode::new(session_id.clone(), "satisfying", "functional_consequence", 0.9, 1);
        let c = KGNode::new(session_id.clone(), "healthy_lifestyle", "terminal_value", 0.9, 1);
        let e1 = KGEdge::new(session_id.clone(), a.id.clone(), b.id.clone(), "leads_to", 0.9);
        let e2 = KGEdge::new(session_id.clone(), b.id.clone(), c.id.clone(), "leads_to", 0.9);
        let metrics = calc.compute(&[a, b, c], &[e1, e2]);
        assert_eq!(metrics.max_depth, 2);
        assert_eq!(metrics.longest_chain_path.len(), 3);
    }

    #[test]
    fn depth_score_is_normalized_by_ladder_length() {
        let calc = DepthCalculator::new(4);
        let session_id = SessionId::generate();
        let a = KGNode::new(session_id.clone(), "creamy", "attribute", 0.9, 1);
        let b = KGNode::new(session_id.clone(), "satisfying", "functional_consequence", 0.9, 1);
        let e = KGEdge::new(session_id.clone(), a.id.clone(), b.id.clone(), "leads_to", 0.9);
        let metrics = calc.compute(&[a.clone(), b], &[e]);
        assert_eq!(metrics.depth_by_element.get(&a.id.to_string()).copied().unwrap(), 1.0 / 4.0);
    }

    #[test]
    fn a_cycle_does_not_loop_forever_and_treats_edges_as_undirected() {
        let calc = DepthCalculator::new(5);
        let session_id = SessionId::generate();
        let a = KGNode::new(session_id.clone(), "a", "attribute", 0.9, 1);
        let b = KGNode::new(session_id.clone(), "b", "attribute", 0.9, 1);
        let c = KGNode::new(session_id.clone(), "c", "attribute", 0.9, 1);
        let e1 = KGEdge::new(session_id.clone(), a.id.clone(), b.id.clone(), "leads_to", 0.9);
        let e2 = KGEdge::new(session_id.clone(), b.id.clone(), c.id.clone(), "leads_to", 0.9);
        let e3 = KGEdge::new(session_id.clone(), c.id.clone(), a.id.clone(), "leads_to", 0.9);
        let metrics = calc.compute(&[a, b, c], &[e1, e2, e3]);
        assert_eq!(metrics.max_depth, 2);
    }
}
