//! Canonical slot discovery (spec §4.5 stage 4.5): collapse paraphrased
//! surface nodes into stable slots so downstream scoring and
//! `NodeStateTracker` operate on concept identity rather than surface
//! wording. Exact-label matches are the degenerate case of the same
//! similarity function used for near-paraphrases (spec §4.5 "minimal
//! implementation acceptable").

use interview_core::similarity::label_similarity;
use interview_repo::CanonicalRepository;
use interview_types::{
    CanonicalEdge, CanonicalSlot, CoreError, GraphUpdateOutput, KGNode, Methodology, Result, SessionId,
    SlotDiscoveryOutput, SurfaceToSlotMapping,
};

pub struct SlotDiscoveryService;

impl SlotDiscoveryService {
    pub async fn apply(
        repo: &dyn CanonicalRepository,
        methodology: &Methodology,
        session_id: &SessionId,
        graph_update: &GraphUpdateOutput,
    ) -> Result<SlotDiscoveryOutput> {
        let mut output = SlotDiscoveryOutput::default();

        for node in &graph_update.new_nodes {
            if repo.get_mapping(&node.id).await.map_err(CoreError::from)?.is_some() {
                continue;
            }
            let mapping = Self::map_node(repo, methodology, session_id, node).await?;
            output.new_mappings.push(mapping);
        }

        for edge in &graph_update.new_edges {
            let source_mapping = repo.get_mapping(&edge.source_node_id).await.map_err(CoreError::from)?;
            let target_mapping = repo.get_mapping(&edge.target_node_id).await.map_err(CoreError::from)?;
            let (Some(source), Some(target)) = (source_mapping, target_mapping) else {
                continue;
            };
            let canonical_edge = CanonicalEdge {
                session_id: session_id.clone(),
                source_slot_id: source.canonical_slot_id,
                target_slot_id: target.canonical_slot_id,
                edge_type: edge.edge_type.clone(),
                confidence: edge.confidence,
            };
            repo.upsert_canonical_edge(&canonical_edge).await.map_err(CoreError::from)?;
            output.new_canonical_edges.push(canonical_edge);
        }

        Ok(output)
    }

    async fn map_node(
        repo: &dyn CanonicalRepository,
        methodology: &Methodology,
        session_id: &SessionId,
        node: &KGNode,
    ) -> Result<SurfaceToSlotMapping> {
        let existing_slots = repo.slots_for_session(session_id).await.map_err(CoreError::from)?;

        let best = existing_slots
            .into_iter()
            .filter(|slot| slot.node_type == node.node_type)
            .map(|slot| {
                let score = label_similarity(&node.label, &slot.slot_name);
                (slot, score)
            })
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let (slot_id, score) = match best {
            Some((slot, score)) if score >= methodology.similarity_threshold => (slot.id, score),
            _ => {
                let slot = CanonicalSlot::new(session_id.clone(), &node.label, &node.node_type);
                let id = slot.id.clone();
                repo.upsert_slot(&slot).await.map_err(CoreError::from)?;
                (id, 1.0)
            }
        };

        let mapping = SurfaceToSlotMapping { surface_node_id: node.id.clone(), canonical_slot_id: slot_id, similarity_score: score };
        repo.save_mapping(&mapping).await.map_err(CoreError::from)?;
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_repo::{InMemoryRepositories, SurfaceGraphRepository};
    use interview_types::{GraphChangeSummary, PhaseBoundaries};

    fn methodology() -> Methodology {
        Methodology {
            id: "means_end_chain".into(),
            name: "Means-End Chain".into(),
            node_types: vec!["attribute".into()],
            edge_types: vec!["leads_to".into()],
            transitions: vec![],
            terminal_node_types: vec![],
            ladder_length: 5,
            similarity_threshold: 0.88,
            type_priority: Default::default(),
            phase_boundaries: PhaseBoundaries::default(),
            strategies: vec![],
            closing_question_template: None,
            enable_srl_preprocessing: false,
        }
    }

    #[tokio::test]
    async fn first_mention_creates_a_fresh_slot_at_score_one() {
        let repo = InMemoryRepositories::new();
        let session_id = SessionId::generate();
        let node = KGNode::new(session_id.clone(), "creamy texture", "attribute", 0.9, 1);
        repo.upsert_node(&node).await.unwrap();
        let update = GraphUpdateOutput {
            new_nodes: vec![node],
            touched_nodes: vec![],
            new_edges: vec![],
            changes: GraphChangeSummary::default(),
            superseded: vec![],
        };

        let output = SlotDiscoveryService::apply(&repo, &methodology(), &session_id, &update).await.unwrap();
        assert_eq!(output.new_mappings.len(), 1);
        assert_eq!(output.new_mappings[0].similarity_score, 1.0);
    }

    #[tokio::test]
    async fn near_paraphrase_above_threshold_maps_to_existing_slot() {
        let repo = InMemoryRepositories::new();
        let session_id = SessionId::generate();
        let methodology = methodology();

        let first = KGNode::new(session_id.clone(), "creamy texture", "attribute", 0.9, 1);
        repo.upsert_node(&first).await.unwrap();
        let update_a = GraphUpdateOutput {
            new_nodes: vec![first],
            touched_nodes: vec![],
            new_edges: vec![],
            changes: GraphChangeSummary::default(),
            superseded: vec![],
        };
        let output_a = SlotDiscoveryService::apply(&repo, &methodology, &session_id, &update_a).await.unwrap();
        let first_slot = output_a.new_mappings[0].canonical_slot_id.clone();

        let second = KGNode::new(session_id.clone(), "creamy textured", "attribute", 0.9, 1);
        repo.upsert_node(&second).await.unwrap();
        let update_b = GraphUpdateOutput {
            new_nodes: vec![second],
            touched_nodes: vec![],
            new_edges: vec![],
            changes: GraphChangeSummary::default(),
            superseded: vec![],
        };
        let output_b = SlotDiscoveryService::apply(&repo, &methodology, &session_id, &update_b).await.unwrap();

        assert_eq!(output_b.new_mappings[0].canonical_slot_id, first_slot);
    }
}
