//! Dual-graph mutation service (spec §4.5, component E, stage 4
//! "GraphUpdate"). Applies one turn's extraction onto the surface graph:
//! normalize, merge-or-create each concept, drop anything the
//! methodology's schema disallows, resolve relationships against the
//! concepts just seen (dropping on a missing endpoint), and special-case
//! `revises` as a contradiction rather than a plain edge.

use std::collections::HashMap;

use interview_core::normalize::{label_key, normalize_label};
use interview_repo::SurfaceGraphRepository;
use interview_types::{
    CoreError, ExtractedConcept, ExtractedRelationship, ExtractionOutput, GraphChangeSummary,
    GraphUpdateOutput, KGEdge, KGNode, Methodology, NodeId, Result, SessionId, UtteranceId,
};

pub struct GraphUpdateService;

impl GraphUpdateService {
    pub async fn apply(
        repo: &dyn SurfaceGraphRepository,
        methodology: &Methodology,
        session_id: &SessionId,
        utterance_id: &UtteranceId,
        extraction: &ExtractionOutput,
    ) -> Result<GraphUpdateOutput> {
        let mut output = GraphUpdateOutput {
            new_nodes: Vec::new(),
            touched_nodes: Vec::new(),
            new_edges: Vec::new(),
            changes: GraphChangeSummary::default(),
            superseded: Vec::new(),
        };

        // text -> node id, scoped to this turn's concepts, used to resolve
        // relationships without a second round-trip per endpoint.
        let mut resolved: HashMap<String, NodeId> = HashMap::new();

        for concept in &extraction.concepts {
            if !methodology.allows_node_type(&concept.node_type) {
                continue;
            }
            let node_id = Self::merge_or_create(repo, session_id, utterance_id, concept, &mut output).await?;
            resolved.insert(label_key(&concept.text), node_id);
        }

        for relationship in &extraction.relationships {
            Self::apply_relationship(repo, methodology, session_id, utterance_id, relationship, &resolved, &mut output)
                .await?;
        }

        tracing::debug!(
            session_id = %session_id,
            nodes_added = output.changes.nodes_added,
            nodes_modified = output.changes.nodes_modified,
            edges_added = output.changes.edges_added,
            superseded = output.superseded.len(),
            "applied turn extraction to surface graph"
        );

        Ok(output)
    }

    async fn merge_or_create(
        repo: &dyn SurfaceGraphRepository,
        session_id: &SessionId,
        utterance_id: &UtteranceId,
        concept: &ExtractedConcept,
        output: &mut GraphUpdateOutput,
    ) -> Result<NodeId> {
        let label = normalize_label(&concept.text);
        let existing = repo.find_active_node_by_label(session_id, &label).await.map_err(CoreError::from)?;

        match existing {
            Some(mut node) => {
                node.confidence = node.confidence.max(concept.confidence);
                node.add_source_utterance(utterance_id.clone(), Some(&concept.source_quote));
                for (k, v) in &concept.properties {
                    node.properties.insert(k.clone(), v.clone());
                }
                let id = node.id.clone();
                repo.upsert_node(&node).await.map_err(CoreError::from)?;
                output.touched_nodes.push(id.clone());
                output.changes.nodes_modified += 1;
                Ok(id)
            }
            None => {
                let mut node = KGNode::new(session_id.clone(), label, &concept.node_type, concept.confidence, concept.stance);
                node.properties = concept.properties.clone();
                node.add_source_utterance(utterance_id.clone(), Some(&concept.source_quote));
                let id = node.id.clone();
                repo.upsert_node(&node).await.map_err(CoreError::from)?;
                output.new_nodes.push(node);
                output.touched_nodes.push(id.clone());
                output.changes.nodes_added += 1;
                Ok(id)
            }
        }
    }

    async fn apply_relationship(
        repo: &dyn SurfaceGraphRepository,
        methodology: &Methodology,
        session_id: &SessionId,
        utterance_id: &UtteranceId,
        relationship: &ExtractedRelationship,
        resolved: &HashMap<String, NodeId>,
        output: &mut GraphUpdateOutput,
    ) -> Result<()> {
        let source_id = match Self::resolve_endpoint(repo, session_id, &relationship.source_text, resolved).await? {
            Some(id) => id,
            None => return Ok(()),
        };
        let target_id = match Self::resolve_endpoint(repo, session_id, &relationship.target_text, resolved).await? {
            Some(id) => id,
            None => return Ok(()),
        };

        if relationship.relationship_type == "revises" {
            return Self::apply_revises(repo, session_id, utterance_id, &source_id, &target_id, output).await;
        }

        let source_node = repo.get_node(&source_id).await.map_err(CoreError::from)?;
        let target_node = repo.get_node(&target_id).await.map_err(CoreError::from)?;
        let (Some(source_node), Some(target_node)) = (source_node, target_node) else {
            return Ok(());
        };

        if !methodology.edge_types.iter().any(|t| t == &relationship.relationship_type) {
            return Ok(());
        }
        if !methodology.allows_transition(&relationship.relationship_type, &source_node.node_type, &target_node.node_type) {
            return Ok(());
        }

        let existing_edges = repo.edges_for_session(session_id).await.map_err(CoreError::from)?;
        if let Some(mut edge) = existing_edges
            .into_iter()
            .find(|e| e.matches_triple(&source_id, &target_id, &relationship.relationship_type))
        {
            edge.add_source_utterance(utterance_id.clone());
            repo.upsert_edge(&edge).await.map_err(CoreError::from)?;
            return Ok(());
        }

        let mut edge = KGEdge::new(session_id.clone(), source_id, target_id, &relationship.relationship_type, relationship.confidence);
        edge.add_source_utterance(utterance_id.clone());
        repo.upsert_edge(&edge).await.map_err(CoreError::from)?;
        output.changes.edges_added += 1;
        output.new_edges.push(edge);
        Ok(())
    }

    async fn apply_revises(
        repo: &dyn SurfaceGraphRepository,
        session_id: &SessionId,
        utterance_id: &UtteranceId,
        new_id: &NodeId,
        old_id: &NodeId,
        output: &mut GraphUpdateOutput,
    ) -> Result<()> {
        let Some(mut old_node) = repo.get_node(old_id).await.map_err(CoreError::from)? else {
            return Ok(());
        };
        old_node.superseded_by = Some(new_id.clone());
        repo.upsert_node(&old_node).await.map_err(CoreError::from)?;
        output.superseded.push((old_id.clone(), new_id.clone()));

        let mut edge = KGEdge::new(session_id.clone(), new_id.clone(), old_id.clone(), "revises", 1.0);
        edge.add_source_utterance(utterance_id.clone());
        repo.upsert_edge(&edge).await.map_err(CoreError::from)?;
        output.changes.edges_added += 1;
        output.new_edges.push(edge);
        Ok(())
    }

    async fn resolve_endpoint(
        repo: &dyn SurfaceGraphRepository,
        session_id: &SessionId,
        text: &str,
        resolved: &HashMap<String, NodeId>,
    ) -> Result<Option<NodeId>> {
        if let Some(id) = resolved.get(&label_key(text)) {
            return Ok(Some(id.clone()));
        }
        Ok(repo.find_active_node_by_label(session_id, text).await.map_err(CoreError::from)?.map(|n| n.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_repo::InMemoryRepositories;
    use interview_types::PhaseBoundaries;

    fn methodology() -> Methodology {
        Methodology {
            id: "means_end_chain".into(),
            name: "Means-End Chain".into(),
            node_types: vec!["attribute".into(), "functional_consequence".into()],
            edge_types: vec!["leads_to".into(), "revises".into()],
            transitions: vec![("leads_to".into(), "attribute".into(), "functional_consequence".into())],
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

    fn concept(text: &str, node_type: &str) -> ExtractedConcept {
        ExtractedConcept {
            text: text.to_string(),
            node_type: node_type.to_string(),
            confidence: 0.9,
            source_quote: text.to_string(),
            linked_elements: vec![],
            stance: 1,
            properties: Default::default(),
        }
    }

    fn relationship(source: &str, target: &str, rel_type: &str) -> ExtractedRelationship {
        ExtractedRelationship {
            source_text: source.to_string(),
            target_text: target.to_string(),
            relationship_type: rel_type.to_string(),
            confidence: 0.9,
            reasoning: None,
        }
    }

    fn extraction(concepts: Vec<ExtractedConcept>, relationships: Vec<ExtractedRelationship>) -> ExtractionOutput {
        ExtractionOutput { is_extractable: true, concepts, relationships, extractability_reason: None, timestamp: chrono::Utc::now() }
    }

    #[tokio::test]
    async fn bootstrap_turn_creates_nodes_and_edge() {
        let repo = InMemoryRepositories::new();
        let methodology = methodology();
        let session_id = SessionId::generate();
        let utterance_id = UtteranceId::generate();
        let extraction = extraction(
            vec![concept("creamy texture", "attribute"), concept("feel satisfied", "functional_consequence")],
            vec![relationship("creamy texture", "feel satisfied", "leads_to")],
        );

        let output = GraphUpdateService::apply(&repo, &methodology, &session_id, &utterance_id, &extraction)
            .await
            .unwrap();

        assert_eq!(output.changes.nodes_added, 2);
        assert_eq!(output.changes.edges_added, 1);
        assert_eq!(output.new_edges.len(), 1);
    }

    #[tokio::test]
    async fn disallowed_node_type_is_dropped() {
        let repo = InMemoryRepositories::new();
        let methodology = methodology();
        let session_id = SessionId::generate();
        let utterance_id = UtteranceId::generate();
        let extraction = extraction(vec![concept("price", "economic_value")], vec![]);

        let output = GraphUpdateService::apply(&repo, &methodology, &session_id, &utterance_id, &extraction)
            .await
            .unwrap();

        assert_eq!(output.changes.nodes_added, 0);
    }

    #[tokio::test]
    async fn relationship_with_missing_endpoint_is_dropped() {
        let repo = InMemoryRepositories::new();
        let methodology = methodology();
        let session_id = SessionId::generate();
        let utterance_id = UtteranceId::generate();
        let extraction = extraction(
            vec![concept("creamy texture", "attribute")],
            vec![relationship("creamy texture", "nonexistent", "leads_to")],
        );

        let output = GraphUpdateService::apply(&repo, &methodology, &session_id, &utterance_id, &extraction)
            .await
            .unwrap();

        assert_eq!(output.changes.edges_added, 0);
    }

    #[tokio::test]
    async fn revises_supersedes_old_node_and_creates_revises_edge() {
        let repo = InMemoryRepositories::new();
        let methodology = methodology();
        let session_id = SessionId::generate();
        let utt_a = UtteranceId::generate();
        let utt_b = UtteranceId::generate();

        let turn_a = extraction(vec![concept("creamy", "attribute")], vec![]);
        let out_a = GraphUpdateService::apply(&repo, &methodology, &session_id, &utt_a, &turn_a).await.unwrap();
        let old_id = out_a.new_nodes[0].id.clone();

        let turn_b = extraction(
            vec![concept("not actually creamy", "attribute")],
            vec![relationship("not actually creamy", "creamy", "revises")],
        );
        let out_b = GraphUpdateService::apply(&repo, &methodology, &session_id, &utt_b, &turn_b).await.unwrap();

        assert_eq!(out_b.superseded.len(), 1);
        assert_eq!(out_b.superseded[0].0, old_id);

        let active = repo.active_nodes(&session_id).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].label, "not actually creamy");
    }

    #[tokio::test]
    async fn re_mentioning_a_concept_merges_provenance_instead_of_duplicating() {
        let repo = InMemoryRepositories::new();
        let methodology = methodology();
        let session_id = SessionId::generate();
        let utt_a = UtteranceId::generate();
        let utt_b = UtteranceId::generate();

        let turn_a = extraction(vec![concept("creamy texture", "attribute")], vec![]);
        GraphUpdateService::apply(&repo, &methodology, &session_id, &utt_a, &turn_a).await.unwrap();

        let turn_b = extraction(vec![concept("Creamy Texture", "attribute")], vec![]);
        let out_b = GraphUpdateService::apply(&repo, &methodology, &session_id, &utt_b, &turn_b).await.unwrap();

        assert_eq!(out_b.changes.nodes_added, 0);
        assert_eq!(out_b.changes.nodes_modified, 1);

        let active = repo.active_nodes(&session_id).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].source_utterance_ids.len(), 2);
    }
}
