//! The ten-stage turn pipeline (spec §4.8), composed from the services
//! each other crate provides. One `TurnPipeline` is built per session
//! (it holds the session's methodology-bound signal registry and scoring
//! engine, both expensive to rebuild) and `run_turn` drives one
//! respondent utterance through every stage in order.

use std::collections::HashMap;

use interview_core::text_heuristics::{discourse_markers, response_depth_label};
use interview_graph::{DepthCalculator, GraphUpdateService, NodeStateTracker, SaturationTracker, SlotDiscoveryService};
use interview_llm::{prompts, CompletionProvider};
use interview_repo::Repositories;
use interview_signals::{ScoringEngine, SignalRegistry};
use interview_types::{
    ContextLoadingOutput, CoreError, ExtractionOutput, GraphState, Methodology, Phase, QuestionGenerationOutput,
    ResponseDepth, ResponseSavingOutput, Result, ScoringPersistenceOutput, Speaker, SrlPreprocessingOutput,
    StageContract, StateComputationOutput, StrategySelectionInput, StrategySelectionOutput, TurnResult,
    UtteranceSavingOutput, Utterance,
};

/// How many prior utterances stage 1 loads into the extraction prompt
/// (spec §4.8 stage 1: "recent utterances").
const RECENT_UTTERANCE_WINDOW: usize = 6;

pub struct TurnPipeline {
    methodology: Methodology,
    registry: SignalRegistry,
    scoring: ScoringEngine,
    depth_calculator: DepthCalculator,
}

impl TurnPipeline {
    pub fn new(methodology: Methodology) -> Self {
        let registry = SignalRegistry::with_builtins(&methodology);
        let scoring = ScoringEngine::new(methodology.clone());
        let depth_calculator = DepthCalculator::new(methodology.ladder_length);
        Self { methodology, registry, scoring, depth_calculator }
    }

    pub async fn run_turn<R: Repositories>(
        &self,
        repo: &R,
        llm: &dyn CompletionProvider,
        session_id: &interview_types::SessionId,
        respondent_text: &str,
    ) -> Result<TurnResult> {
        // Stage 1: ContextLoading
        let mut session = repo
            .get_session(session_id)
            .await
            .map_err(CoreError::from)?
            .ok_or_else(|| CoreError::ContractViolation(format!("session {session_id} not found before turn start")))?;
        let turn_number = session.state.turn_count + 1;
        let recent_node_labels: Vec<String> = session.state.recent_node_labels.iter().cloned().collect();
        let recent_utterances =
            repo.recent_utterances(session_id, RECENT_UTTERANCE_WINDOW).await.map_err(CoreError::from)?;
        let context_loading = ContextLoadingOutput {
            session: session.clone(),
            recent_utterances: recent_utterances.clone(),
            recent_node_labels: recent_node_labels.clone(),
        };
        context_loading.validate()?;

        // Stage 2: UtteranceSaving
        let mut utterance = Utterance::new(session_id.clone(), turn_number, Speaker::User, respondent_text);

        // Stage 2.5: SrlPreprocessing (optional) — tags the utterance with
        // discourse markers before it is persisted, so the single written
        // record already carries them.
        let srl_output = if self.methodology.enable_srl_preprocessing {
            SrlPreprocessingOutput { discourse_markers: discourse_markers(respondent_text) }
        } else {
            SrlPreprocessingOutput::default()
        };
        srl_output.validate()?;
        utterance = utterance.with_discourse_markers(srl_output.discourse_markers.clone());

        repo.save_utterance(session_id, &utterance).await.map_err(CoreError::from)?;
        let utterance_saving = UtteranceSavingOutput { utterance_id: utterance.id.clone() };
        utterance_saving.validate()?;

        // Stage 3: Extraction
        let recent_utterance_texts: Vec<String> = recent_utterances.iter().map(|u| u.text.clone()).collect();
        let extraction = self.extract(llm, &utterance.text, &recent_node_labels, &recent_utterance_texts).await;

        // Stage 4: GraphUpdate
        let graph_update =
            GraphUpdateService::apply(repo, &self.methodology, session_id, &utterance.id, &extraction).await?;

        // Stage 4.5: SlotDiscovery
        let slot_discovery = SlotDiscoveryService::apply(repo, &self.methodology, session_id, &graph_update).await?;

        // Rehydrate and update the per-session node-state tracker.
        let mut tracker = NodeStateTracker::from_states(
            repo.node_states_for_session(session_id).await.map_err(CoreError::from)?,
        );

        let node_by_id: HashMap<_, _> = graph_update.new_nodes.iter().map(|n| (n.id.clone(), n)).collect();
        for mapping in &slot_discovery.new_mappings {
            if let Some(node) = node_by_id.get(&mapping.surface_node_id) {
                tracker.register_node(&mapping.canonical_slot_id, &node.label, &node.node_type, turn_number);
                tracker.record_mention(&mapping.canonical_slot_id);
            }
        }
        for touched in &graph_update.touched_nodes {
            if let Some(mapping) = repo.get_mapping(touched).await.map_err(CoreError::from)? {
                tracker.record_mention(&mapping.canonical_slot_id);
                tracker.record_yield(&mapping.canonical_slot_id, turn_number, &graph_update.changes);
            }
        }
        for edge in &slot_discovery.new_canonical_edges {
            tracker.update_edge_counts(&edge.source_slot_id, 1, 0);
            tracker.update_edge_counts(&edge.target_slot_id, 0, 1);
        }
        // The respondent's reply is about whatever the *previous* turn
        // focused on, so its depth/focus bookkeeping lands on that slot.
        let response_depth_text = response_depth_label(respondent_text);
        if let Some(focus_slot_id) = session
            .state
            .focus_history
            .iter()
            .last()
            .and_then(|label| tracker.get_all_states().into_iter().find(|s| &s.label == label).map(|s| s.slot_id.clone()))
        {
            tracker.append_response_signal(&focus_slot_id, classify_depth(response_depth_text));
            tracker.update_focus(&focus_slot_id, turn_number, session.state.last_strategy.as_deref().unwrap_or(""));
        }

        for state in tracker.get_all_states() {
            repo.upsert_node_state(session_id, state).await.map_err(CoreError::from)?;
        }

        // Stage 5: StateComputation
        let active_nodes = repo.active_nodes(session_id).await.map_err(CoreError::from)?;
        let edges = repo.edges_for_session(session_id).await.map_err(CoreError::from)?;
        let node_states = tracker.into_states();

        let mut nodes_by_type: HashMap<String, u32> = HashMap::new();
        for node in &active_nodes {
            *nodes_by_type.entry(node.node_type.clone()).or_insert(0) += 1;
        }
        let mut edges_by_type: HashMap<String, u32> = HashMap::new();
        for edge in &edges {
            *edges_by_type.entry(edge.edge_type.clone()).or_insert(0) += 1;
        }
        let orphan_count = node_states.iter().filter(|s| s.is_orphan()).count() as u32;

        let depth_metrics = self.depth_calculator.compute(&active_nodes, &edges);

        let mut saturation_tracker = SaturationTracker::from_parts(
            session.state.saturation_consecutive_low_info,
            session.state.saturation_recent_yields.clone(),
        );
        let saturation = saturation_tracker.observe(graph_update.changes.produced_yield(), &nodes_by_type);
        session.state.saturation_consecutive_low_info = saturation_tracker.consecutive_low_info();
        session.state.saturation_recent_yields = saturation_tracker.recent_yields().to_vec();

        session.state.velocity.surface.observe(active_nodes.len() as u32);
        session.state.velocity.canonical.observe(node_states.len() as u32);

        let current_phase = phase_for(&self.methodology, active_nodes.len() as u32, orphan_count);
        let strategy_history = session.state.strategy_history.clone();

        let graph_state = GraphState {
            node_count: active_nodes.len() as u32,
            edge_count: edges.len() as u32,
            nodes_by_type,
            edges_by_type,
            orphan_count,
            depth_metrics,
            saturation_metrics: Some(saturation),
            current_phase,
            turn_count: turn_number,
            strategy_history: strategy_history.clone(),
            computed_at: chrono::Utc::now(),
        };
        graph_state.validate()?;

        session.state.response_depth_window.push(classify_depth(response_depth_text));
        let response_depths_vec: Vec<ResponseDepth> = session.state.response_depth_window.as_slice().to_vec();

        let strategy_history_vec: Vec<String> = strategy_history.as_slice().to_vec();
        let (global_signals, node_signals) = self.registry.compose(
            &graph_state,
            &node_states,
            &strategy_history_vec,
            &response_depths_vec,
            respondent_text,
        );

        let state_output = StateComputationOutput {
            graph_state: graph_state.clone(),
            global_signals: global_signals.clone(),
            node_signals: node_signals.clone(),
            computed_at: chrono::Utc::now(),
        };
        state_output.validate()?;

        // Stage 6: StrategySelection
        let freshness = StrategySelectionInput { state: &state_output, extraction_timestamp: extraction.timestamp };
        freshness.check_freshness()?;

        let phase_key = phase_key(current_phase);
        let ranked = self.scoring.score(&global_signals, &node_signals, &node_states, phase_key, &strategy_history_vec);
        let top = ranked.first().ok_or_else(|| CoreError::Configuration("methodology declares no strategies".into()))?;
        let generates_closing_question =
            self.methodology.strategy(&top.strategy).map(|s| s.generates_closing_question).unwrap_or(false);

        let mut rehydrated_tracker = NodeStateTracker::from_states(node_states.clone());
        let focus_label = crate::focus::resolve_focus(top, &self.methodology, &rehydrated_tracker);
        if let Some(slot_id) = top.node_id.clone() {
            rehydrated_tracker.update_focus(&slot_id, turn_number, &top.strategy);
        }

        let strategy_selection = StrategySelectionOutput {
            strategy: top.strategy.clone(),
            focus_node_id: top.node_id.clone(),
            focus_label: focus_label.clone(),
            ranked_candidates: ranked.clone(),
            generates_closing_question,
        };
        strategy_selection.validate()?;

        repo.persist_candidates(session_id, turn_number, &ranked).await.map_err(CoreError::from)?;
        let scoring_persistence =
            ScoringPersistenceOutput { session_id: session_id.clone(), turn_number, persisted_candidate_count: ranked.len() };
        scoring_persistence.validate()?;

        // Stage 7: QuestionGeneration
        let technique_hint = self.methodology.strategy(&top.strategy).and_then(|s| s.technique.as_deref());
        let prompt = prompts::question_generation_prompt(&top.strategy, &focus_label, technique_hint);
        let response = llm
            .complete(interview_llm::CompletionRequest::new(prompt).with_system(
                "You are conducting a qualitative interview. Ask exactly one natural follow-up question.",
            ))
            .await
            .map_err(CoreError::from)?;
        let question_generation = QuestionGenerationOutput {
            question: response.content.trim().to_string(),
            technique: technique_hint.unwrap_or_default().to_string(),
        };
        question_generation.validate()?;
        let question = question_generation.question;

        // Stage 8: ResponseSaving — persists the interviewer's question as
        // a system utterance so the next turn's context load sees it.
        let question_utterance = Utterance::new(session_id.clone(), turn_number, Speaker::System, question.clone());
        repo.save_utterance(session_id, &question_utterance).await.map_err(CoreError::from)?;
        let response_saving = ResponseSavingOutput { utterance_id: question_utterance.id.clone() };
        response_saving.validate()?;

        // Stage 9: Continuation
        let continuation = crate::continuation::evaluate(turn_number, session.max_turns, generates_closing_question, &graph_state);

        // Stage 10: ScoringPersistence + velocity/state bookkeeping
        session.state.turn_count = turn_number;
        session.state.last_strategy = Some(top.strategy.clone());
        session.state.strategy_history.push(top.strategy.clone());
        session.state.focus_history.push(focus_label.clone());
        session.state.recent_node_labels = interview_types::BoundedRing::new(30);
        for node in &active_nodes {
            session.state.recent_node_labels.push(node.label.clone());
        }
        if !continuation.should_continue {
            session.status = interview_types::SessionStatus::Completed;
        }
        session.updated_at = chrono::Utc::now();
        repo.save_session(&session).await.map_err(CoreError::from)?;

        for state in rehydrated_tracker.into_states() {
            repo.upsert_node_state(session_id, &state).await.map_err(CoreError::from)?;
        }

        Ok(TurnResult {
            extraction,
            graph_state,
            next_question: question,
            should_continue: continuation.should_continue,
        })
    }

    async fn extract(
        &self,
        llm: &dyn CompletionProvider,
        utterance_text: &str,
        recent_node_labels: &[String],
        recent_utterance_texts: &[String],
    ) -> ExtractionOutput {
        let prompt = prompts::extraction_prompt(utterance_text, recent_node_labels, recent_utterance_texts);
        let request = interview_llm::CompletionRequest::new(prompt).with_system(prompts::extraction_system_prompt());
        match llm.complete(request).await {
            Ok(response) => prompts::parse_extraction_response(&response.content),
            Err(interview_llm::LlmError::Timeout { stage, timeout_ms }) => {
                ExtractionOutput::empty_due_to(format!("LLM error: timeout in stage '{stage}' after {timeout_ms}ms"))
            }
            Err(err) => ExtractionOutput::empty_due_to(format!("LLM error: {err}")),
        }
    }
}

fn classify_depth(label: &str) -> ResponseDepth {
    match label {
        "deep" => ResponseDepth::Deep,
        "moderate" => ResponseDepth::Moderate,
        "shallow" => ResponseDepth::Shallow,
        _ => ResponseDepth::Surface,
    }
}

fn phase_for(methodology: &Methodology, node_count: u32, orphan_count: u32) -> Phase {
    let bounds = &methodology.phase_boundaries;
    if node_count < bounds.early_max {
        Phase::Exploratory
    } else if node_count < bounds.mid_max || orphan_count > bounds.orphan_mid {
        Phase::Focused
    } else {
        Phase::Closing
    }
}

fn phase_key(phase: Phase) -> &'static str {
    match phase {
        Phase::Exploratory => "exploratory",
        Phase::Focused => "focused",
        Phase::Closing => "closing",
    }
}
