//! Domain types for the interview decision engine.
//!
//! Every inter-stage payload in the turn pipeline is a named, typed record
//! defined here (see `contracts`). Nothing in this crate performs I/O.

pub mod contracts;
pub mod error;
pub mod graph;
pub mod ids;
pub mod methodology;
pub mod node_state;
pub mod session;
pub mod signal;
pub mod utterance;

pub use contracts::{
    ContextLoadingOutput, ContinuationOutput, ExtractedConcept, ExtractedRelationship,
    ExtractionOutput, GraphChangeSummary, GraphUpdateOutput, QuestionGenerationOutput,
    ResponseSavingOutput, ScoredCandidate, ScoringPersistenceOutput, SlotDiscoveryOutput,
    SrlPreprocessingOutput, StageContract, StateComputationOutput, StrategySelectionInput,
    StrategySelectionOutput, TurnResult, UtteranceSavingOutput,
};
pub use error::{CoreError, Result};
pub use graph::{
    BoundedRing, CanonicalEdge, CanonicalSlot, DepthMetrics, GraphState, KGEdge, KGNode, Phase,
    SaturationMetrics, SurfaceToSlotMapping,
};
pub use ids::{CanonicalSlotId, EdgeId, NodeId, SessionId, UtteranceId};
pub use methodology::{
    ConceptConfig, ConceptContext, ConceptElement, Methodology, PhaseBoundaries, StrategyDefinition,
    Transition,
};
pub use node_state::{NodeState, ResponseDepth};
pub use session::{Session, SessionState, SessionStatus, VelocityState, VelocityTracker};
pub use signal::{NodeSignalMap, SignalMap, SignalValue};
pub use utterance::{Speaker, Utterance};
