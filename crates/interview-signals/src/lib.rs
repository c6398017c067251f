//! Signal registry and joint strategy x node scoring engine (spec §4.3, §4.6).

pub mod detectors;
pub mod registry;
pub mod scoring;

pub use registry::{DetectorContext, GlobalSignalDetector, NodeSignalDetector, Pool, SignalRegistry};
pub use scoring::ScoringEngine;
