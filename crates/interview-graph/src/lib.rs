//! Dual knowledge graph service, depth calculation, canonical slot
//! discovery and the per-slot `NodeStateTracker` (spec §4.4, §4.5,
//! component table rows D/E/F).

pub mod depth;
pub mod graph_service;
pub mod slot_discovery;
pub mod tracker;
pub mod velocity;

pub use depth::DepthCalculator;
pub use graph_service::GraphUpdateService;
pub use slot_discovery::SlotDiscoveryService;
pub use tracker::NodeStateTracker;
pub use velocity::SaturationTracker;
