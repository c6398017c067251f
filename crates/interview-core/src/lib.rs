//! Shared pure utilities used by the graph, signal and runtime crates.
//!
//! Nothing here performs I/O; everything is a plain function over owned or
//! borrowed data so it can be unit tested in isolation and reused wherever
//! the same small computation recurs (label normalization, substitute
//! similarity, lightweight text heuristics for the `llm.*` signal family).

pub mod normalize;
pub mod similarity;
pub mod text_heuristics;

pub use normalize::{label_key, normalize_label};
pub use similarity::{label_similarity, trigram_set};
