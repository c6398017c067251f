//! Turn pipeline orchestration for the interview decision engine: loads
//! methodology/concept configuration (spec §6), resolves the focus of a
//! selected strategy (spec §4.7), decides whether a session continues
//! (spec §4.9), and drives the ten-stage turn pipeline (spec §4.8).

pub mod config;
pub mod continuation;
pub mod error;
pub mod focus;
pub mod pipeline;

pub use config::{load_concept, load_methodology, parse_concept, parse_methodology};
pub use continuation::evaluate as evaluate_continuation;
pub use error::{Error, Result};
pub use focus::resolve_focus;
pub use pipeline::TurnPipeline;
