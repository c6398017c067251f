//! Fixtures, a scripted-respondent harness, and assertion helpers for
//! exercising the interview decision engine end to end without a real LLM
//! or a real respondent — the crate `interview-cli simulate` and the rest
//! of the workspace's integration tests build sessions from.

pub mod assertions;
pub mod fixtures;
pub mod respondent;
pub mod world;

pub use respondent::{Persona, SyntheticRespondent};
pub use world::{InterviewWorld, Transcript, TranscriptTurn};
