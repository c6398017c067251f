//! `interview-runtime` reuses [`interview_types::CoreError`] directly
//! rather than wrapping it again — every error this crate can produce
//! (configuration, freshness, repository, LLM) is already a named variant
//! there, and the taxonomy (spec §7) is meant to stay flat all the way to
//! the CLI.

pub use interview_types::{CoreError as Error, Result};
