//! Public facade over the interview decision engine (spec §1): wires a
//! repository store, an LLM completion backend, and the turn pipeline
//! behind a small `InterviewClient`/`SessionHandle` API, the single crate
//! an HTTP/session surface or the simulation harness depends on.

pub mod client;
pub mod error;

pub use client::{InterviewClient, SessionHandle};
pub use error::{Error, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use interview_llm::HeuristicProvider;
    use interview_repo::InMemoryRepositories;
    use interview_testing::fixtures::{means_end_chain_methodology, oat_milk_concept};

    #[tokio::test]
    async fn start_session_then_ask_returns_a_question() {
        let methodology = means_end_chain_methodology();
        let client = InterviewClient::new(InMemoryRepositories::new(), HeuristicProvider::new(), vec![methodology]);
        let concept = oat_milk_concept();
        let handle = client.start_session("means_end_chain", concept.id, concept.name, 10).await.unwrap();

        let result = handle.ask("I really like the creamy texture because it makes me feel satisfied").await.unwrap();
        assert!(!result.next_question.is_empty());

        let state = handle.state().await.unwrap();
        assert_eq!(state.state.turn_count, 1);

        let history = handle.history(10).await.unwrap();
        assert_eq!(history.len(), 2); // respondent utterance + generated question
    }

    #[tokio::test]
    async fn unknown_session_lookup_fails() {
        let methodology = means_end_chain_methodology();
        let client = InterviewClient::new(InMemoryRepositories::new(), HeuristicProvider::new(), vec![methodology]);
        let unknown = interview_types::SessionId::generate();
        assert!(client.session(&unknown).await.is_err());
    }
}
