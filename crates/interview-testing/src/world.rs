//! `InterviewWorld`: a fluent, in-process simulation harness driving the
//! turn pipeline against `InMemoryRepositories` and a `SyntheticRespondent`,
//! running entirely in-process rather than shelling out to a CLI binary —
//! this crate's consumers (unit tests, `interview-cli simulate`) already
//! link the engine directly.

use interview_llm::HeuristicProvider;
use interview_repo::{InMemoryRepositories, SessionRepository};
use interview_runtime::TurnPipeline;
use interview_types::{Methodology, Result, Session, SessionId};
use serde::Serialize;

use crate::respondent::{Persona, SyntheticRespondent};

/// One completed turn, as recorded for a JSON transcript (spec §6 CLI
/// surface: "writes a JSON transcript").
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptTurn {
    pub turn_number: u32,
    pub respondent_text: String,
    pub question: String,
    pub node_count: u32,
    pub should_continue: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub session_id: String,
    pub turns: Vec<TranscriptTurn>,
}

pub struct InterviewWorld {
    repo: InMemoryRepositories,
    llm: HeuristicProvider,
    pipeline: TurnPipeline,
    respondent: SyntheticRespondent,
    session_id: SessionId,
    max_turns: u32,
}

impl InterviewWorld {
    pub async fn new(
        methodology: Methodology,
        concept_id: impl Into<String>,
        concept_name: impl Into<String>,
        persona: Persona,
        max_turns: u32,
    ) -> Result<Self> {
        let repo = InMemoryRepositories::new();
        let methodology_id = methodology.id.clone();
        let pipeline = TurnPipeline::new(methodology);
        let session = Session::new(methodology_id, concept_id, concept_name, max_turns);
        let session_id = session.id.clone();
        repo.create_session(&session).await.map_err(interview_types::CoreError::from)?;
        Ok(Self { repo, llm: HeuristicProvider::new(), pipeline, respondent: SyntheticRespondent::new(persona), session_id, max_turns })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Runs turns until the pipeline signals `should_continue = false` or
    /// `max_turns` is reached, whichever comes first, returning the full
    /// transcript.
    pub async fn run(&mut self) -> Result<Transcript> {
        let mut turns = Vec::new();
        let mut question = "Tell me about this product.".to_string();

        loop {
            let respondent_text = self.respondent.respond(&question);
            let result = self.pipeline.run_turn(&self.repo, &self.llm, &self.session_id, &respondent_text).await?;

            question = result.next_question.clone();
            let turn_number = result.graph_state.turn_count;
            let should_continue = result.should_continue;
            turns.push(TranscriptTurn {
                turn_number,
                respondent_text,
                question: result.next_question,
                node_count: result.graph_state.node_count,
                should_continue,
            });

            if !should_continue || turn_number >= self.max_turns {
                break;
            }
        }

        Ok(Transcript { session_id: self.session_id.to_string(), turns })
    }

    pub async fn ask(&mut self, respondent_text: &str) -> Result<interview_types::TurnResult> {
        self.pipeline.run_turn(&self.repo, &self.llm, &self.session_id, respondent_text).await
    }

    pub fn repo(&self) -> &InMemoryRepositories {
        &self.repo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{means_end_chain_methodology, oat_milk_concept};

    #[tokio::test]
    async fn engaged_persona_keeps_the_interview_going_past_one_turn() {
        let concept = oat_milk_concept();
        let mut world =
            InterviewWorld::new(means_end_chain_methodology(), concept.id, concept.name, Persona::Engaged, 10)
                .await
                .unwrap();
        let transcript = world.run().await.unwrap();
        assert!(!transcript.turns.is_empty());
        assert!(transcript.turns.iter().all(|t| !t.question.is_empty()));
    }

    #[tokio::test]
    async fn simulation_never_exceeds_max_turns() {
        let concept = oat_milk_concept();
        let mut world =
            InterviewWorld::new(means_end_chain_methodology(), concept.id, concept.name, Persona::Terse, 3)
                .await
                .unwrap();
        let transcript = world.run().await.unwrap();
        assert!(transcript.turns.len() <= 3);
        assert_eq!(transcript.turns.last().unwrap().turn_number, transcript.turns.len() as u32);
    }
}
