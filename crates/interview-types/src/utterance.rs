use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{SessionId, UtteranceId};

/// Who produced an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    System,
}

/// An immutable turn of dialogue. Created by pipeline stage 2
/// (`UtteranceSaving`) or stage 8 (`ResponseSaving`); never mutated
/// thereafter. Provides provenance for every graph entity derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    pub id: UtteranceId,
    pub session_id: SessionId,
    pub turn_number: u32,
    pub speaker: Speaker,
    pub text: String,
    pub discourse_markers: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Utterance {
    pub fn new(
        session_id: SessionId,
        turn_number: u32,
        speaker: Speaker,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: UtteranceId::generate(),
            session_id,
            turn_number,
            speaker,
            text: text.into(),
            discourse_markers: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_discourse_markers(mut self, markers: Vec<String>) -> Self {
        self.discourse_markers = markers;
        self
    }
}
