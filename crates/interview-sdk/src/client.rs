use std::collections::HashMap;
use std::sync::Arc;

use interview_llm::CompletionProvider;
use interview_repo::Repositories;
use interview_runtime::TurnPipeline;
use interview_types::{Methodology, Session, SessionId, TurnResult, Utterance};
use tokio::sync::RwLock;

use crate::error::{Error, Result};

/// Facade over a repository store + LLM backend + turn pipeline, the single
/// crate an HTTP/session surface or the simulation harness is expected to
/// depend on (spec §1 "out-of-core boundary").
///
/// Generic over the repository implementation so the same facade serves a
/// `SqliteRepositories`-backed production deployment and an
/// `InMemoryRepositories`-backed test/simulation run without duplicating
/// wiring logic.
pub struct InterviewClient<R: Repositories> {
    repo: Arc<R>,
    llm: Arc<dyn CompletionProvider>,
    methodologies: HashMap<String, Methodology>,
    pipelines: RwLock<HashMap<String, Arc<TurnPipeline>>>,
}

impl<R: Repositories> InterviewClient<R> {
    pub fn new(repo: R, llm: impl CompletionProvider + 'static, methodologies: Vec<Methodology>) -> Self {
        Self {
            repo: Arc::new(repo),
            llm: Arc::new(llm),
            methodologies: methodologies.into_iter().map(|m| (m.id.clone(), m)).collect(),
            pipelines: RwLock::new(HashMap::new()),
        }
    }

    async fn pipeline_for(&self, methodology_id: &str) -> Result<Arc<TurnPipeline>> {
        if let Some(pipeline) = self.pipelines.read().await.get(methodology_id) {
            return Ok(pipeline.clone());
        }
        let methodology = self
            .methodologies
            .get(methodology_id)
            .ok_or_else(|| Error::NotFound(format!("methodology '{methodology_id}'")))?
            .clone();
        let pipeline = Arc::new(TurnPipeline::new(methodology));
        self.pipelines.write().await.insert(methodology_id.to_string(), pipeline.clone());
        Ok(pipeline)
    }

    /// Creates a new session and persists it, returning a handle bound to
    /// this client's repository and LLM backend.
    pub async fn start_session(
        &self,
        methodology_id: &str,
        concept_id: impl Into<String>,
        concept_name: impl Into<String>,
        max_turns: u32,
    ) -> Result<SessionHandle<R>> {
        let pipeline = self.pipeline_for(methodology_id).await?;
        let session = Session::new(methodology_id, concept_id, concept_name, max_turns);
        self.repo.create_session(&session).await.map_err(interview_types::CoreError::from)?;
        Ok(SessionHandle { repo: self.repo.clone(), llm: self.llm.clone(), pipeline, session_id: session.id })
    }

    /// Binds a handle to an already-persisted session.
    pub async fn session(&self, session_id: &SessionId) -> Result<SessionHandle<R>> {
        let session = self
            .repo
            .get_session(session_id)
            .await
            .map_err(interview_types::CoreError::from)?
            .ok_or_else(|| Error::NotFound(format!("session {session_id}")))?;
        let pipeline = self.pipeline_for(&session.methodology).await?;
        Ok(SessionHandle { repo: self.repo.clone(), llm: self.llm.clone(), pipeline, session_id: session.id })
    }
}

/// One session's turn loop, bound to a fixed methodology's pipeline.
pub struct SessionHandle<R: Repositories> {
    repo: Arc<R>,
    llm: Arc<dyn CompletionProvider>,
    pipeline: Arc<TurnPipeline>,
    session_id: SessionId,
}

impl<R: Repositories> SessionHandle<R> {
    pub fn id(&self) -> &SessionId {
        &self.session_id
    }

    /// Drives one respondent utterance through the full turn pipeline
    /// (spec §4.8) and returns the question the interviewer should ask next.
    pub async fn ask(&self, respondent_text: &str) -> Result<TurnResult> {
        self.pipeline
            .run_turn(self.repo.as_ref(), self.llm.as_ref(), &self.session_id, respondent_text)
            .await
            .map_err(Error::from)
    }

    pub async fn state(&self) -> Result<Session> {
        self.repo
            .get_session(&self.session_id)
            .await
            .map_err(interview_types::CoreError::from)?
            .ok_or_else(|| Error::NotFound(format!("session {}", self.session_id)))
    }

    pub async fn history(&self, limit: usize) -> Result<Vec<Utterance>> {
        Ok(self.repo.recent_utterances(&self.session_id, limit).await.map_err(interview_types::CoreError::from)?)
    }
}
