use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{ApplicantField, ApplicantRecord, SessionId, SessionRecord};
use super::extractor::{ApplicantRecordExtractor, ExtractionReport};
use super::repository::{
    RepositoryError, SessionRepository, SnapshotError, SnapshotReceipt, SnapshotStore,
};

/// Service composing the extractors, session repository, and snapshot store.
pub struct ApplicationAssistantService<R, S> {
    repository: Arc<R>,
    snapshots: Arc<S>,
    conversational: ApplicantRecordExtractor,
    resume: ApplicantRecordExtractor,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("session-{id:06}"))
}

/// Which rule set processed a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnSource {
    Message,
    Resume,
}

/// Everything a caller needs to reply to the user after one turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    pub session_id: SessionId,
    pub source: TurnSource,
    pub acknowledgement: String,
    pub matched: Vec<ApplicantField>,
    pub status: String,
    pub complete: bool,
    pub missing: Vec<ApplicantField>,
    pub record: ApplicantRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotReceipt>,
}

impl<R, S> ApplicationAssistantService<R, S>
where
    R: SessionRepository + 'static,
    S: SnapshotStore + 'static,
{
    pub fn new(repository: Arc<R>, snapshots: Arc<S>) -> Self {
        Self::with_extractors(
            repository,
            snapshots,
            ApplicantRecordExtractor::conversational(),
            ApplicantRecordExtractor::resume(),
        )
    }

    pub fn with_extractors(
        repository: Arc<R>,
        snapshots: Arc<S>,
        conversational: ApplicantRecordExtractor,
        resume: ApplicantRecordExtractor,
    ) -> Self {
        Self {
            repository,
            snapshots,
            conversational,
            resume,
        }
    }

    /// Open a new conversation with an empty applicant record.
    pub fn start_session(&self) -> Result<SessionRecord, ApplicationServiceError> {
        let session = SessionRecord::new(next_session_id(), Utc::now());
        let stored = self.repository.insert(session)?;
        info!(session_id = %stored.session_id, "applicant session started");
        Ok(stored)
    }

    /// Run the chat rules over one user utterance.
    pub fn submit_message(
        &self,
        session_id: &SessionId,
        text: &str,
    ) -> Result<TurnOutcome, ApplicationServiceError> {
        self.apply_turn(session_id, text, TurnSource::Message)
    }

    /// Merge fields found in resume text that an upstream tool already extracted.
    pub fn import_resume(
        &self,
        session_id: &SessionId,
        text: &str,
    ) -> Result<TurnOutcome, ApplicationServiceError> {
        self.apply_turn(session_id, text, TurnSource::Resume)
    }

    /// Discard everything collected so far.
    pub fn reset(&self, session_id: &SessionId) -> Result<SessionRecord, ApplicationServiceError> {
        let mut session = self.get(session_id)?;
        session.record = ApplicantRecord::new();
        session.turns = 0;
        session.last_snapshot = None;
        session.updated_at = Utc::now();
        self.repository.update(session.clone())?;
        info!(%session_id, "applicant session reset");
        Ok(session)
    }

    /// Seed a session with a record saved by an earlier conversation.
    pub fn restore(
        &self,
        session_id: &SessionId,
        record: ApplicantRecord,
    ) -> Result<SessionRecord, ApplicationServiceError> {
        let mut session = self.get(session_id)?;
        session.record = record;
        session.updated_at = Utc::now();
        self.repository.update(session.clone())?;
        info!(
            %session_id,
            complete = session.record.is_complete(),
            "applicant session restored"
        );
        Ok(session)
    }

    /// Persist the current record regardless of completeness.
    pub fn snapshot(
        &self,
        session_id: &SessionId,
    ) -> Result<SnapshotReceipt, ApplicationServiceError> {
        let mut session = self.get(session_id)?;
        let receipt = self.snapshots.save(session_id, &session.record)?;
        session.last_snapshot = Some(receipt.location.clone());
        self.repository.update(session)?;
        info!(%session_id, location = %receipt.location, "applicant snapshot saved on request");
        Ok(receipt)
    }

    /// Fetch a session for API responses.
    pub fn get(&self, session_id: &SessionId) -> Result<SessionRecord, ApplicationServiceError> {
        let session = self
            .repository
            .fetch(session_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(session)
    }

    fn apply_turn(
        &self,
        session_id: &SessionId,
        text: &str,
        source: TurnSource,
    ) -> Result<TurnOutcome, ApplicationServiceError> {
        let mut session = self.get(session_id)?;
        let extractor = match source {
            TurnSource::Message => &self.conversational,
            TurnSource::Resume => &self.resume,
        };

        let report = extractor.extract(text, session.record.clone());
        let changed = report.record != session.record;
        debug!(
            %session_id,
            ?source,
            matched = ?report.matched,
            changed,
            "extraction applied"
        );

        session.record = report.record.clone();
        session.turns = session.turns.saturating_add(1);
        session.updated_at = Utc::now();
        self.repository.update(session.clone())?;

        let snapshot = if changed && session.record.is_complete() {
            let receipt = self
                .snapshots
                .save(session_id, &session.record)
                .inspect_err(|err| warn!(%session_id, error = %err, "snapshot failed"))?;
            session.last_snapshot = Some(receipt.location.clone());
            self.repository.update(session)?;
            info!(%session_id, location = %receipt.location, "applicant record complete");
            Some(receipt)
        } else {
            None
        };

        Ok(outcome(session_id, source, report, snapshot))
    }
}

fn outcome(
    session_id: &SessionId,
    source: TurnSource,
    report: ExtractionReport,
    snapshot: Option<SnapshotReceipt>,
) -> TurnOutcome {
    TurnOutcome {
        session_id: session_id.clone(),
        source,
        acknowledgement: report.acknowledgement(),
        status: report.record.status_line(),
        complete: report.is_complete(),
        missing: report.missing_fields(),
        matched: report.matched,
        record: report.record,
        snapshot,
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
