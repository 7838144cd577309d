use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::application::domain::{ApplicantRecord, SessionId, SessionRecord};
use crate::workflows::application::repository::{
    RepositoryError, SessionRepository, SnapshotError, SnapshotReceipt, SnapshotStore,
};
use crate::workflows::application::{application_router, ApplicationAssistantService};

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    sessions: Arc<Mutex<HashMap<SessionId, SessionRecord>>>,
}

impl SessionRepository for MemoryRepository {
    fn insert(&self, session: SessionRecord) -> Result<SessionRecord, RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        if guard.contains_key(&session.session_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.session_id.clone(), session.clone());
        Ok(session)
    }

    fn update(&self, session: SessionRecord) -> Result<(), RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        if guard.contains_key(&session.session_id) {
            guard.insert(session.session_id.clone(), session);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        let guard = self.sessions.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) struct ConflictRepository;

impl SessionRepository for ConflictRepository {
    fn insert(&self, _session: SessionRecord) -> Result<SessionRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _session: SessionRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        Ok(None)
    }
}

pub(super) struct UnavailableRepository;

impl SessionRepository for UnavailableRepository {
    fn insert(&self, _session: SessionRecord) -> Result<SessionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn update(&self, _session: SessionRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySnapshots {
    saved: Arc<Mutex<Vec<(SessionId, ApplicantRecord)>>>,
}

impl MemorySnapshots {
    pub(super) fn saved(&self) -> Vec<(SessionId, ApplicantRecord)> {
        self.saved.lock().expect("snapshot mutex poisoned").clone()
    }
}

impl SnapshotStore for MemorySnapshots {
    fn save(
        &self,
        session_id: &SessionId,
        record: &ApplicantRecord,
    ) -> Result<SnapshotReceipt, SnapshotError> {
        let mut guard = self.saved.lock().expect("snapshot mutex poisoned");
        guard.push((session_id.clone(), record.clone()));
        Ok(SnapshotReceipt {
            location: format!("memory://{session_id}/{}", guard.len()),
        })
    }
}

pub(super) struct FailingSnapshots;

impl SnapshotStore for FailingSnapshots {
    fn save(
        &self,
        _session_id: &SessionId,
        _record: &ApplicantRecord,
    ) -> Result<SnapshotReceipt, SnapshotError> {
        Err(SnapshotError::Unavailable("disk full".to_string()))
    }
}

pub(super) type MemoryService = ApplicationAssistantService<MemoryRepository, MemorySnapshots>;

pub(super) fn build_service() -> (Arc<MemoryService>, MemoryRepository, MemorySnapshots) {
    let repository = MemoryRepository::default();
    let snapshots = MemorySnapshots::default();
    let service = Arc::new(ApplicationAssistantService::new(
        Arc::new(repository.clone()),
        Arc::new(snapshots.clone()),
    ));
    (service, repository, snapshots)
}

pub(super) fn router_with_service(service: Arc<MemoryService>) -> axum::Router {
    application_router(service)
}

pub(super) fn filled_record() -> ApplicantRecord {
    ApplicantRecord {
        name: Some("Jane Doe".to_string()),
        email: Some("jane.doe@example.com".to_string()),
        skills: Some("Rust and SQL".to_string()),
    }
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
