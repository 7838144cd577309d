use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use super::domain::{ApplicantRecord, SessionId, SessionRecord};

/// Storage abstraction so the service module can be exercised in isolation.
pub trait SessionRepository: Send + Sync {
    fn insert(&self, session: SessionRecord) -> Result<SessionRecord, RepositoryError>;
    fn update(&self, session: SessionRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook that persists a finished (or requested) applicant record.
pub trait SnapshotStore: Send + Sync {
    fn save(
        &self,
        session_id: &SessionId,
        record: &ApplicantRecord,
    ) -> Result<SnapshotReceipt, SnapshotError>;
}

/// Where a snapshot ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotReceipt {
    pub location: String,
}

/// Snapshot persistence error.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to encode applicant record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to read snapshot from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write snapshot to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session id '{0}' cannot be used as a snapshot file name")]
    InvalidSessionId(String),
    #[error("snapshot storage unavailable: {0}")]
    Unavailable(String),
}

/// Where a [`JsonFileSnapshotStore`] puts each session's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotLayout {
    /// `<dir>/<session_id>.json`, one file per session.
    PerSession(PathBuf),
    /// Every save replaces the same file. Only safe with a single session.
    SingleFile(PathBuf),
}

/// Writes the flat `{name, email, skills}` JSON object to disk.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    layout: SnapshotLayout,
}

impl JsonFileSnapshotStore {
    pub fn per_session(dir: impl Into<PathBuf>) -> Self {
        Self {
            layout: SnapshotLayout::PerSession(dir.into()),
        }
    }

    pub fn single_file(path: impl Into<PathBuf>) -> Self {
        Self {
            layout: SnapshotLayout::SingleFile(path.into()),
        }
    }

    pub fn layout(&self) -> &SnapshotLayout {
        &self.layout
    }

    /// File that holds (or will hold) the given session's record.
    pub fn path_for(&self, session_id: &SessionId) -> Result<PathBuf, SnapshotError> {
        match &self.layout {
            SnapshotLayout::SingleFile(path) => Ok(path.clone()),
            SnapshotLayout::PerSession(dir) => {
                let id = session_id.0.as_str();
                let safe = !id.is_empty()
                    && id
                        .chars()
                        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
                if !safe {
                    return Err(SnapshotError::InvalidSessionId(id.to_string()));
                }
                Ok(dir.join(format!("{id}.json")))
            }
        }
    }

    pub fn load(&self, session_id: &SessionId) -> Result<Option<ApplicantRecord>, SnapshotError> {
        let path = self.path_for(session_id)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SnapshotError::Read { path, source }),
        }
    }
}

impl SnapshotStore for JsonFileSnapshotStore {
    fn save(
        &self,
        session_id: &SessionId,
        record: &ApplicantRecord,
    ) -> Result<SnapshotReceipt, SnapshotError> {
        let path = self.path_for(session_id)?;
        let mut body = serde_json::to_string_pretty(record)?;
        body.push('\n');

        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SnapshotError::Write {
                path: path.clone(),
                source,
            })?;
        }

        fs::write(&path, body).map_err(|source| SnapshotError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(SnapshotReceipt {
            location: path.display().to_string(),
        })
    }
}
