//! Job application intake: pulls an applicant's name, email, and skills out of
//! chat messages and resume text, and tracks what is still missing.

pub mod domain;
mod extractor;
pub mod repository;
pub mod router;
mod rules;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{ApplicantField, ApplicantRecord, SessionId, SessionRecord, SessionView};
pub use extractor::{ApplicantRecordExtractor, ExtractionReport};
pub use repository::{
    JsonFileSnapshotStore, RepositoryError, SessionRepository, SnapshotError, SnapshotLayout,
    SnapshotReceipt, SnapshotStore,
};
pub use router::{application_router, TextPayload};
pub use rules::{FieldRule, Normalization, RuleError};
pub use service::{
    ApplicationAssistantService, ApplicationServiceError, TurnOutcome, TurnSource,
};
