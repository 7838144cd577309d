use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for conversation sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three fields collected from an applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicantField {
    Name,
    Email,
    Skills,
}

impl ApplicantField {
    /// Fixed prompting order.
    pub const ALL: [ApplicantField; 3] = [
        ApplicantField::Name,
        ApplicantField::Email,
        ApplicantField::Skills,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicantField::Name => "name",
            ApplicantField::Email => "email",
            ApplicantField::Skills => "skills",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            ApplicantField::Name => "Name",
            ApplicantField::Email => "Email",
            ApplicantField::Skills => "Skills",
        }
    }
}

impl fmt::Display for ApplicantField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Running record filled in from conversation and resume text.
///
/// Serializes to the flat snapshot layout `{"name": .., "email": .., "skills": ..}`
/// with `null` for anything not yet collected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub skills: Option<String>,
}

impl ApplicantRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: ApplicantField) -> Option<&str> {
        match field {
            ApplicantField::Name => self.name.as_deref(),
            ApplicantField::Email => self.email.as_deref(),
            ApplicantField::Skills => self.skills.as_deref(),
        }
    }

    pub(crate) fn set(&mut self, field: ApplicantField, value: String) {
        let slot = match field {
            ApplicantField::Name => &mut self.name,
            ApplicantField::Email => &mut self.email,
            ApplicantField::Skills => &mut self.skills,
        };
        *slot = Some(value);
    }

    pub fn has(&self, field: ApplicantField) -> bool {
        self.get(field).is_some_and(|value| !value.is_empty())
    }

    pub fn is_complete(&self) -> bool {
        ApplicantField::ALL.iter().all(|field| self.has(*field))
    }

    pub fn missing_fields(&self) -> Vec<ApplicantField> {
        ApplicantField::ALL
            .into_iter()
            .filter(|field| !self.has(*field))
            .collect()
    }

    /// User-facing completion status.
    pub fn status_line(&self) -> String {
        if self.is_complete() {
            format!(
                "You're ready! Name: {}, Email: {}, Skills: {}",
                self.name.as_deref().unwrap_or_default(),
                self.email.as_deref().unwrap_or_default(),
                self.skills.as_deref().unwrap_or_default(),
            )
        } else {
            let missing = self
                .missing_fields()
                .into_iter()
                .map(ApplicantField::label)
                .collect::<Vec<_>>()
                .join(", ");
            format!("Still missing: {missing}")
        }
    }

    /// Plain-text application summary offered for download.
    pub fn summary(&self) -> String {
        ApplicantField::ALL
            .iter()
            .map(|field| {
                format!(
                    "{}: {}\n",
                    field.title(),
                    self.get(*field).unwrap_or("(not provided)")
                )
            })
            .collect()
    }
}

/// Stored conversation state, one per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub record: ApplicantRecord,
    pub turns: u32,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_snapshot: Option<String>,
}

impl SessionRecord {
    pub fn new(session_id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            record: ApplicantRecord::new(),
            turns: 0,
            started_at: now,
            updated_at: now,
            last_snapshot: None,
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.session_id.clone(),
            record: self.record.clone(),
            complete: self.record.is_complete(),
            missing: self.record.missing_fields(),
            status: self.record.status_line(),
            turns: self.turns,
            started_at: self.started_at,
            updated_at: self.updated_at,
            last_snapshot: self.last_snapshot.clone(),
        }
    }
}

/// Public representation of a session for API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub record: ApplicantRecord,
    pub complete: bool,
    pub missing: Vec<ApplicantField>,
    pub status: String,
    pub turns: u32,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_snapshot: Option<String>,
}
