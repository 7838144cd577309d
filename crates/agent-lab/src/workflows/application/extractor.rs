use serde::{Deserialize, Serialize};

use super::domain::{ApplicantField, ApplicantRecord};
use super::rules::FieldRule;

/// Stateless extractor that applies a rule set to text and merges the hits into a record.
#[derive(Debug, Clone)]
pub struct ApplicantRecordExtractor {
    rules: Vec<FieldRule>,
}

impl ApplicantRecordExtractor {
    pub fn with_rules(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// Rules for chat utterances ("my name is ..", email tokens, "skills are ..").
    pub fn conversational() -> Self {
        Self::with_rules(vec![
            FieldRule::chat_name(),
            FieldRule::email(),
            FieldRule::chat_skills(),
        ])
    }

    /// Rules for plain text pulled out of an uploaded resume.
    pub fn resume() -> Self {
        Self::with_rules(vec![
            FieldRule::resume_name(),
            FieldRule::email(),
            FieldRule::resume_skills(),
        ])
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Applies every rule independently. Fields without a match keep their
    /// previous value; when several rules target one field the later rule wins.
    pub fn extract(&self, text: &str, mut record: ApplicantRecord) -> ExtractionReport {
        let mut matched = Vec::new();

        for rule in &self.rules {
            if let Some(value) = rule.find(text) {
                record.set(rule.field(), value);
                if !matched.contains(&rule.field()) {
                    matched.push(rule.field());
                }
            }
        }

        matched.sort();
        ExtractionReport { record, matched }
    }
}

impl Default for ApplicantRecordExtractor {
    fn default() -> Self {
        Self::conversational()
    }
}

/// Result of one extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub record: ApplicantRecord,
    /// Fields that matched this call, in name/email/skills order.
    pub matched: Vec<ApplicantField>,
}

impl ExtractionReport {
    /// True when nothing in the text matched any rule.
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }

    pub fn acknowledgement(&self) -> String {
        if self.is_empty() {
            return "I couldn't extract any info. Could you please provide your name, email, or skills?"
                .to_string();
        }

        let mut parts = self
            .matched
            .iter()
            .map(|field| format!("{} saved.", field.title()))
            .collect::<Vec<_>>();
        parts.push("Let me check what else I need.".to_string());
        parts.join(" ")
    }

    pub fn is_complete(&self) -> bool {
        self.record.is_complete()
    }

    pub fn missing_fields(&self) -> Vec<ApplicantField> {
        self.record.missing_fields()
    }
}
