use once_cell::sync::Lazy;
use regex::Regex;

use super::domain::ApplicantField;

static CHAT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:my name is|i am)\s+([a-z]+(?:[ \t]+[a-z]+)*)")
        .expect("chat name pattern compiles")
});

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[\w.-]+@[\w.-]+\.\w+\b").expect("email pattern compiles")
});

static CHAT_SKILLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:skills are|i know|i can use)\s+(.+)")
        .expect("chat skills pattern compiles")
});

static RESUME_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\A\s*([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)*)").expect("resume name pattern compiles")
});

static RESUME_SKILLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\b(?:technical skills|skills|expertise)[ \t]*[:\n](.+?)(?:\n[ \t]*\n|\z)")
        .expect("resume skills pattern compiles")
});

/// How a captured value is cleaned before it lands in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    Verbatim,
    Trim,
    TitleCase,
}

impl Normalization {
    pub fn apply(self, raw: &str) -> String {
        match self {
            Normalization::Verbatim => raw.to_string(),
            Normalization::Trim => raw.trim().to_string(),
            Normalization::TitleCase => title_case(raw.trim()),
        }
    }
}

/// A single pattern bound to the field it fills.
#[derive(Debug, Clone)]
pub struct FieldRule {
    field: ApplicantField,
    pattern: Regex,
    group: usize,
    normalization: Normalization,
}

impl FieldRule {
    /// Compiles a custom rule. `group` selects the capture holding the value;
    /// `0` takes the whole match.
    pub fn new(
        field: ApplicantField,
        pattern: &str,
        group: usize,
        normalization: Normalization,
    ) -> Result<Self, RuleError> {
        let pattern =
            Regex::new(pattern).map_err(|source| RuleError::Pattern { field, source })?;
        Self::from_regex(field, pattern, group, normalization)
    }

    fn from_regex(
        field: ApplicantField,
        pattern: Regex,
        group: usize,
        normalization: Normalization,
    ) -> Result<Self, RuleError> {
        let groups = pattern.captures_len();
        if group >= groups {
            return Err(RuleError::MissingGroup {
                field,
                group,
                available: groups.saturating_sub(1),
            });
        }

        Ok(Self {
            field,
            pattern,
            group,
            normalization,
        })
    }

    fn builtin(
        field: ApplicantField,
        pattern: &Regex,
        group: usize,
        normalization: Normalization,
    ) -> Self {
        Self {
            field,
            pattern: pattern.clone(),
            group,
            normalization,
        }
    }

    pub fn field(&self) -> ApplicantField {
        self.field
    }

    /// Returns the normalized value of the first match, if it is non-empty.
    pub fn find(&self, text: &str) -> Option<String> {
        let captures = self.pattern.captures(text)?;
        let value = self.normalization.apply(captures.get(self.group)?.as_str());
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    pub fn chat_name() -> Self {
        Self::builtin(ApplicantField::Name, &CHAT_NAME, 1, Normalization::TitleCase)
    }

    pub fn email() -> Self {
        Self::builtin(ApplicantField::Email, &EMAIL, 0, Normalization::Verbatim)
    }

    pub fn chat_skills() -> Self {
        Self::builtin(ApplicantField::Skills, &CHAT_SKILLS, 1, Normalization::Trim)
    }

    pub fn resume_name() -> Self {
        Self::builtin(ApplicantField::Name, &RESUME_NAME, 1, Normalization::TitleCase)
    }

    pub fn resume_skills() -> Self {
        Self::builtin(ApplicantField::Skills, &RESUME_SKILLS, 1, Normalization::Trim)
    }
}

/// Error raised when a custom rule cannot be compiled.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("invalid {field} pattern: {source}")]
    Pattern {
        field: ApplicantField,
        #[source]
        source: regex::Error,
    },
    #[error("{field} rule selects capture group {group} but the pattern only has {available}")]
    MissingGroup {
        field: ApplicantField,
        group: usize,
        available: usize,
    },
}

/// Uppercases the first letter of every alphabetic run and lowercases the rest.
pub(crate) fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_alpha = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if previous_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_alpha = true;
        } else {
            out.push(ch);
            previous_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_handles_mixed_case_and_apostrophes() {
        assert_eq!(title_case("JANE doe"), "Jane Doe");
        assert_eq!(title_case("mary-kate o'neil"), "Mary-Kate O'Neil");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn chat_name_ignores_case_and_title_cases() {
        let rule = FieldRule::chat_name();
        assert_eq!(rule.find("My name is Jane Doe").as_deref(), Some("Jane Doe"));
        assert_eq!(rule.find("my name is jane doe").as_deref(), Some("Jane Doe"));
        assert_eq!(rule.find("i am JANE DOE").as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn chat_name_trigger_starts_at_word_boundary() {
        let rule = FieldRule::chat_name();
        assert_eq!(rule.find("hi am Jane"), None);
        assert_eq!(rule.find("Hi, I am Jane").as_deref(), Some("Jane"));
    }

    #[test]
    fn chat_name_stops_at_punctuation_and_line_end() {
        let rule = FieldRule::chat_name();
        assert_eq!(
            rule.find("I am Ada Lovelace, I like maths").as_deref(),
            Some("Ada Lovelace")
        );
        assert_eq!(
            rule.find("my name is ada lovelace
I know Rust").as_deref(),
            Some("Ada Lovelace")
        );
    }

    #[test]
    fn email_takes_first_candidate_verbatim() {
        let rule = FieldRule::email();
        assert_eq!(
            rule.find("mail A.B-c@Example.co.uk or x@y.io").as_deref(),
            Some("A.B-c@Example.co.uk")
        );
        assert_eq!(rule.find("no address @ here"), None);
    }

    #[test]
    fn chat_skills_runs_to_end_of_line() {
        let rule = FieldRule::chat_skills();
        assert_eq!(
            rule.find("My Skills Are  Rust, Go and SQL  ").as_deref(),
            Some("Rust, Go and SQL")
        );
        assert_eq!(
            rule.find("I know Rust\nmy name is Jane Doe").as_deref(),
            Some("Rust")
        );
        assert_eq!(rule.find("skills are    "), None);
    }

    #[test]
    fn resume_skills_stops_at_blank_line() {
        let rule = FieldRule::resume_skills();
        let text = "Jane Doe\n\nTechnical Skills: Rust, Tokio\nAxum\n\nExperience\nAcme";
        assert_eq!(rule.find(text).as_deref(), Some("Rust, Tokio\nAxum"));
    }

    #[test]
    fn resume_name_reads_first_line_only() {
        let rule = FieldRule::resume_name();
        assert_eq!(
            rule.find("  Jane Doe\nSoftware Engineer").as_deref(),
            Some("Jane Doe")
        );
        assert_eq!(rule.find("curriculum vitae"), None);
    }

    #[test]
    fn custom_rules_validate_pattern_and_group() {
        let rule = FieldRule::new(
            ApplicantField::Skills,
            r"(?i)stack:\s*(.+)",
            1,
            Normalization::Trim,
        )
        .expect("valid rule");
        assert_eq!(rule.field(), ApplicantField::Skills);
        assert_eq!(rule.find("Stack: rust ").as_deref(), Some("rust"));

        let err = FieldRule::new(ApplicantField::Name, r"name: (\w+)", 2, Normalization::Trim)
            .expect_err("group out of range");
        assert!(matches!(err, RuleError::MissingGroup { available: 1, .. }));

        let err = FieldRule::new(ApplicantField::Email, r"(unclosed", 0, Normalization::Verbatim)
            .expect_err("invalid regex");
        assert!(matches!(err, RuleError::Pattern { .. }));
    }
}
