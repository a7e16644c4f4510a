//! Outcome of structured-data validation.
//!
//! A validation failure is not an error in the [`SystemError`](crate::SystemError)
//! sense: it is a report about the input, produced by the schema layer and
//! handed back to the caller unchanged. It is told apart from success by its
//! [`Discriminant`], never by type membership.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag identifying which branch of a [`ParseResult`] a value is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discriminant {
    Success,
    Failure,
}

impl Discriminant {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for Discriminant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which stage of decoding rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Raw text was not well-formed.
    Syntax,
    /// Input violated the declared schema.
    Schema,
    /// Input satisfied the schema but did not fit the target type.
    Coercion,
}

impl IssueKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Schema => "schema",
            Self::Coercion => "coercion",
        }
    }
}

/// A single problem found while validating input.
///
/// `instance_path` and `schema_path` are JSON Pointers into the input and the
/// schema; both are empty when the stage that failed has no such location
/// (malformed text, a type mismatch reported by the decoder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub schema_path: String,
}

impl ValidationIssue {
    #[must_use]
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            instance_path: String::new(),
            schema_path: String::new(),
        }
    }

    #[must_use]
    pub fn with_instance_path(mut self, path: impl Into<String>) -> Self {
        self.instance_path = path.into();
        self
    }

    #[must_use]
    pub fn with_schema_path(mut self, path: impl Into<String>) -> Self {
        self.schema_path = path.into();
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "{}: {}", self.kind.as_str(), self.message)
        } else {
            write!(
                f,
                "{} at {}: {}",
                self.kind.as_str(),
                self.instance_path,
                self.message
            )
        }
    }
}

/// Serialized discriminant of a [`ValidationFailure`]. It has one value, so a
/// report tagged with anything else is rejected on deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum FailureTag {
    Failure,
}

/// Failure report from the validation layer.
///
/// Serializes with `"kind": "failure"`. Deserializing requires that tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    kind: FailureTag,
    issues: Vec<ValidationIssue>,
    /// Number of issues dropped because of a reporting cap.
    #[serde(default, skip_serializing_if = "is_zero")]
    truncated: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl ValidationFailure {
    #[must_use]
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self {
            kind: FailureTag::Failure,
            issues,
            truncated: 0,
        }
    }

    /// Convenience for a failure with a single issue.
    #[must_use]
    pub fn single(kind: IssueKind, message: impl Into<String>) -> Self {
        Self::new(vec![ValidationIssue::new(kind, message)])
    }

    /// Keep at most `max` issues, remembering how many were dropped.
    #[must_use]
    pub fn capped(mut self, max: usize) -> Self {
        if self.issues.len() > max {
            self.truncated += self.issues.len() - max;
            self.issues.truncate(max);
        }
        self
    }

    #[must_use]
    pub const fn discriminant(&self) -> Discriminant {
        Discriminant::Failure
    }

    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    #[must_use]
    pub const fn truncated(&self) -> usize {
        self.truncated
    }

    /// One line per issue (`"<kind> at <path>: <message>"`, or
    /// `"<kind>: <message>"` without a path), plus a trailer if issues were
    /// dropped.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        if self.truncated > 0 {
            lines.push(format!("... and {} more", self.truncated));
        }
        lines
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

/// Validated payload or a validation failure report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "lowercase")]
pub enum ParseResult<T> {
    Success(T),
    Failure(ValidationFailure),
}

impl<T> ParseResult<T> {
    #[must_use]
    pub const fn success(value: T) -> Self {
        Self::Success(value)
    }

    #[must_use]
    pub const fn failure(report: ValidationFailure) -> Self {
        Self::Failure(report)
    }

    #[must_use]
    pub const fn discriminant(&self) -> Discriminant {
        match self {
            Self::Success(_) => Discriminant::Success,
            Self::Failure(report) => report.discriminant(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.discriminant(), Discriminant::Success)
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.discriminant(), Discriminant::Failure)
    }

    #[must_use]
    pub fn map<U, F: FnOnce(T) -> U>(self, op: F) -> ParseResult<U> {
        match self {
            Self::Success(value) => ParseResult::Success(op(value)),
            Self::Failure(report) => ParseResult::Failure(report),
        }
    }

    /// The validated payload, if any.
    #[must_use]
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Borrow the failure report, if any.
    #[must_use]
    pub const fn failure_report(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(report) => Some(report),
        }
    }

    #[must_use]
    pub fn into_result(self) -> Result<T, ValidationFailure> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(report) => Err(report),
        }
    }
}

impl<T> From<Result<T, ValidationFailure>> for ParseResult<T> {
    fn from(result: Result<T, ValidationFailure>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(report) => Self::Failure(report),
        }
    }
}
