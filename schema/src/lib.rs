//! JSON Schema validation and typed decoding.
//!
//! [`decode`] is a thin pass-through: the input is checked against a compiled
//! JSON Schema, then deserialized into the caller's type. Whatever the schema
//! layer reports comes back untouched inside a [`ParseResult::Failure`].
//!
//! Decoding never panics and never returns an error of its own; a schema that
//! does not compile is rejected earlier, when the [`Schema`] is built.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use jsonschema::Validator;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use settle_types::{
    IssueKind, ParseResult, ValidationFailure, ValidationIssue, is_validation_failure,
};

/// `[schema]` configuration section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Maximum issues kept per failure report (the rest are counted, not
    /// kept). Unset keeps every issue the validator reports.
    #[serde(default)]
    pub max_issues: Option<usize>,
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("invalid schema: {message}")]
    Invalid { message: String },
}

/// A compiled JSON Schema describing values of type `T`.
pub struct Schema<T> {
    validator: Validator,
    max_issues: Option<usize>,
    _target: PhantomData<fn() -> T>,
}

impl<T> Schema<T> {
    /// Compile a schema document.
    pub fn new(schema: &Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::validator_for(schema).map_err(|e| SchemaError::Invalid {
            message: e.to_string(),
        })?;
        Ok(Self {
            validator,
            max_issues: None,
            _target: PhantomData,
        })
    }

    /// Compile a schema document given as JSON text.
    pub fn parse(schema: &str) -> Result<Self, SchemaError> {
        let document: Value = serde_json::from_str(schema)?;
        Self::new(&document)
    }

    /// Keep at most `max_issues` issues per failure report.
    #[must_use]
    pub fn with_max_issues(mut self, max_issues: usize) -> Self {
        self.max_issues = Some(max_issues);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: &SchemaConfig) -> Self {
        self.max_issues = config.max_issues;
        self
    }

    #[must_use]
    pub const fn max_issues(&self) -> Option<usize> {
        self.max_issues
    }

    /// Check `raw` against the schema without decoding it.
    #[must_use]
    pub fn is_valid(&self, raw: &Value) -> bool {
        self.validator.is_valid(raw)
    }

    fn schema_issues(&self, raw: &Value) -> Vec<ValidationIssue> {
        self.validator
            .iter_errors(raw)
            .map(|err| {
                ValidationIssue::new(IssueKind::Schema, err.to_string())
                    .with_instance_path(err.instance_path().as_str())
                    .with_schema_path(err.schema_path().as_str())
            })
            .collect()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("target", &type_name::<T>())
            .field("max_issues", &self.max_issues)
            .finish_non_exhaustive()
    }
}

/// Validate `raw` against `schema` and decode it into `T`.
pub fn decode<T>(raw: &Value, schema: &Schema<T>) -> ParseResult<T>
where
    T: DeserializeOwned,
{
    let issues = schema.schema_issues(raw);
    if !issues.is_empty() {
        tracing::debug!(
            target_type = type_name::<T>(),
            issues = issues.len(),
            "input rejected by schema"
        );
        let report = ValidationFailure::new(issues);
        return ParseResult::failure(match schema.max_issues {
            Some(max) => report.capped(max),
            None => report,
        });
    }

    match T::deserialize(raw) {
        Ok(value) => ParseResult::success(value),
        Err(e) => {
            tracing::debug!(
                target_type = type_name::<T>(),
                error = %e,
                "schema-valid input did not fit target type"
            );
            ParseResult::failure(ValidationFailure::single(
                IssueKind::Coercion,
                e.to_string(),
            ))
        }
    }
}

/// Parse `raw` as JSON, then [`decode`] it.
pub fn decode_str<T>(raw: &str, schema: &Schema<T>) -> ParseResult<T>
where
    T: DeserializeOwned,
{
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => decode(&value, schema),
        Err(e) => ParseResult::failure(ValidationFailure::single(IssueKind::Syntax, e.to_string())),
    }
}
