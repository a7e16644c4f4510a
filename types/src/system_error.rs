//! The default error category for settled operations.
//!
//! `SystemError` is deliberately small: an optional machine-readable `code`
//! and an optional human-readable `message`. Anything that fails on the
//! failure channel of a wrapped operation can be collapsed into it.

use std::error::Error as StdError;
use std::fmt::Write;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code assigned when a wrapped operation panicked instead of returning.
pub const PANIC_CODE: &str = "panic";
/// Code assigned to errors converted from `io::Error`.
pub const IO_CODE: &str = "io";
/// Code assigned to errors converted from `serde_json::Error`.
pub const JSON_CODE: &str = "json";

/// Generic system error with optional code and message attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[error("{}", describe(.code.as_deref(), .message.as_deref()))]
pub struct SystemError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

fn describe(code: Option<&str>, message: Option<&str>) -> String {
    match (code, message) {
        (Some(code), Some(message)) => format!("{message} ({code})"),
        (None, Some(message)) => message.to_string(),
        (Some(code), None) => format!("system error ({code})"),
        (None, None) => "system error".to_string(),
    }
}

impl SystemError {
    /// An error with neither code nor message.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            code: None,
            message: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Collapse any error (and its source chain) into a `SystemError`.
    ///
    /// The message is the top-level display followed by each source, joined
    /// with `": "`, which is how `anyhow` renders `{:#}`.
    #[must_use]
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let _ = write!(message, ": {cause}");
            source = cause.source();
        }
        Self::new().with_message(message)
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// True if this error was produced from a panic on the wrapped operation.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        self.code() == Some(PANIC_CODE)
    }
}

impl From<io::Error> for SystemError {
    fn from(err: io::Error) -> Self {
        Self::from_error(&err).with_code(IO_CODE)
    }
}

impl From<serde_json::Error> for SystemError {
    fn from(err: serde_json::Error) -> Self {
        Self::from_error(&err).with_code(JSON_CODE)
    }
}

impl From<anyhow::Error> for SystemError {
    fn from(err: anyhow::Error) -> Self {
        Self::new().with_message(format!("{err:#}"))
    }
}

impl From<String> for SystemError {
    fn from(message: String) -> Self {
        Self::new().with_message(message)
    }
}

impl From<&str> for SystemError {
    fn from(message: &str) -> Self {
        Self::new().with_message(message)
    }
}
