//! Result channel types for settle.
//!
//! This crate contains the pure vocabulary of the library: no IO, no async.
//! A fallible operation hands back a [`Settled`] value (an ordinary tagged
//! `Result`) instead of failing out-of-band, and callers tell the branches
//! apart with [`is_error`] / [`is_validation_failure`] or, more idiomatically,
//! with a `match`.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod parse;
mod system_error;

pub use parse::{Discriminant, IssueKind, ParseResult, ValidationFailure, ValidationIssue};
pub use system_error::{IO_CODE, JSON_CODE, PANIC_CODE, SystemError};

// ============================================================================
// Result Values
// ============================================================================

/// Value or error, produced once when a wrapped operation settles.
///
/// The error category defaults to [`SystemError`].
pub type Settled<T, E = SystemError> = Result<T, E>;

/// Anything with a success branch and an error branch.
///
/// Implementations must be pure: the answer depends on the value alone and
/// never changes between calls.
pub trait Classify {
    /// True iff the value is on its error branch.
    fn is_error(&self) -> bool;
}

impl<T, E> Classify for Result<T, E> {
    fn is_error(&self) -> bool {
        self.is_err()
    }
}

impl<T> Classify for ParseResult<T> {
    fn is_error(&self) -> bool {
        self.is_failure()
    }
}

impl<C: Classify + ?Sized> Classify for &C {
    fn is_error(&self) -> bool {
        (**self).is_error()
    }
}

/// True iff `value` is on its error branch.
#[must_use]
pub fn is_error<C: Classify + ?Sized>(value: &C) -> bool {
    value.is_error()
}

/// True iff a [`ParseResult`] carries a validation failure, decided by its
/// [`Discriminant`].
#[must_use]
pub fn is_validation_failure<T>(value: &ParseResult<T>) -> bool {
    value.discriminant() == Discriminant::Failure
}
