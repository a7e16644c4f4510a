//! Adapters from two-channel async completion to settled result values.
//!
//! A wrapped operation completes on its payload channel (`Ok`) or its failure
//! channel (`Err`, or a panic for [`settle_unwind`]). The adapters here turn
//! that into a single [`Settled`] value that the caller classifies after the
//! fact:
//!
//! ```ignore
//! use settle_core::SettleExt;
//! use settle_types::Settled;
//!
//! let user: Settled<User> = fetch_user(id).settle().await;
//! match user {
//!     Ok(user) => render(user),
//!     Err(err) => tracing::warn!(%err, "lookup failed"),
//! }
//! ```
//!
//! There is no scheduler, retry or timeout in here. Each adapter polls the
//! wrapped operation and nothing else.

mod ext;
mod settle;

pub use ext::{Settle, SettleExt, SettleSystem, SettleUnwind, SettleWith};
pub use settle::{settle, settle_system, settle_unwind, settle_with};

pub use settle_types::{
    Classify, ParseResult, Settled, SystemError, is_error, is_validation_failure,
};
