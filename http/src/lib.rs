//! HTTP adapter for the settle result channel.
//!
//! Every [`HttpClient`] call resolves to `Settled<_, HttpError>`: transport
//! failures, non-2xx statuses and undecodable bodies all come back as values
//! in the error branch, never as panics or a second error path.
//!
//! | Call | Ok branch | Err branch |
//! |------|-----------|------------|
//! | [`send`] | raw `reqwest::Response` (2xx) | `Status`, `Transport` |
//! | [`HttpClient::get`] & co. | [`HttpResponse<T>`] | `Status`, `Transport`, `Decode`, `InvalidUrl` |
//! | [`HttpClient::get_validated`] | [`HttpResponse<ParseResult<T>>`] | `Status`, `Transport`, `InvalidUrl` |
//!
//! Use [`is_http_error`] to tell this error shape apart from a generic
//! [`SystemError`](settle_types::SystemError) behind a `dyn Error`.

mod client;
mod error;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use client::{HttpClient, HttpResponse, send};
pub use error::{HttpError, is_http_error};
pub use settle_schema::ParseResult;

/// Default cap on the bytes of a response body kept on an [`HttpError`].
pub const DEFAULT_MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// `[http]` configuration section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Base URL relative paths are resolved against.
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    /// Headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Cap on response bytes kept on errors. Default: 32 KiB.
    pub max_error_body_bytes: Option<usize>,
    /// Refuse plain `http://` URLs.
    #[serde(default)]
    pub https_only: bool,
}
