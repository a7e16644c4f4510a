//! The HTTP failure shape.

use std::error::Error as StdError;

use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Url};
use settle_types::SystemError;
use thiserror::Error;

/// Failure channel of every [`HttpClient`](crate::HttpClient) call.
///
/// Unlike [`SystemError`], a status failure keeps the response context
/// (status, headers, URL and a capped copy of the body) for inspection.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    Status {
        status: StatusCode,
        url: Url,
        headers: HeaderMap,
        body: String,
    },
    /// The request never produced a response (connect, TLS, body stream...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// A 2xx response whose body did not deserialize into the requested type.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: Url,
        body: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid URL {input:?}: {message}")]
    InvalidUrl { input: String, message: String },
    #[error("invalid client configuration: {message}")]
    Build { message: String },
}

impl HttpError {
    /// Response status, when the server answered.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::Decode { .. } | Self::InvalidUrl { .. } | Self::Build { .. } => None,
        }
    }

    /// Captured response body for status and decode failures.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } | Self::Decode { body, .. } => Some(body),
            Self::Transport(_) | Self::InvalidUrl { .. } | Self::Build { .. } => None,
        }
    }

    #[must_use]
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Self::Status { headers, .. } => Some(headers),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Short machine-readable kind, used as the `SystemError` code for
    /// everything except status failures.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Transport(_) => "transport",
            Self::Decode { .. } => "decode",
            Self::InvalidUrl { .. } => "invalid_url",
            Self::Build { .. } => "build",
        }
    }
}

impl From<HttpError> for SystemError {
    fn from(err: HttpError) -> Self {
        let code = match err.status() {
            Some(status) => status.as_u16().to_string(),
            None => err.kind().to_string(),
        };
        SystemError::from_error(&err).with_code(code)
    }
}

/// True iff `err` is the HTTP failure shape rather than some other error.
///
/// A plain [`SystemError`], even one converted from an [`HttpError`], does
/// not match.
#[must_use]
pub fn is_http_error(err: &(dyn StdError + 'static)) -> bool {
    err.is::<HttpError>()
}
