//! reqwest client whose calls settle into `Settled<_, HttpError>`.

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use settle_core::SettleExt;
use settle_schema::{ParseResult, Schema, decode_str};
use settle_types::Settled;

use crate::{DEFAULT_MAX_ERROR_BODY_BYTES, HttpConfig, HttpError};

/// A settled 2xx response with its decoded body.
#[derive(Debug, Clone)]
pub struct HttpResponse<T> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: Url,
    pub data: T,
}

impl<T> HttpResponse<T> {
    #[must_use]
    pub fn map<U, F: FnOnce(T) -> U>(self, op: F) -> HttpResponse<U> {
        HttpResponse {
            status: self.status,
            headers: self.headers,
            url: self.url,
            data: op(self.data),
        }
    }

    #[must_use]
    pub fn into_data(self) -> T {
        self.data
    }
}

/// Send `request` and settle the outcome.
///
/// Transport failures and non-2xx statuses both land in the error branch. For
/// a status failure the body is read (at most `max_error_body_bytes`) and kept
/// on the error.
pub async fn send(
    request: RequestBuilder,
    max_error_body_bytes: usize,
) -> Settled<Response, HttpError> {
    let response = request.send().settle::<HttpError>().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let headers = response.headers().clone();
    let body = read_capped_body(response, max_error_body_bytes).await;
    tracing::debug!(%status, %url, body_bytes = body.len(), "request settled with error status");
    Err(HttpError::Status {
        status,
        url,
        headers,
        body,
    })
}

const TRUNCATED: &str = "...(truncated)";
const INCOMPLETE: &str = "...(incomplete)";

/// Read at most `max_bytes` of an error body.
///
/// A body longer than the cap ends in `...(truncated)`; one cut short by a
/// failing stream ends in `...(incomplete)`.
async fn read_capped_body(response: Response, max_bytes: usize) -> String {
    let mut kept = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(next) = stream.next().await {
        let chunk = match next {
            Ok(chunk) => chunk,
            Err(err) => {
                tracing::debug!(error = %err, read = kept.len(), "error body stream failed");
                return with_marker(&kept, Some(INCOMPLETE));
            }
        };
        let room = max_bytes - kept.len();
        if chunk.len() > room {
            kept.extend_from_slice(&chunk[..room]);
            return with_marker(&kept, Some(TRUNCATED));
        }
        kept.extend_from_slice(&chunk);
    }
    with_marker(&kept, None)
}

fn lossy_capped(bytes: &[u8], max_bytes: usize) -> String {
    match bytes.get(..max_bytes) {
        Some(head) if bytes.len() > max_bytes => with_marker(head, Some(TRUNCATED)),
        _ => with_marker(bytes, None),
    }
}

fn with_marker(bytes: &[u8], marker: Option<&str>) -> String {
    let text = String::from_utf8_lossy(bytes);
    match marker {
        Some(marker) => format!("{text}{marker}"),
        None => text.into_owned(),
    }
}

/// JSON-over-HTTP client.
///
/// Paths are resolved against `base_url` when one is configured; otherwise
/// they must be absolute URLs.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Option<Url>,
    max_error_body_bytes: usize,
}

impl HttpClient {
    /// Build a client (and its underlying `reqwest::Client`) from config.
    pub fn new(config: &HttpConfig) -> Result<Self, HttpError> {
        let mut builder = reqwest::Client::builder()
            .default_headers(default_headers(config)?)
            .https_only(config.https_only);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        let client = builder.build().map_err(|e| HttpError::Build {
            message: e.to_string(),
        })?;
        Self::with_client(client, config)
    }

    /// Wrap an existing `reqwest::Client`. Only `base_url` and
    /// `max_error_body_bytes` are taken from `config`.
    pub fn with_client(client: reqwest::Client, config: &HttpConfig) -> Result<Self, HttpError> {
        let base_url = config.base_url.as_deref().map(parse_base_url).transpose()?;
        Ok(Self {
            client,
            base_url,
            max_error_body_bytes: config
                .max_error_body_bytes
                .unwrap_or(DEFAULT_MAX_ERROR_BODY_BYTES),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Resolve `path` against the base URL.
    pub fn url(&self, path: &str) -> Result<Url, HttpError> {
        let resolved = match &self.base_url {
            Some(base) => base.join(path.trim_start_matches('/')),
            None => Url::parse(path),
        };
        resolved.map_err(|e| HttpError::InvalidUrl {
            input: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Start a request; useful for headers or bodies the helpers don't cover.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, HttpError> {
        let url = self.url(path)?;
        tracing::debug!(%method, %url, "building request");
        Ok(self.client.request(method, url))
    }

    /// Send a prepared request and decode its JSON body into `T`.
    ///
    /// An empty body decodes as JSON `null`, so `()`, `Option<_>` and
    /// `Value` all accept `204 No Content`.
    pub async fn execute<T>(&self, request: RequestBuilder) -> Settled<HttpResponse<T>, HttpError>
    where
        T: DeserializeOwned,
    {
        let response = send(request, self.max_error_body_bytes).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let bytes = response.bytes().settle::<HttpError>().await?;

        let decoded = if bytes.is_empty() {
            serde_json::from_value(Value::Null)
        } else {
            serde_json::from_slice(&bytes)
        };
        match decoded {
            Ok(data) => Ok(HttpResponse {
                status,
                headers,
                url,
                data,
            }),
            Err(source) => {
                tracing::debug!(%url, error = %source, "response body did not decode");
                Err(HttpError::Decode {
                    url,
                    body: lossy_capped(&bytes, self.max_error_body_bytes),
                    source,
                })
            }
        }
    }

    pub async fn get<T>(&self, path: &str) -> Settled<HttpResponse<T>, HttpError>
    where
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::GET, path)?).await
    }

    pub async fn delete<T>(&self, path: &str) -> Settled<HttpResponse<T>, HttpError>
    where
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::DELETE, path)?).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Settled<HttpResponse<T>, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::POST, path)?.json(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Settled<HttpResponse<T>, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::PUT, path)?.json(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Settled<HttpResponse<T>, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::PATCH, path)?.json(body)).await
    }

    /// GET `path` and validate the body against `schema`.
    ///
    /// Two channels, nested: transport and status failures settle into the
    /// outer error; a body that is not JSON, violates the schema, or does
    /// not fit `T` settles into the inner [`ParseResult`].
    pub async fn get_validated<T>(
        &self,
        path: &str,
        schema: &Schema<T>,
    ) -> Settled<HttpResponse<ParseResult<T>>, HttpError>
    where
        T: DeserializeOwned,
    {
        let request = self.request(Method::GET, path)?;
        let response = send(request, self.max_error_body_bytes).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let text = response.text().settle::<HttpError>().await?;
        Ok(HttpResponse {
            status,
            headers,
            url,
            data: decode_str(&text, schema),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, HttpError> {
    // A trailing slash makes `join` append instead of replacing the last segment.
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|e| HttpError::InvalidUrl {
        input: raw.to_string(),
        message: e.to_string(),
    })
}

fn default_headers(config: &HttpConfig) -> Result<HeaderMap, HttpError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| HttpError::Build {
            message: format!("invalid header name {name:?}: {e}"),
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| HttpError::Build {
            message: format!("invalid value for header {name}: {e}"),
        })?;
        headers.insert(name, value);
    }
    Ok(headers)
}
