//! Configuration loading for the settle adapters.
//!
//! The file is TOML, read from `$SETTLE_CONFIG` when set and from
//! `~/.settle/config.toml` otherwise:
//!
//! ```toml
//! [http]
//! base_url = "https://api.example.com/v1"
//! user_agent = "billing-sync/2.1"
//! max_error_body_bytes = 16384
//! https_only = true
//!
//! [http.headers]
//! authorization = "Bearer ${BILLING_TOKEN}"
//!
//! [schema]
//! max_issues = 10
//! ```
//!
//! Header values support `${VAR}` environment expansion.

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;
use settle_http::HttpConfig;
use settle_schema::SchemaConfig;
use thiserror::Error;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "SETTLE_CONFIG";

#[derive(Debug, Default, Deserialize)]
pub struct SettleConfig {
    pub http: Option<HttpConfig>,
    pub schema: Option<SchemaConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// Replace every `${VAR}` with the value of `VAR` (empty if unset).
///
/// An unterminated `${` is kept verbatim.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

impl SettleConfig {
    /// Load from the default location, falling back to defaults on any
    /// problem. Problems are logged, not returned.
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(err) => {
                tracing::warn!(path = %err.path().display(), error = %err, "ignoring config file");
                Self::default()
            }
        }
    }

    /// Load from `path`. A missing file is `Ok(None)`.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(Some(config))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// The `[http]` section with header values env-expanded.
    #[must_use]
    pub fn http(&self) -> HttpConfig {
        let mut http = self.http.clone().unwrap_or_default();
        for value in http.headers.values_mut() {
            *value = expand_env_vars(value);
        }
        http
    }

    /// The `[schema]` section, or defaults.
    #[must_use]
    pub fn schema(&self) -> SchemaConfig {
        self.schema.clone().unwrap_or_default()
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(explicit) = env::var_os(CONFIG_PATH_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(explicit));
    }
    dirs::home_dir().map(|home| home.join(".settle").join("config.toml"))
}
