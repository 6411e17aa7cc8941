//! Backend connection settings, resolved once at process start.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::download::{CONNECT_TIMEOUT_SECS, DOWNLOAD_ENDPOINT_PATH};

/// Errors raised while validating backend settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL did not parse as an absolute URL.
    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidBaseUrl {
        /// The offending value.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// The base URL parsed but is not http or https.
    #[error("unsupported backend URL scheme {scheme:?} (expected http or https)")]
    UnsupportedScheme {
        /// The scheme that was given.
        scheme: String,
    },

    /// A timeout of zero seconds was requested.
    #[error("invalid value for `{field}`: 0. Expected range: 1..=3600")]
    ZeroTimeout {
        /// The setting name.
        field: &'static str,
    },
}

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    base_url: Url,
    connect_timeout: Duration,
    request_timeout: Option<Duration>,
}

impl BackendConfig {
    /// Validates `base_url` and applies default timeouts.
    ///
    /// A missing trailing slash is tolerated; `http://host/prefix` and
    /// `http://host/prefix/` resolve to the same endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the URL does not parse or is not http(s).
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let mut parsed = Url::parse(base_url.trim()).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme {
                scheme: parsed.scheme().to_string(),
            });
        }

        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }

        Ok(Self {
            base_url: parsed,
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            request_timeout: None,
        })
    }

    /// Overrides the connect timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] for a zero value.
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Result<Self, ConfigError> {
        if secs == 0 {
            return Err(ConfigError::ZeroTimeout {
                field: "connect_timeout",
            });
        }
        self.connect_timeout = Duration::from_secs(secs);
        Ok(self)
    }

    /// Sets an overall request timeout. Without one, the transport default applies.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] for a zero value.
    pub fn with_request_timeout_secs(mut self, secs: Option<u64>) -> Result<Self, ConfigError> {
        self.request_timeout = match secs {
            Some(0) => {
                return Err(ConfigError::ZeroTimeout {
                    field: "request_timeout",
                });
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };
        Ok(self)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Full URL of the log export endpoint.
    #[must_use]
    pub fn download_endpoint(&self) -> String {
        self.base_url
            .join(DOWNLOAD_ENDPOINT_PATH)
            .map_or_else(
                |_| format!("{}{DOWNLOAD_ENDPOINT_PATH}", self.base_url),
                String::from,
            )
    }
}
