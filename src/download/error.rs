//! Error types for the download module.
//!
//! These describe what went wrong talking to the backend. Turning them into
//! operator-facing text is the job of [`crate::failure`].

use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur while requesting a log export from the backend.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The request could not be constructed (bad endpoint, unbuildable body).
    #[error("could not build request to {url}: {reason}")]
    Request {
        /// The endpoint the request targeted.
        url: String,
        /// What made the request unbuildable.
        reason: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, broken body).
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The endpoint that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before a reply arrived.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The endpoint that timed out.
        url: String,
    },

    /// The backend replied with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// The endpoint that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// The raw reply body, usually JSON.
        body: Bytes,
    },
}

impl DownloadError {
    /// Creates a request-construction error.
    pub fn request(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Request {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error carrying the reply body.
    pub fn http_status(url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Maps a reqwest failure, keeping builder errors apart from transport errors.
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_builder() {
            Self::request(url, source.to_string())
        } else if source.is_timeout() {
            Self::timeout(url)
        } else {
            Self::network(url, source)
        }
    }
}

// No `From<reqwest::Error>`: every variant needs the endpoint for context,
// which the source error does not carry.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_timeout_display() {
        let error = DownloadError::timeout("http://backend.test/api/chatwork/download");
        let msg = error.to_string();
        assert!(msg.contains("timeout"), "Expected 'timeout' in: {msg}");
        assert!(msg.contains("/api/chatwork/download"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_download_error_http_status_display() {
        let error = DownloadError::http_status(
            "http://backend.test/api/chatwork/download",
            403,
            Bytes::from_static(br#"{"error":"invalid token"}"#),
        );
        let msg = error.to_string();
        assert!(msg.contains("403"), "Expected '403' in: {msg}");
        assert!(
            !msg.contains("invalid token"),
            "Body belongs to the classifier, not Display: {msg}"
        );
    }

    #[test]
    fn test_download_error_request_display() {
        let error = DownloadError::request("not a url", "relative URL without a base");
        let msg = error.to_string();
        assert!(msg.contains("could not build request"), "{msg}");
        assert!(msg.contains("relative URL without a base"), "{msg}");
    }
}
