//! Failure classification and operator-facing messages.
//!
//! Every failed attempt ends up as exactly one [`ErrorCategory`], whose
//! [`message`](ErrorCategory::message) is the text shown to the operator.

use std::fmt;

use thiserror::Error;

use crate::download::DownloadError;

/// Shown when the backend could not be reached or never answered.
pub const NO_RESPONSE_MESSAGE: &str = "サーバーから応答がありませんでした";

/// Shown when the request could not be sent, or something failed locally.
pub const GENERIC_FAILURE_MESSAGE: &str = "ダウンロード中にエラーが発生しました";

/// A required field was empty. Detected before any network activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("APIトークンを入力してください")]
    MissingCredential,
    #[error("ルームIDを入力してください")]
    MissingRoomId,
}

impl ValidationError {
    /// Short English description for logs.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::MissingCredential => "missing credential",
            Self::MissingRoomId => "missing room identifier",
        }
    }
}

/// Fixed taxonomy of attempt failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected locally; the backend was never contacted.
    Validation(ValidationError),
    /// The backend replied with a non-success status.
    Server {
        status: u16,
        /// Reply body serialized as JSON text.
        body: String,
    },
    /// The request went out but no reply came back.
    NoResponse,
    /// The request could not be built or sent.
    Client,
    /// Anything else, e.g. the artifact could not be saved.
    Unexpected,
}

impl ErrorCategory {
    /// Text rendered verbatim as the displayed error.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Validation(error) => error.to_string(),
            Self::Server { status, body } => format!("エラー: {status} - {body}"),
            Self::NoResponse => NO_RESPONSE_MESSAGE.to_string(),
            Self::Client | Self::Unexpected => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Stable label for structured logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Server { .. } => "server",
            Self::NoResponse => "no_response",
            Self::Client => "client",
            Self::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl From<ValidationError> for ErrorCategory {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error)
    }
}

/// Classifies a backend failure. Terminal: nothing is retried.
#[must_use]
pub fn classify(error: &DownloadError) -> ErrorCategory {
    match error {
        DownloadError::HttpStatus { status, body, .. } => ErrorCategory::Server {
            status: *status,
            body: serialize_body(body),
        },
        DownloadError::Network { .. } | DownloadError::Timeout { .. } => {
            ErrorCategory::NoResponse
        }
        DownloadError::Request { .. } => ErrorCategory::Client,
    }
}

/// Renders a reply body as JSON text.
///
/// JSON bodies are re-serialized compactly with their key order kept; any
/// other body becomes a JSON string literal.
#[must_use]
pub fn serialize_body(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body)
        && let Ok(rendered) = serde_json::to_string(&value)
    {
        return rendered;
    }

    let text = String::from_utf8_lossy(body);
    serde_json::to_string(&text).unwrap_or_else(|_| text.into_owned())
}
