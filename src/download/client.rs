//! HTTP client for the backend log export endpoint.
//!
//! [`LogBackend`] is the seam the orchestrator talks to; [`HttpBackend`] is
//! the reqwest implementation that posts the form as multipart and reads the
//! reply as raw bytes.

use bytes::Bytes;
use reqwest::Client;
use reqwest::multipart::Form;
use tracing::{debug, info, instrument};

use super::constants::{FIELD_API_TOKEN, FIELD_MESSAGE_COUNT, FIELD_ROOM_ID};
use super::error::DownloadError;
use super::request::DownloadRequest;
use crate::config::BackendConfig;
use crate::user_agent;

/// Something that can turn a [`DownloadRequest`] into CSV bytes.
///
/// Implementations must issue at most one upstream call per invocation.
#[async_trait::async_trait]
pub trait LogBackend: Send + Sync {
    /// Requests the log export.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] when the request cannot be sent, no reply
    /// arrives, or the reply has a non-success status.
    async fn download(&self, request: &DownloadRequest) -> Result<Bytes, DownloadError>;
}

/// Backend client over HTTP.
///
/// Create once and reuse; the inner client pools connections.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
}

impl HttpBackend {
    /// Builds the client from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if the TLS backend or proxy settings
    /// cannot be initialised.
    pub fn new(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout())
            .gzip(true)
            .user_agent(user_agent::default_user_agent());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.download_endpoint(),
        })
    }

    /// The endpoint every request is posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl LogBackend for HttpBackend {
    #[instrument(
        skip(self, request),
        fields(room_id = %request.room_id, message_count = %request.message_count)
    )]
    async fn download(&self, request: &DownloadRequest) -> Result<Bytes, DownloadError> {
        let form = Form::new()
            .text(FIELD_API_TOKEN, request.credential.expose().to_string())
            .text(FIELD_ROOM_ID, request.room_id.as_str().to_string())
            .text(FIELD_MESSAGE_COUNT, request.message_count.to_string());

        debug!(endpoint = %self.endpoint, "sending export request");
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DownloadError::from_reqwest(&self.endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            // A reply arrived; an unreadable body still counts as a server error.
            let body = response.bytes().await.unwrap_or_else(|e| {
                debug!(error = %e, "failed to read error body");
                Bytes::new()
            });
            debug!(status = status.as_u16(), bytes = body.len(), "backend rejected request");
            return Err(DownloadError::http_status(
                &self.endpoint,
                status.as_u16(),
                body,
            ));
        }

        let payload = response
            .bytes()
            .await
            .map_err(|e| DownloadError::from_reqwest(&self.endpoint, e))?;

        info!(status = status.as_u16(), bytes = payload.len(), "export received");
        Ok(payload)
    }
}
