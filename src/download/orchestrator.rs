//! Single-flight submission of a form snapshot.
//!
//! [`Orchestrator::submit`] validates the snapshot, sends exactly one request
//! to the backend, and routes the reply: payloads go to the
//! [`Materializer`], failures go to [`classify`]. It never returns an error
//! and never unwinds into the caller; every failure ends up as the displayed
//! error string.
//!
//! Lifecycle: `Idle -> Dispatching -> Idle`. A submit that arrives while a
//! request is in flight is rejected with [`SubmitOutcome::Busy`].

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use tracing::{debug, error, info, instrument, warn};

use super::client::LogBackend;
use super::request::{DownloadOutcome, DownloadRequest};
use crate::artifact::{Materializer, SavedArtifact};
use crate::failure::{ErrorCategory, ValidationError, classify};
use crate::form::FormSnapshot;

/// Source of "now" for artifact names.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Whether a request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Dispatching,
}

/// What a single `submit` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The export was received and saved.
    Saved(SavedArtifact),
    /// The attempt failed; the category's message is now the displayed error.
    Failed(ErrorCategory),
    /// Another request was in flight; nothing was done.
    Busy,
}

impl SubmitOutcome {
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

#[derive(Debug)]
struct SessionState {
    lifecycle: Lifecycle,
    displayed_error: Option<String>,
}

/// Checks the fields the backend cannot do without.
///
/// # Errors
///
/// Returns the first missing field, credential before room.
pub fn validate(snapshot: &FormSnapshot) -> Result<(), ValidationError> {
    if snapshot.credential.is_empty() {
        return Err(ValidationError::MissingCredential);
    }
    if snapshot.room_id.is_empty() {
        return Err(ValidationError::MissingRoomId);
    }
    Ok(())
}

/// Coordinates one download at a time.
pub struct Orchestrator {
    backend: Arc<dyn LogBackend>,
    materializer: Materializer,
    clock: Clock,
    state: Mutex<SessionState>,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("state", &*self.lock_state())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    #[must_use]
    pub fn new(backend: Arc<dyn LogBackend>, materializer: Materializer) -> Self {
        Self {
            backend,
            materializer,
            clock: Arc::new(Utc::now),
            state: Mutex::new(SessionState {
                lifecycle: Lifecycle::Idle,
                displayed_error: None,
            }),
        }
    }

    /// Replaces the wall clock used for artifact names.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lock_state().lifecycle
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.lifecycle() == Lifecycle::Dispatching
    }

    /// The most recent error message, if the last attempt failed.
    #[must_use]
    pub fn displayed_error(&self) -> Option<String> {
        self.lock_state().displayed_error.clone()
    }

    /// Validates `snapshot` and, if it is complete, performs one download.
    #[instrument(skip(self, snapshot), fields(room_id = %snapshot.room_id))]
    pub async fn submit(&self, snapshot: FormSnapshot) -> SubmitOutcome {
        let request = {
            let mut state = self.lock_state();
            if state.lifecycle == Lifecycle::Dispatching {
                warn!("submit ignored: a download is already in flight");
                return SubmitOutcome::Busy;
            }

            if let Err(invalid) = validate(&snapshot) {
                debug!(reason = invalid.description(), "submit rejected by validation");
                let category = ErrorCategory::from(invalid);
                state.displayed_error = Some(category.message());
                return SubmitOutcome::Failed(category);
            }

            state.displayed_error = None;
            state.lifecycle = Lifecycle::Dispatching;
            DownloadRequest::from(snapshot)
        };
        let _release = DispatchGuard { state: &self.state };

        let result = AssertUnwindSafe(self.dispatch(&request))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                error!("download attempt panicked");
                Err(ErrorCategory::Unexpected)
            });

        match result {
            Ok(saved) => SubmitOutcome::Saved(saved),
            Err(category) => {
                self.lock_state().displayed_error = Some(category.message());
                SubmitOutcome::Failed(category)
            }
        }
    }

    async fn dispatch(&self, request: &DownloadRequest) -> Result<SavedArtifact, ErrorCategory> {
        info!(message_count = %request.message_count, "requesting log export");

        match DownloadOutcome::from(self.backend.download(request).await) {
            DownloadOutcome::Success(payload) => {
                let now = (self.clock)();
                self.materializer
                    .materialize(payload, &request.room_id, now)
                    .await
                    .map_err(|e| {
                        error!(error = %e, "failed to save artifact");
                        ErrorCategory::Unexpected
                    })
            }
            DownloadOutcome::Failure(failure) => {
                let category = classify(&failure);
                warn!(error = %failure, category = category.label(), "download failed");
                Err(category)
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns the lifecycle to `Idle` on every exit from a dispatch.
struct DispatchGuard<'a> {
    state: &'a Mutex<SessionState>,
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .lifecycle = Lifecycle::Idle;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;
    use chrono::TimeZone;
    use tokio::sync::Notify;

    use super::*;
    use crate::artifact::{ArtifactSink, CsvBlob, MaterializeError};
    use crate::download::DownloadError;
    use crate::failure::{GENERIC_FAILURE_MESSAGE, NO_RESPONSE_MESSAGE};
    use crate::form::FormState;

    const URL: &str = "http://backend.test/api/chatwork/download";

    enum Reply {
        Csv(&'static [u8]),
        Status(u16, &'static [u8]),
        Timeout,
        Panic,
    }

    struct FakeBackend {
        reply: Reply,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl FakeBackend {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                gate: None,
            })
        }

        fn gated(reply: Reply, gate: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                gate: Some(gate),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl LogBackend for FakeBackend {
        async fn download(&self, _request: &DownloadRequest) -> Result<Bytes, DownloadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match self.reply {
                Reply::Csv(body) => Ok(Bytes::from_static(body)),
                Reply::Status(status, body) => {
                    Err(DownloadError::http_status(URL, status, Bytes::from_static(body)))
                }
                Reply::Timeout => Err(DownloadError::timeout(URL)),
                Reply::Panic => panic!("backend blew up"),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        saves: Mutex<Vec<(String, Bytes)>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl ArtifactSink for RecordingSink {
        async fn save(
            &self,
            blob: &CsvBlob,
            suggested_name: &str,
        ) -> Result<SavedArtifact, MaterializeError> {
            if self.fail {
                return Err(MaterializeError::stdout(std::io::Error::other("disk full")));
            }
            self.saves
                .lock()
                .unwrap()
                .push((suggested_name.to_string(), blob.bytes().clone()));
            Ok(SavedArtifact::stdout(suggested_name, blob.len()))
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn orchestrator(backend: Arc<FakeBackend>, sink: Arc<RecordingSink>) -> Orchestrator {
        Orchestrator::new(backend, Materializer::new(sink)).with_clock(fixed_now)
    }

    fn snapshot(token: &str, room: &str) -> FormSnapshot {
        let mut form = FormState::new();
        form.set_credential(token);
        form.set_room_id(room);
        form.snapshot()
    }

    #[tokio::test]
    async fn test_missing_credential_skips_backend() {
        let backend = FakeBackend::new(Reply::Csv(b""));
        let sink = Arc::new(RecordingSink::default());
        let orchestrator = orchestrator(backend.clone(), sink.clone());

        let outcome = orchestrator.submit(snapshot("", "999")).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed(ErrorCategory::Validation(ValidationError::MissingCredential))
        );
        assert_eq!(backend.calls(), 0);
        assert_eq!(orchestrator.lifecycle(), Lifecycle::Idle);
        assert_eq!(
            orchestrator.displayed_error().as_deref(),
            Some("APIトークンを入力してください")
        );
        assert!(sink.saves.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_room_skips_backend() {
        let backend = FakeBackend::new(Reply::Csv(b""));
        let orchestrator = orchestrator(backend.clone(), Arc::default());

        let outcome = orchestrator.submit(snapshot("tok", "")).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed(ErrorCategory::Validation(ValidationError::MissingRoomId))
        );
        assert_eq!(backend.calls(), 0);
        assert!(!orchestrator.is_busy());
    }

    #[tokio::test]
    async fn test_credential_checked_before_room() {
        let orchestrator = orchestrator(FakeBackend::new(Reply::Csv(b"")), Arc::default());
        let outcome = orchestrator.submit(snapshot("", "")).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Failed(ErrorCategory::Validation(ValidationError::MissingCredential))
        );
    }

    #[tokio::test]
    async fn test_success_saves_exact_bytes_once() {
        let backend = FakeBackend::new(Reply::Csv(b"a,b\n1,2"));
        let sink = Arc::new(RecordingSink::default());
        let orchestrator = orchestrator(backend.clone(), sink.clone());

        let outcome = orchestrator.submit(snapshot("tok", "999")).await;

        assert!(outcome.is_saved(), "{outcome:?}");
        assert_eq!(backend.calls(), 1);
        assert_eq!(orchestrator.displayed_error(), None);
        assert_eq!(orchestrator.lifecycle(), Lifecycle::Idle);
        let saves = sink.saves.lock().unwrap();
        assert_eq!(
            *saves,
            vec![(
                "chatwork_logs_999_2024-01-01T000000.000Z.csv".to_string(),
                Bytes::from_static(b"a,b\n1,2")
            )]
        );
    }

    #[tokio::test]
    async fn test_server_error_sets_displayed_error() {
        let backend = FakeBackend::new(Reply::Status(403, br#"{"error":"invalid token"}"#));
        let sink = Arc::new(RecordingSink::default());
        let orchestrator = orchestrator(backend.clone(), sink.clone());

        let outcome = orchestrator.submit(snapshot("tok", "999")).await;

        assert!(matches!(
            outcome,
            SubmitOutcome::Failed(ErrorCategory::Server { status: 403, .. })
        ));
        assert_eq!(
            orchestrator.displayed_error().as_deref(),
            Some(r#"エラー: 403 - {"error":"invalid token"}"#)
        );
        assert_eq!(orchestrator.lifecycle(), Lifecycle::Idle);
        assert!(sink.saves.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_is_reported_as_no_response() {
        let orchestrator = orchestrator(FakeBackend::new(Reply::Timeout), Arc::default());

        let outcome = orchestrator.submit(snapshot("tok", "999")).await;

        assert_eq!(outcome, SubmitOutcome::Failed(ErrorCategory::NoResponse));
        assert_eq!(
            orchestrator.displayed_error().as_deref(),
            Some(NO_RESPONSE_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_save_failure_is_unexpected() {
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..RecordingSink::default()
        });
        let orchestrator = orchestrator(FakeBackend::new(Reply::Csv(b"x")), sink);

        let outcome = orchestrator.submit(snapshot("tok", "999")).await;

        assert_eq!(outcome, SubmitOutcome::Failed(ErrorCategory::Unexpected));
        assert_eq!(
            orchestrator.displayed_error().as_deref(),
            Some(GENERIC_FAILURE_MESSAGE)
        );
        assert_eq!(orchestrator.lifecycle(), Lifecycle::Idle);
    }

    #[tokio::test]
    async fn test_panicking_backend_still_returns_to_idle() {
        let backend = FakeBackend::new(Reply::Panic);
        let orchestrator = orchestrator(backend.clone(), Arc::default());

        let outcome = orchestrator.submit(snapshot("tok", "999")).await;

        assert_eq!(outcome, SubmitOutcome::Failed(ErrorCategory::Unexpected));
        assert_eq!(backend.calls(), 1);
        assert_eq!(orchestrator.lifecycle(), Lifecycle::Idle);
    }

    #[tokio::test]
    async fn test_new_attempt_clears_previous_error() {
        let orchestrator = orchestrator(FakeBackend::new(Reply::Csv(b"ok")), Arc::default());

        orchestrator.submit(snapshot("", "999")).await;
        assert!(orchestrator.displayed_error().is_some());

        let outcome = orchestrator.submit(snapshot("tok", "999")).await;
        assert!(outcome.is_saved());
        assert_eq!(orchestrator.displayed_error(), None);
    }

    #[tokio::test]
    async fn test_latest_error_replaces_prior_one() {
        let orchestrator = orchestrator(FakeBackend::new(Reply::Timeout), Arc::default());

        orchestrator.submit(snapshot("tok", "")).await;
        orchestrator.submit(snapshot("tok", "999")).await;

        assert_eq!(
            orchestrator.displayed_error().as_deref(),
            Some(NO_RESPONSE_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_submit_while_dispatching_is_rejected() {
        let gate = Arc::new(Notify::new());
        let backend = FakeBackend::gated(Reply::Csv(b"a,b"), gate.clone());
        let sink = Arc::new(RecordingSink::default());
        let orchestrator = Arc::new(orchestrator(backend.clone(), sink.clone()));

        let first = tokio::spawn({
            let orchestrator = orchestrator.clone();
            async move { orchestrator.submit(snapshot("tok", "999")).await }
        });

        while backend.calls() == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(orchestrator.lifecycle(), Lifecycle::Dispatching);

        let second = orchestrator.submit(snapshot("tok", "999")).await;
        assert_eq!(second, SubmitOutcome::Busy);

        gate.notify_one();
        let first = first.await.unwrap();

        assert!(first.is_saved(), "{first:?}");
        assert_eq!(backend.calls(), 1);
        assert_eq!(sink.saves.lock().unwrap().len(), 1);
        assert_eq!(orchestrator.lifecycle(), Lifecycle::Idle);
    }
}
