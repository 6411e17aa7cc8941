//! Requesting log exports from the backend.
//!
//! # Features
//!
//! - One multipart POST per submission, reply read as raw bytes
//! - Single-flight orchestration with a guaranteed return to idle
//! - Structured error types with full context
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chatlog_core::artifact::{DirectorySink, Materializer};
//! use chatlog_core::config::BackendConfig;
//! use chatlog_core::download::{HttpBackend, Orchestrator, SubmitOutcome};
//! use chatlog_core::form::FormState;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BackendConfig::new("http://localhost:8001")?;
//! let backend = Arc::new(HttpBackend::new(&config)?);
//! let materializer = Materializer::new(Arc::new(DirectorySink::new(".")));
//! let orchestrator = Orchestrator::new(backend, materializer);
//!
//! let mut form = FormState::new();
//! form.set_credential("token");
//! form.set_room_id("12345");
//! form.set_message_count("100");
//!
//! match orchestrator.submit(form.snapshot()).await {
//!     SubmitOutcome::Saved(saved) => println!("saved {saved}"),
//!     SubmitOutcome::Failed(category) => eprintln!("{category}"),
//!     SubmitOutcome::Busy => {}
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod orchestrator;
mod request;

pub use client::{HttpBackend, LogBackend};
pub use constants::{CONNECT_TIMEOUT_SECS, DOWNLOAD_ENDPOINT_PATH};
pub use error::DownloadError;
pub use orchestrator::{Clock, Lifecycle, Orchestrator, SubmitOutcome, validate};
pub use request::{DownloadOutcome, DownloadRequest};

// Note: Per project convention, we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
