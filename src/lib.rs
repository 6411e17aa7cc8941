//! Chat Log Downloader Core Library
//!
//! Fetches a chat room's message log from the export backend and saves the
//! CSV reply as a local file. The payload is never parsed or rewritten.
//!
//! # Architecture
//!
//! - [`form`] - Operator-entered values and message-count coercion
//! - [`download`] - Backend client and single-flight orchestration
//! - [`artifact`] - Naming and saving the CSV artifact
//! - [`failure`] - Failure taxonomy and operator-facing messages
//! - [`config`] - Backend base URL and timeouts

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod artifact;
pub mod config;
pub mod download;
pub mod failure;
pub mod form;
mod user_agent;

// Re-export commonly used types
pub use artifact::{ArtifactSink, DirectorySink, Materializer, SavedArtifact, StdoutSink};
pub use config::{BackendConfig, ConfigError};
pub use download::{
    DownloadError, HttpBackend, Lifecycle, LogBackend, Orchestrator, SubmitOutcome,
};
pub use failure::{ErrorCategory, ValidationError, classify};
pub use form::{FormSnapshot, FormState, MessageCount};
