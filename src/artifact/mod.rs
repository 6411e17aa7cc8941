//! Turns a successful export reply into a saved CSV artifact.
//!
//! The payload is passed through untouched: this module never parses or
//! rewrites log contents. It only names the artifact and hands the bytes to
//! an [`ArtifactSink`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use chatlog_core::artifact::{DirectorySink, Materializer};
//! use chatlog_core::form::RoomId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let materializer = Materializer::new(Arc::new(DirectorySink::new("./exports")));
//! let saved = materializer
//!     .materialize(Bytes::from_static(b"a,b\n1,2"), &RoomId::new("12345"), chrono::Utc::now())
//!     .await?;
//! println!("saved {saved}");
//! # Ok(())
//! # }
//! ```

mod error;
mod filename;
mod sink;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

pub use error::MaterializeError;
pub use filename::{ARTIFACT_EXTENSION, ARTIFACT_PREFIX, artifact_filename};
pub use sink::{ArtifactSink, DirectorySink, StdoutSink};

use crate::form::RoomId;

/// CSV-typed binary payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvBlob {
    bytes: Bytes,
}

impl CsvBlob {
    /// Media type of every blob.
    pub const MIME_TYPE: &'static str = "text/csv";

    #[must_use]
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        Self::MIME_TYPE
    }
}

/// Where a saved artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactLocation {
    File(PathBuf),
    Stdout,
}

/// Record of a completed save, for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifact {
    pub location: ArtifactLocation,
    /// Name the artifact was offered under.
    pub filename: String,
    pub bytes: u64,
}

impl SavedArtifact {
    #[must_use]
    pub fn file(path: PathBuf, bytes: u64) -> Self {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            location: ArtifactLocation::File(path),
            filename,
            bytes,
        }
    }

    #[must_use]
    pub fn stdout(filename: impl Into<String>, bytes: u64) -> Self {
        Self {
            location: ArtifactLocation::Stdout,
            filename: filename.into(),
            bytes,
        }
    }

    /// The file path, when the artifact was written to disk.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            ArtifactLocation::File(path) => Some(path),
            ArtifactLocation::Stdout => None,
        }
    }
}

impl fmt::Display for SavedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            ArtifactLocation::File(path) => write!(f, "{} ({} bytes)", path.display(), self.bytes),
            ArtifactLocation::Stdout => write!(f, "{} to stdout ({} bytes)", self.filename, self.bytes),
        }
    }
}

/// Names artifacts and hands them to a sink.
#[derive(Clone)]
pub struct Materializer {
    sink: Arc<dyn ArtifactSink>,
}

impl fmt::Debug for Materializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Materializer").finish_non_exhaustive()
    }
}

impl Materializer {
    #[must_use]
    pub fn new(sink: Arc<dyn ArtifactSink>) -> Self {
        Self { sink }
    }

    /// Saves `payload` as `chatwork_logs_{room}_{timestamp}.csv`.
    ///
    /// The blob lives only for the duration of the save and is released
    /// whether or not the sink succeeds.
    ///
    /// # Errors
    ///
    /// Returns the sink's [`MaterializeError`].
    #[instrument(skip(self, payload, room_id, now), fields(room_id = %room_id, bytes = payload.len()))]
    pub async fn materialize(
        &self,
        payload: Bytes,
        room_id: &RoomId,
        now: DateTime<Utc>,
    ) -> Result<SavedArtifact, MaterializeError> {
        let blob = CsvBlob::new(payload);
        let filename = artifact_filename(room_id, now);

        let result = self.sink.save(&blob, &filename).await;
        drop(blob);

        let saved = result?;
        info!(artifact = %saved, mime = CsvBlob::MIME_TYPE, "artifact saved");
        Ok(saved)
    }
}
