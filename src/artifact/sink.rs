//! Destinations for saved artifacts.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use super::error::MaterializeError;
use super::filename::{numbered_filename, sanitize_filename};
use super::{CsvBlob, SavedArtifact};

/// How many numbered names are tried before giving up on a crowded directory.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Persists bytes as an operator-visible artifact under a suggested name.
#[async_trait::async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Saves `blob`. The sink may adjust `suggested_name` to fit its medium.
    ///
    /// # Errors
    ///
    /// Returns [`MaterializeError`] when the bytes cannot be written.
    async fn save(&self, blob: &CsvBlob, suggested_name: &str)
    -> Result<SavedArtifact, MaterializeError>;
}

/// Writes artifacts into a directory, never overwriting an existing file.
///
/// Bytes are staged in a hidden temporary file inside the target directory
/// and moved into place only once fully written. The staging file is removed
/// on every failure path.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait::async_trait]
impl ArtifactSink for DirectorySink {
    #[instrument(skip(self, blob), fields(dir = %self.dir.display(), bytes = blob.len()))]
    async fn save(
        &self,
        blob: &CsvBlob,
        suggested_name: &str,
    ) -> Result<SavedArtifact, MaterializeError> {
        let dir = self.dir.clone();
        let filename = sanitize_filename(suggested_name);
        let bytes = blob.bytes().clone();

        let path = tokio::task::spawn_blocking(move || persist_into(&dir, &filename, &bytes))
            .await
            .map_err(|e| MaterializeError::io(self.dir.clone(), io::Error::other(e)))??;

        debug!(path = %path.display(), "artifact persisted");
        Ok(SavedArtifact::file(path, blob.len()))
    }
}

fn persist_into(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, MaterializeError> {
    std::fs::create_dir_all(dir).map_err(|e| MaterializeError::io(dir, e))?;

    let mut staged = tempfile::Builder::new()
        .prefix(".chatlog-")
        .suffix(".partial")
        .tempfile_in(dir)
        .map_err(|e| MaterializeError::io(dir, e))?;
    let staged_path = staged.path().to_path_buf();
    staged
        .write_all(bytes)
        .map_err(|e| MaterializeError::io(&staged_path, e))?;
    staged
        .flush()
        .map_err(|e| MaterializeError::io(&staged_path, e))?;

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let target = dir.join(numbered_filename(filename, attempt));
        match staged.persist_noclobber(&target) {
            Ok(_) => return Ok(target),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => staged = err.file,
            Err(err) => return Err(MaterializeError::io(target, err.error)),
        }
    }

    Err(MaterializeError::NamesExhausted {
        dir: dir.to_path_buf(),
        filename: filename.to_string(),
    })
}

/// Streams artifacts to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

#[async_trait::async_trait]
impl ArtifactSink for StdoutSink {
    async fn save(
        &self,
        blob: &CsvBlob,
        suggested_name: &str,
    ) -> Result<SavedArtifact, MaterializeError> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(blob.bytes())
            .await
            .map_err(MaterializeError::stdout)?;
        stdout.flush().await.map_err(MaterializeError::stdout)?;
        Ok(SavedArtifact::stdout(suggested_name, blob.len()))
    }
}
