//! The per-attempt request aggregate and its outcome.

use bytes::Bytes;

use super::DownloadError;
use crate::form::{Credential, FormSnapshot, MessageCount, RoomId};

/// Everything the backend needs for one export. Built fresh per dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub credential: Credential,
    pub room_id: RoomId,
    pub message_count: MessageCount,
}

impl From<FormSnapshot> for DownloadRequest {
    fn from(snapshot: FormSnapshot) -> Self {
        Self {
            credential: snapshot.credential,
            room_id: snapshot.room_id,
            message_count: snapshot.message_count,
        }
    }
}

/// Result of one dispatch: the CSV payload, or why there is none.
#[derive(Debug)]
pub enum DownloadOutcome {
    Success(Bytes),
    Failure(DownloadError),
}

impl From<Result<Bytes, DownloadError>> for DownloadOutcome {
    fn from(result: Result<Bytes, DownloadError>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(error) => Self::Failure(error),
        }
    }
}
