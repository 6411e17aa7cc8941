//! Artifact naming and filesystem-safe filename handling.

use std::path::{Component, Path};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::form::RoomId;

/// Fixed prefix of every generated artifact name.
pub const ARTIFACT_PREFIX: &str = "chatwork_logs_";

/// Extension of every generated artifact name.
pub const ARTIFACT_EXTENSION: &str = ".csv";

/// Used when sanitizing leaves nothing usable.
const FALLBACK_FILENAME: &str = "chatwork_logs.csv";

/// Builds `chatwork_logs_{room}_{timestamp}.csv`.
///
/// The timestamp is ISO-8601 UTC with milliseconds and a `Z` suffix, with
/// every `:` removed: `2024-01-01T00:00:00.000Z` becomes
/// `2024-01-01T000000.000Z`. The room id is used verbatim; sinks that write
/// to a filesystem sanitize the whole name.
#[must_use]
pub fn artifact_filename(room_id: &RoomId, now: DateTime<Utc>) -> String {
    let timestamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(':', "");
    format!("{ARTIFACT_PREFIX}{room_id}_{timestamp}{ARTIFACT_EXTENSION}")
}

/// Replaces characters that are unsafe in a single path segment.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim_matches(|c| c == '_' || c == '.').is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized.replace('.', "_")
    }
}

/// Name for the `attempt`-th save under `filename`.
///
/// Attempt 0 is the name itself; attempt `n` inserts `_{n + 1}` before the
/// extension, so duplicates read `name_2.csv`, `name_3.csv`, ...
pub(crate) fn numbered_filename(filename: &str, attempt: usize) -> String {
    if attempt == 0 {
        return filename.to_string();
    }
    let (stem, ext) = match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
        _ => (filename, ""),
    };
    format!("{stem}_{}{ext}", attempt + 1)
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
