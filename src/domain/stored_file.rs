use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::Language;

/// Identifier of a stored file (UUID v4, simple form)
pub type FileId = String;

/// Metadata for a file written by the storage layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub file_id: FileId,
    /// Sanitized filename as stored on disk (without the identifier prefix)
    pub filename: String,
    pub language: Language,
    /// Size in bytes
    pub size: u64,
    /// Lowercase hex SHA-256 of the content
    pub sha256: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Check that a string has the shape of a file identifier.
///
/// Identifiers end up inside glob patterns and paths, so only 32 lowercase
/// hex characters are accepted.
pub fn is_valid_file_id(id: &str) -> bool {
    id.len() == 32 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
