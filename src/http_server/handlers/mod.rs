//! HTTP request handlers.
//!
//! Handlers take already-read request data and return the JSON payload, so
//! they can be driven without a socket.

mod analyze;
mod create;
mod misc;
mod optimize;
mod upload;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;
use tracing::warn;

use super::error::ApiError;
use super::types::ApiState;
use crate::Language;
use crate::storage::{LoadedFile, StorageError};

pub use analyze::handle_analyze;
pub use create::handle_create;
pub use misc::{handle_health, handle_root};
pub use optimize::handle_optimize;
pub use upload::handle_upload;

/// Parse a JSON request body
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ApiError::validation("request body is required"));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::Validation(format!("invalid JSON: {}", e)))
}

/// Wrap a payload the way every successful action answers:
/// `{"status": "success", "action": <action>, ...payload}`
pub(crate) fn success(action: &str, payload: impl Serialize) -> Result<Value, ApiError> {
    let mut value = serde_json::to_value(payload).map_err(|e| ApiError::Internal(e.into()))?;
    if let Value::Object(map) = &mut value {
        map.insert("status".to_string(), Value::from("success"));
        map.insert("action".to_string(), Value::from(action));
    }
    Ok(value)
}

/// Parse an optional language label from a request
pub(crate) fn parse_language(raw: Option<&str>) -> Result<Option<Language>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(label) => Language::from_str(label)
            .map(Some)
            .ok_or_else(|| ApiError::Validation(format!("unsupported language '{}'", label))),
    }
}

/// Source text an analyze/optimize request points at
pub(crate) struct SourceInput {
    pub code: String,
    pub language: Language,
    /// Set when the request referenced a stored file
    pub stored: Option<LoadedFile>,
}

/// Resolve `file_id` or raw `code` into source text.
///
/// `file_id` wins when both are present.
pub(crate) fn resolve_source(
    state: &ApiState,
    file_id: Option<&str>,
    code: Option<&str>,
    language: Option<&str>,
) -> Result<SourceInput, ApiError> {
    let language = parse_language(language)?;

    if let Some(file_id) = file_id.map(str::trim).filter(|s| !s.is_empty()) {
        let stored = state.store.read(file_id)?;
        let code = std::str::from_utf8(&stored.content)
            .map_err(|_| ApiError::Validation(format!("file '{}' is not UTF-8 text", file_id)))?
            .to_string();
        return Ok(SourceInput {
            code,
            language: language.unwrap_or(stored.language),
            stored: Some(stored),
        });
    }

    match code {
        Some(code) if !code.trim().is_empty() => Ok(SourceInput {
            code: code.to_string(),
            language: language.unwrap_or_default(),
            stored: None,
        }),
        _ => Err(ApiError::validation("either file_id or code is required")),
    }
}

/// Write a sidecar next to a stored file.
///
/// The response is still valid without the sidecar, so a failed write is
/// logged and the path left out.
pub(crate) fn write_sidecar(
    what: &str,
    file_id: &str,
    write: impl FnOnce() -> Result<PathBuf, StorageError>,
) -> Option<PathBuf> {
    match write() {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(
                "[marvin:storage] Failed to write {} for {}: {}",
                what, file_id, e
            );
            None
        }
    }
}
