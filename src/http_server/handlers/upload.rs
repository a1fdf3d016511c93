//! POST /upload - store a file from a multipart form

use serde_json::Value;
use tracing::info;

use super::super::error::ApiError;
use super::super::multipart;
use super::super::types::ApiState;
use super::success;

pub fn handle_upload(
    state: &ApiState,
    content_type: Option<&str>,
    body: Vec<u8>,
) -> Result<Value, ApiError> {
    let upload = multipart::read_file_field(content_type, body)?;

    if upload.filename.trim().is_empty() {
        return Err(ApiError::validation("file is required"));
    }

    if std::str::from_utf8(&upload.content).is_err() {
        return Err(ApiError::validation("file must be UTF-8 text"));
    }

    let stored = state.store.save(&upload.filename, &upload.content, None)?;

    info!(
        "[marvin:http] Uploaded {} as {} ({}, {} bytes)",
        upload.filename, stored.file_id, stored.language, stored.size
    );

    success("upload", stored)
}
