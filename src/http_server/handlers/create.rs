//! POST /create - store a file from JSON content

use serde_json::Value;
use tracing::info;

use super::super::error::ApiError;
use super::super::types::{ApiState, CreateRequest};
use super::{parse_json, parse_language, success};

pub fn handle_create(state: &ApiState, body: &[u8]) -> Result<Value, ApiError> {
    let req: CreateRequest = parse_json(body)?;

    let filename = req.filename.trim();
    if filename.is_empty() {
        return Err(ApiError::validation("filename is required"));
    }
    let language = parse_language(req.language.as_deref())?;

    let stored = state
        .store
        .save(filename, req.content.as_bytes(), language)?;

    info!(
        "[marvin:http] Created {} ({}, {} bytes)",
        stored.file_id, stored.language, stored.size
    );

    success("create", stored)
}
