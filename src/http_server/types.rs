//! Type definitions for the HTTP server.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::Config;
use crate::scanner::Scanner;
use crate::storage::FileStore;

/// State shared by all handlers. Read-only while serving.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub store: FileStore,
    pub scanner: Scanner,
    pub max_body_bytes: usize,
    pub cors_allow_origin: String,
}

impl ApiState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = FileStore::open(&config.storage.dir).with_context(|| {
            format!(
                "Failed to open storage directory: {}",
                config.storage.dir.display()
            )
        })?;

        Ok(Self {
            store,
            scanner: Scanner::new(&config.analysis),
            max_body_bytes: config.server.max_body_bytes,
            cors_allow_origin: config.server.cors_allow_origin.clone(),
        })
    }
}

/// POST /create
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub content: String,
    /// Overrides the language detected from the extension
    #[serde(default)]
    pub language: Option<String>,
}

/// POST /analyze
///
/// Either `file_id` (a previously stored file) or `code` must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    /// Defaults to python for raw code, to the stored file's language otherwise
    #[serde(default)]
    pub language: Option<String>,
}

/// POST /optimize
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeRequest {
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// remove_debug, strip_whitespace, collapse_blank_lines or all (default)
    #[serde(default, alias = "type")]
    pub optimization_type: Option<String>,
}
