//! Settings configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on (0 picks a free port)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body, in bytes
    /// Larger requests are answered with 413.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Value of the `Access-Control-Allow-Origin` header
    #[serde(default = "default_cors_allow_origin")]
    pub cors_allow_origin: String,
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory for stored files and their reports
    /// Relative paths are resolved against the working directory.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

/// Analyzer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Files longer than this get a "split this file" suggestion
    #[serde(default = "default_max_file_lines")]
    pub max_file_lines: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024 // 2 MiB
}

fn default_cors_allow_origin() -> String {
    "*".to_string()
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_file_lines() -> usize {
    500
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            cors_allow_origin: default_cors_allow_origin(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_file_lines: default_max_file_lines(),
        }
    }
}

impl ServerSettings {
    /// `host:port` string for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
