//! Configuration loading and management

mod io;
mod settings;

pub use settings::{AnalysisSettings, ServerSettings, StorageSettings};

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Where stored files live
    #[serde(default)]
    pub storage: StorageSettings,

    /// Analyzer thresholds
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

/// Default configuration content for `marvin init`
pub const DEFAULT_CONFIG: &str = r#"# MARVIN Configuration
# ====================
#
# All keys are optional; missing keys fall back to the values shown here.

# HTTP API
[server]
host = "127.0.0.1"
port = 8000
# Requests with a larger body are answered with 413
max_body_bytes = 2097152
# Sent as Access-Control-Allow-Origin on every response
cors_allow_origin = "*"

# Stored files, reports (<id>.report.json) and optimized copies
[storage]
dir = "uploads"

# Analyzer thresholds
[analysis]
# Files longer than this get a "consider splitting" suggestion
max_file_lines = 500
"#;
