//! Serve command implementation

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use marvin::config::Config;
use marvin::http_server::HttpServer;

/// Command-line values that take precedence over the config file
#[derive(Debug, Default)]
pub struct ServeOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub storage_dir: Option<PathBuf>,
}

pub async fn serve_command(config_path: Option<&Path>, overrides: ServeOverrides) -> Result<()> {
    let mut config = Config::load(config_path)?;

    if let Some(host) = overrides.host {
        config.server.host = host;
    }
    if let Some(port) = overrides.port {
        config.server.port = port;
    }
    if let Some(dir) = overrides.storage_dir {
        config.storage.dir = dir;
    }

    let server = HttpServer::bind(&config)?;

    // tiny_http blocks; keep it off the async workers
    tokio::task::spawn_blocking(move || server.run())
        .await
        .context("Server thread panicked")?;

    Ok(())
}
