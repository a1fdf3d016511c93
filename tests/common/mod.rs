//! Shared test utilities for API integration tests

#![allow(dead_code)]

use std::path::PathBuf;

use serde_json::Value;
use tempfile::TempDir;

use marvin::config::Config;
use marvin::http_server::HttpServer;

pub const BOUNDARY: &str = "----marvin-test-boundary";

/// A server on an ephemeral port with its own storage directory
pub struct TestServer {
    _dir: TempDir,
    pub base_url: String,
    pub storage_dir: PathBuf,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn post_json(&self, path: &str, body: Value) -> (u16, Value) {
        into_status_and_json(ureq::post(&self.url(path)).send_json(body))
    }

    pub fn get(&self, path: &str) -> (u16, Value) {
        into_status_and_json(ureq::get(&self.url(path)).call())
    }

    /// POST a multipart form with a single `file` field
    pub fn upload(&self, filename: &str, content: impl AsRef<[u8]>) -> (u16, Value) {
        self.post_multipart(&[("file", Some(filename), content.as_ref())])
    }

    pub fn post_multipart(&self, parts: &[(&str, Option<&str>, &[u8])]) -> (u16, Value) {
        let body = multipart_body(parts);
        into_status_and_json(
            ureq::post(&self.url("/upload"))
                .set(
                    "Content-Type",
                    &format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .send_bytes(&body),
        )
    }
}

/// Start a server with a small body limit (16 KiB)
pub fn start_server() -> TestServer {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let storage_dir = dir.path().join("uploads");

    let mut config = Config::default();
    config.server.port = 0;
    config.server.max_body_bytes = 16 * 1024;
    config.storage.dir = storage_dir.clone();

    let server = HttpServer::bind(&config).expect("Failed to bind test server");
    let addr = server.local_addr().expect("Server should listen on an IP address");
    server.spawn();

    TestServer {
        _dir: dir,
        base_url: format!("http://{}", addr),
        storage_dir,
    }
}

pub fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let disposition = match filename {
            Some(f) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                name, f
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn into_status_and_json(result: Result<ureq::Response, ureq::Error>) -> (u16, Value) {
    match result {
        Ok(resp) => {
            let status = resp.status();
            (status, resp.into_json().unwrap_or(Value::Null))
        }
        Err(ureq::Error::Status(status, resp)) => (status, resp.into_json().unwrap_or(Value::Null)),
        Err(e) => panic!("Request failed: {}", e),
    }
}
