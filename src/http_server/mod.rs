//! HTTP server for the MARVIN API
//!
//! Accepts:
//! - POST /create   - store a file from JSON content
//! - POST /upload   - store a file from a multipart form
//! - POST /analyze  - analyze a stored file or raw code
//! - POST /optimize - optimize a stored file or raw code
//! - GET  /health   - liveness
//! - GET  /         - banner
//!
//! Requests are handled one at a time on the server thread.

mod error;
pub mod handlers;
mod multipart;
mod types;

pub use error::ApiError;
pub use types::{AnalyzeRequest, ApiState, CreateRequest, OptimizeRequest};

use std::io::Read;
use std::net::SocketAddr;
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, Result};
use serde_json::Value;
use tiny_http::{Header, Response, Server};
use tracing::{debug, error, info, warn};

use crate::config::Config;

/// A bound, not yet running, API server
pub struct HttpServer {
    server: Server,
    state: ApiState,
}

impl HttpServer {
    /// Bind the listener described by `config`
    pub fn bind(config: &Config) -> Result<Self> {
        let state = ApiState::from_config(config)?;
        Self::bind_with_state(&config.server.bind_addr(), state)
    }

    /// Bind `addr` with prepared state (port 0 picks a free port)
    pub fn bind_with_state(addr: &str, state: ApiState) -> Result<Self> {
        let server = Server::http(addr)
            .map_err(|e| anyhow!("Failed to start server on {}: {}", addr, e))?;
        Ok(Self { server, state })
    }

    /// Address actually bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve requests until the process exits
    pub fn run(self) {
        match self.local_addr() {
            Some(addr) => info!(
                "[marvin:http] Server listening on http://{} (storage: {})",
                addr,
                self.state.store.root().display()
            ),
            None => info!("[marvin:http] Server listening"),
        }

        for request in self.server.incoming_requests() {
            handle_request(&self.state, request);
        }
    }

    /// Start serving on a background thread
    /// Returns immediately, server runs until program exits
    pub fn spawn(self) -> thread::JoinHandle<()> {
        thread::spawn(move || self.run())
    }
}

/// Route a request by method and path.
///
/// Returns the status code and JSON body to send.
pub fn dispatch(
    state: &ApiState,
    method: &str,
    path: &str,
    content_type: Option<&str>,
    body: Vec<u8>,
) -> (u16, Value) {
    let result = match (method, path) {
        ("GET", "/") => Ok(handlers::handle_root()),
        ("GET", "/health") => Ok(handlers::handle_health()),
        ("POST", "/create") => handlers::handle_create(state, &body),
        ("POST", "/upload") => handlers::handle_upload(state, content_type, body),
        ("POST", "/analyze") => handlers::handle_analyze(state, &body),
        ("POST", "/optimize") => handlers::handle_optimize(state, &body),
        _ => Err(ApiError::NotFound(format!("no route for {} {}", method, path))),
    };

    match result {
        Ok(value) => (200, value),
        Err(err) => {
            match &err {
                ApiError::Internal(cause) => {
                    error!("[marvin:http] {} {} failed: {:#}", method, path, cause)
                }
                other => debug!("[marvin:http] {} {} rejected: {}", method, path, other),
            }
            (err.status_code(), err.to_json())
        }
    }
}

fn handle_request(state: &ApiState, mut request: tiny_http::Request) {
    let started = Instant::now();
    let method = request.method().to_string().to_uppercase();
    let url = request.url().to_string();
    let path = normalize_path(&url);

    if method == "OPTIONS" {
        let mut response = Response::empty(204);
        for header in cors_headers(&state.cors_allow_origin) {
            response.add_header(header);
        }
        let _ = request.respond(response);
        return;
    }

    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_string());

    let (status, body) = match read_request_body(&mut request, state.max_body_bytes) {
        Ok(body) => dispatch(state, &method, &path, content_type.as_deref(), body),
        Err(err) => (err.status_code(), err.to_json()),
    };

    info!(
        "[marvin:http] {} {} -> {} ({} ms)",
        method,
        path,
        status,
        started.elapsed().as_millis()
    );

    respond_json(request, status, &body, &state.cors_allow_origin);
}

/// Strip the query string and trailing slashes (`/analyze/?x=1` -> `/analyze`)
fn normalize_path(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn read_request_body(request: &mut tiny_http::Request, limit: usize) -> Result<Vec<u8>, ApiError> {
    if request.body_length().is_some_and(|len| len > limit) {
        return Err(ApiError::PayloadTooLarge(limit));
    }

    let mut body = Vec::new();
    let mut reader = request.as_reader().take((limit + 1) as u64);
    if let Err(e) = reader.read_to_end(&mut body) {
        warn!("[marvin:http] Failed to read body: {}", e);
        return Err(ApiError::validation("could not read request body"));
    }

    if body.len() > limit {
        return Err(ApiError::PayloadTooLarge(limit));
    }

    Ok(body)
}

fn json_content_type() -> Option<Header> {
    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).ok()
}

fn cors_headers(allow_origin: &str) -> Vec<Header> {
    [
        ("Access-Control-Allow-Origin", allow_origin),
        ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
        ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
    ]
    .into_iter()
    .filter_map(|(name, value)| Header::from_bytes(name.as_bytes(), value.as_bytes()).ok())
    .collect()
}

fn respond_json(request: tiny_http::Request, status_code: u16, value: &Value, allow_origin: &str) {
    let body =
        serde_json::to_string(value).unwrap_or_else(|_| "{\"error\":\"serialize\"}".to_string());
    let mut response = Response::from_string(body).with_status_code(status_code);
    for header in json_content_type().into_iter().chain(cors_headers(allow_origin)) {
        response.add_header(header);
    }
    let _ = request.respond(response);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state() -> (TempDir, ApiState) {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.dir = dir.path().join("uploads");
        let state = ApiState::from_config(&config).unwrap();
        (dir, state)
    }

    fn post(state: &ApiState, path: &str, body: Value) -> (u16, Value) {
        dispatch(
            state,
            "POST",
            path,
            Some("application/json"),
            serde_json::to_vec(&body).unwrap(),
        )
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/analyze/?x=1"), "/analyze");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/?q"), "/");
        assert_eq!(normalize_path("/health"), "/health");
    }

    #[test]
    fn test_root_and_health() {
        let (_dir, state) = state();
        let (status, body) = dispatch(&state, "GET", "/", None, Vec::new());
        assert_eq!(status, 200);
        assert_eq!(body["message"], "MARVIN backend is running");

        let (status, body) = dispatch(&state, "GET", "/health", None, Vec::new());
        assert_eq!(status, 200);
        assert_eq!(body["status"], "healthy");
    }

    #[test]
    fn test_unknown_route() {
        let (_dir, state) = state();
        let (status, body) = dispatch(&state, "GET", "/nope", None, Vec::new());
        assert_eq!(status, 404);
        assert_eq!(body["error"], "not_found");

        let (status, _) = dispatch(&state, "GET", "/analyze", None, Vec::new());
        assert_eq!(status, 404);
    }

    #[test]
    fn test_analyze_raw_code() {
        let (_dir, state) = state();
        let (status, body) = post(
            &state,
            "/analyze",
            serde_json::json!({ "code": "def f():\n    print('x')\n", "language": "python" }),
        );
        assert_eq!(status, 200);
        assert_eq!(body["status"], "success");
        assert_eq!(body["action"], "analyze");
        assert_eq!(body["structure"]["functions"], serde_json::json!(["f"]));
        assert_eq!(body["issues"][0]["kind"], "debug_code");
        assert_eq!(body["issues"][0]["line"], 2);
    }

    #[test]
    fn test_missing_fields_are_validation_errors() {
        let (_dir, state) = state();
        let cases = [
            ("/create", serde_json::json!({})),
            ("/create", serde_json::json!({ "filename": "  ", "content": "x" })),
            ("/analyze", serde_json::json!({})),
            ("/analyze", serde_json::json!({ "code": "" })),
            ("/optimize", serde_json::json!({ "code": "   " })),
            ("/analyze", serde_json::json!({ "code": "x", "language": "klingon" })),
            ("/optimize", serde_json::json!({ "code": "x", "type": "shrink" })),
            ("/analyze", serde_json::json!({ "file_id": "../etc" })),
        ];
        for (path, body) in cases {
            let (status, response) = post(&state, path, body.clone());
            assert_eq!(status, 400, "{} {} -> {}", path, body, response);
            assert_eq!(response["error"], "validation_error");
        }

        for path in ["/create", "/analyze", "/optimize"] {
            let (status, _) = dispatch(&state, "POST", path, None, Vec::new());
            assert_eq!(status, 400);
            let (status, _) = dispatch(&state, "POST", path, None, b"{not json".to_vec());
            assert_eq!(status, 400);
        }
    }

    #[test]
    fn test_unknown_file_id_is_not_found() {
        let (_dir, state) = state();
        let (status, body) = post(
            &state,
            "/analyze",
            serde_json::json!({ "file_id": "0123456789abcdef0123456789abcdef" }),
        );
        assert_eq!(status, 404);
        assert_eq!(body["error"], "not_found");
    }

    #[test]
    fn test_create_then_optimize_by_id() {
        let (_dir, state) = state();
        let (status, created) = post(
            &state,
            "/create",
            serde_json::json!({ "filename": "demo.py", "content": "x = 1   \nprint(x)\n" }),
        );
        assert_eq!(status, 200);
        assert_eq!(created["language"], "python");
        assert_eq!(created["size"], 18);
        let file_id = created["file_id"].as_str().unwrap();

        let (status, body) = post(
            &state,
            "/optimize",
            serde_json::json!({ "file_id": file_id, "type": "all" }),
        );
        assert_eq!(status, 200);
        assert_eq!(body["optimized_code"], "x = 1\n");
        assert_eq!(body["optimization_type"], "all");
        let optimized_path = body["optimized_path"].as_str().unwrap();
        assert_eq!(std::fs::read_to_string(optimized_path).unwrap(), "x = 1\n");
    }

    #[test]
    fn test_create_rejects_unknown_extension() {
        let (_dir, state) = state();
        let (status, body) = post(
            &state,
            "/create",
            serde_json::json!({ "filename": "tool.exe", "content": "MZ" }),
        );
        assert_eq!(status, 400);
        assert!(body["detail"].as_str().unwrap().contains("unsupported file type"));
    }

    #[test]
    fn test_sidecar_write_failures_are_not_fatal() {
        let (_dir, state) = state();
        let stored = state.store.save("demo.py", b"print(1)\nx = 1\n", None).unwrap();
        let id = &stored.file_id;

        // A non-empty directory where each sidecar should go makes the rename fail
        for name in [format!("{}.report.json", id), format!("{}.optimized_demo.py", id)] {
            let blocker = state.store.root().join(name);
            std::fs::create_dir(&blocker).unwrap();
            std::fs::write(blocker.join("keep"), b"").unwrap();
        }

        let (status, body) = post(&state, "/analyze", serde_json::json!({ "file_id": id }));
        assert_eq!(status, 200, "{}", body);
        assert_eq!(body["total_lines"], 2);
        assert!(body.get("report_path").is_none());

        let (status, body) = post(&state, "/optimize", serde_json::json!({ "file_id": id }));
        assert_eq!(status, 200, "{}", body);
        assert_eq!(body["optimized_code"], "x = 1\n");
        assert_eq!(body["file_id"], id.as_str());
        assert!(body.get("optimized_path").is_none());
    }

    #[test]
    fn test_stored_non_utf8_is_rejected() {
        let (_dir, state) = state();
        let stored = state.store.save("legacy.py", b"s = '\xff'\n", None).unwrap();

        for path in ["/analyze", "/optimize"] {
            let (status, body) = post(
                &state,
                path,
                serde_json::json!({ "file_id": stored.file_id }),
            );
            assert_eq!(status, 400, "{} -> {}", path, body);
            assert!(body["detail"].as_str().unwrap().contains("not UTF-8"));
        }

        let optimized = state
            .store
            .root()
            .join(format!("{}.optimized_legacy.py", stored.file_id));
        assert!(!optimized.exists());
    }

    #[test]
    fn test_reanalysis_overwrites_report() {
        let (_dir, state) = state();
        let stored = state.store.save("demo.py", b"x = 1\n", None).unwrap();

        for _ in 0..2 {
            let (status, _) = post(
                &state,
                "/analyze",
                serde_json::json!({ "file_id": stored.file_id }),
            );
            assert_eq!(status, 200);
        }

        let saved = state.store.load_report(&stored.file_id).unwrap();
        assert_eq!(saved.total_lines, 1);
    }
}
