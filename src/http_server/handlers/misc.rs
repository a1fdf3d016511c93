//! Miscellaneous handlers: root, health.

use serde_json::{json, Value};

pub fn handle_root() -> Value {
    json!({ "message": "MARVIN backend is running" })
}

pub fn handle_health() -> Value {
    json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    })
}
