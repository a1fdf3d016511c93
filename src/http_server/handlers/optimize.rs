//! POST /optimize - rewrite a stored file or raw code

use serde_json::Value;
use tracing::info;

use super::super::error::ApiError;
use super::super::types::{ApiState, OptimizeRequest};
use super::{parse_json, resolve_source, success};
use crate::{optimizer, OptimizationType};

pub fn handle_optimize(state: &ApiState, body: &[u8]) -> Result<Value, ApiError> {
    let req: OptimizeRequest = parse_json(body)?;

    let kind = match req
        .optimization_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        None => OptimizationType::default(),
        Some(raw) => OptimizationType::from_str(raw).ok_or_else(|| {
            ApiError::Validation(format!(
                "unknown optimization_type '{}'; expected remove_debug, strip_whitespace, collapse_blank_lines or all",
                raw
            ))
        })?,
    };

    let source = resolve_source(
        state,
        req.file_id.as_deref(),
        req.code.as_deref(),
        req.language.as_deref(),
    )?;

    let result = optimizer::optimize(&source.code, source.language, kind);

    info!(
        "[marvin:http] Optimized {} ({}): {} changes, {} -> {} bytes",
        source.language,
        kind,
        result.changes.len(),
        result.original_size,
        result.optimized_size
    );

    let mut value = success("optimize", &result)?;
    if let Value::Object(map) = &mut value {
        map.insert("language".to_string(), Value::from(source.language.as_str()));
        map.insert("optimization_type".to_string(), Value::from(kind.as_str()));
    }

    if let Some(stored) = source.stored {
        let optimized_path = super::write_sidecar("optimized copy", &stored.file_id, || {
            state
                .store
                .save_optimized(&stored.file_id, &stored.filename, &result.optimized_code)
        });
        if let Value::Object(map) = &mut value {
            map.insert("file_id".to_string(), Value::from(stored.file_id));
            if let Some(path) = optimized_path {
                map.insert(
                    "optimized_path".to_string(),
                    Value::from(path.display().to_string()),
                );
            }
        }
    }

    Ok(value)
}
