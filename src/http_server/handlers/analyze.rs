//! POST /analyze - run the scanner on a stored file or raw code

use serde_json::Value;
use tracing::{debug, info, warn};

use super::super::error::ApiError;
use super::super::types::{AnalyzeRequest, ApiState};
use super::{parse_json, resolve_source, success};
use crate::storage::StorageError;

pub fn handle_analyze(state: &ApiState, body: &[u8]) -> Result<Value, ApiError> {
    let req: AnalyzeRequest = parse_json(body)?;
    let source = resolve_source(
        state,
        req.file_id.as_deref(),
        req.code.as_deref(),
        req.language.as_deref(),
    )?;

    let report = state.scanner.scan(&source.code, source.language);

    info!(
        "[marvin:http] Analyzed {} lines of {} ({} issues)",
        report.total_lines,
        report.language,
        report.issues.len()
    );

    let mut value = success("analyze", &report)?;

    if let Some(stored) = source.stored {
        match state.store.load_report(&stored.file_id) {
            Ok(previous) if previous.same_findings(&report) => debug!(
                "[marvin:storage] Findings for {} unchanged since {}",
                stored.file_id, previous.analyzed_at
            ),
            Ok(_) => info!(
                "[marvin:storage] Findings for {} changed since last analysis",
                stored.file_id
            ),
            Err(StorageError::NotFound(_)) => {}
            Err(e) => warn!(
                "[marvin:storage] Ignoring previous report for {}: {}",
                stored.file_id, e
            ),
        }

        let report_path = super::write_sidecar("report", &stored.file_id, || {
            state.store.save_report(&stored.file_id, &report)
        });

        if let Value::Object(map) = &mut value {
            map.insert("file_id".to_string(), Value::from(stored.file_id));
            map.insert("filename".to_string(), Value::from(stored.filename));
            if let Some(path) = report_path {
                map.insert(
                    "report_path".to_string(),
                    Value::from(path.display().to_string()),
                );
            }
        }
    }

    Ok(value)
}
