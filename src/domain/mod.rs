//! Core domain types for MARVIN

mod language;
mod optimization;
mod report;
mod stored_file;

pub use language::Language;
pub use optimization::{Change, OptimizationResult, OptimizationType};
pub use report::{Issue, IssueKind, PythonStructure, Report, SyntaxErrorInfo};
pub use stored_file::{is_valid_file_id, FileId, StoredFile};
