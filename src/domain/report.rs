use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Language;

/// The kind of problem an issue points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Source does not parse
    SyntaxError,
    /// `except:` without an exception type
    BareExcept,
    /// Leftover debug output (`print(...)`)
    DebugCode,
    /// TODO / FIXME marker
    Todo,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::SyntaxError => "syntax_error",
            IssueKind::BareExcept => "bare_except",
            IssueKind::DebugCode => "debug_code",
            IssueKind::Todo => "todo",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single finding, anchored to a 1-indexed line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub line: usize,
    pub message: String,
}

impl Issue {
    pub fn new(kind: IssueKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }
}

/// Parse failure location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxErrorInfo {
    /// Line number (1-indexed)
    pub line: usize,
    pub message: String,
}

/// Structural summary of a Python module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PythonStructure {
    /// Top-level `def` / `async def` names in source order
    pub functions: Vec<String>,
    /// Top-level `class` names in source order
    pub classes: Vec<String>,
    /// Imported module names, sorted and de-duplicated
    pub imports: Vec<String>,
    /// Rough cyclomatic complexity (1 + decision nodes)
    pub complexity: usize,
}

/// Output of the source scanner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub language: Language,

    pub total_lines: usize,
    pub non_blank_lines: usize,
    pub blank_lines: usize,
    pub comment_lines: usize,

    /// Present only for Python sources that parse
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<PythonStructure>,

    #[serde(default)]
    pub issues: Vec<Issue>,

    #[serde(default)]
    pub suggestions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax_error: Option<SyntaxErrorInfo>,

    pub analyzed_at: DateTime<Utc>,
}

impl Report {
    /// Number of issues of the given kind
    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    /// Check whether two reports describe the same findings (ignores the timestamp)
    pub fn same_findings(&self, other: &Report) -> bool {
        self.language == other.language
            && self.total_lines == other.total_lines
            && self.non_blank_lines == other.non_blank_lines
            && self.blank_lines == other.blank_lines
            && self.comment_lines == other.comment_lines
            && self.structure == other.structure
            && self.issues == other.issues
            && self.suggestions == other.suggestions
            && self.syntax_error == other.syntax_error
    }
}
