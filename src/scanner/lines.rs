//! Line-based heuristics

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Issue, IssueKind, Language};

/// `print(` as a free call; `obj.print(` and `reprint(` don't count
static PRINT_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|[^.\w])print\s*\(").unwrap());

static TODO_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(TODO|FIXME)\b").unwrap());

static GLOBAL_STMT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*global\s+\w").unwrap());

static WILDCARD_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*from\s+\S+\s+import\s+\*").unwrap());

/// Line counts for any language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    pub total: usize,
    pub non_blank: usize,
    pub blank: usize,
    pub comment: usize,
}

impl LineStats {
    pub fn count(source: &str, language: Language) -> Self {
        let comment_prefix = language.line_comment();
        let mut stats = Self::default();

        for line in source.lines() {
            stats.total += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                stats.blank += 1;
                continue;
            }
            stats.non_blank += 1;
            if comment_prefix.is_some_and(|p| trimmed.starts_with(p)) {
                stats.comment += 1;
            }
        }

        stats
    }
}

/// Flags that only need a look at each line (Python)
#[derive(Debug, Clone, Default)]
pub struct LineFindings {
    pub issues: Vec<Issue>,
    pub has_wildcard_import: bool,
    pub uses_global: bool,
}

pub fn scan_python_lines(source: &str) -> LineFindings {
    let mut findings = LineFindings::default();

    for (idx, line) in source.lines().enumerate() {
        let line_number = idx + 1; // 1-indexed
        let is_comment = line.trim_start().starts_with('#');

        if !is_comment && PRINT_CALL.is_match(line) {
            findings.issues.push(Issue::new(
                IssueKind::DebugCode,
                line_number,
                "Debug print statement found",
            ));
        }

        if let Some(m) = TODO_MARKER.captures(line).and_then(|c| c.get(1)) {
            findings.issues.push(Issue::new(
                IssueKind::Todo,
                line_number,
                format!("{} marker found", m.as_str()),
            ));
        }

        if !is_comment {
            findings.has_wildcard_import |= WILDCARD_IMPORT.is_match(line);
            findings.uses_global |= GLOBAL_STMT.is_match(line);
        }
    }

    findings
}
