//! Source scanner producing analysis reports
//!
//! Every language gets line counts. Python additionally gets a syntax-tree
//! summary, per-line checks and a handful of static suggestions.

mod lines;
mod python;

pub use lines::LineStats;

use chrono::Utc;

use crate::config::AnalysisSettings;
use crate::{Issue, IssueKind, Language, Report};

/// Scans source text into a [`Report`]
#[derive(Debug, Clone)]
pub struct Scanner {
    max_file_lines: usize,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(&AnalysisSettings::default())
    }
}

impl Scanner {
    pub fn new(settings: &AnalysisSettings) -> Self {
        Self {
            max_file_lines: settings.max_file_lines,
        }
    }

    /// Analyze `source` as `language`
    pub fn scan(&self, source: &str, language: Language) -> Report {
        let stats = LineStats::count(source, language);

        let mut report = Report {
            language,
            total_lines: stats.total,
            non_blank_lines: stats.non_blank,
            blank_lines: stats.blank,
            comment_lines: stats.comment,
            structure: None,
            issues: Vec::new(),
            suggestions: Vec::new(),
            syntax_error: None,
            analyzed_at: Utc::now(),
        };

        if language == Language::Python {
            self.scan_python(source, &mut report);
        }

        report
    }

    fn scan_python(&self, source: &str, report: &mut Report) {
        let summary = match python::summarize(source) {
            Ok(summary) => summary,
            Err(syntax) => {
                report.issues.push(Issue::new(
                    IssueKind::SyntaxError,
                    syntax.line,
                    format!("Syntax error: {}", syntax.message),
                ));
                report.syntax_error = Some(syntax);
                return;
            }
        };

        let line_findings = lines::scan_python_lines(source);

        let mut issues: Vec<Issue> = summary
            .bare_excepts
            .iter()
            .map(|&line| {
                Issue::new(
                    IssueKind::BareExcept,
                    line,
                    "Bare except clause catches everything; name the exception type",
                )
            })
            .collect();
        issues.extend(line_findings.issues);
        issues.sort_by(|a, b| a.line.cmp(&b.line).then(a.kind.cmp(&b.kind)));

        let mut suggestions = Vec::new();
        if !summary.missing_docstrings.is_empty() {
            suggestions.push(format!(
                "Add docstrings to: {}",
                summary.missing_docstrings.join(", ")
            ));
        }
        if line_findings.has_wildcard_import {
            suggestions.push(
                "Avoid wildcard imports (from x import *); import the names you use".to_string(),
            );
        }
        if line_findings.uses_global {
            suggestions.push(
                "Avoid the global keyword; pass values explicitly or use a class".to_string(),
            );
        }
        if report.total_lines > self.max_file_lines {
            suggestions.push(format!(
                "File has {} lines (limit {}); consider splitting it into modules",
                report.total_lines, self.max_file_lines
            ));
        }
        if issues.iter().any(|i| i.kind == IssueKind::DebugCode) {
            suggestions.push(
                "Remove debug print statements (optimize with remove_debug)".to_string(),
            );
        }

        report.issues = issues;
        report.suggestions = suggestions;
        report.structure = Some(summary.structure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_with_print() {
        let report = Scanner::default().scan("def f():\n    print('x')\n", Language::Python);

        let structure = report.structure.as_ref().unwrap();
        assert_eq!(structure.functions, vec!["f"]);
        assert!(structure.classes.is_empty());

        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, IssueKind::DebugCode);
        assert_eq!(report.issues[0].line, 2);
        assert_eq!(report.total_lines, 2);
    }

    #[test]
    fn test_syntax_error_replaces_summary() {
        let source = "print('debug')\ndef broken(\n";
        let report = Scanner::default().scan(source, Language::Python);

        assert!(report.structure.is_none());
        assert!(report.suggestions.is_empty());
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, IssueKind::SyntaxError);
        let syntax = report.syntax_error.as_ref().unwrap();
        assert_eq!(report.issues[0].line, syntax.line);
        assert_eq!(report.total_lines, 2);
    }

    #[test]
    fn test_non_python_is_line_count_only() {
        let source = "// TODO: fix\nconsole.log('x');\n\nprint('not python');\n";
        let report = Scanner::default().scan(source, Language::Javascript);

        assert_eq!(report.total_lines, 4);
        assert_eq!(report.blank_lines, 1);
        assert_eq!(report.comment_lines, 1);
        assert!(report.structure.is_none());
        assert!(report.issues.is_empty());
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn test_bare_except_issue() {
        let source = "try:\n    pass\nexcept:\n    pass\n";
        let report = Scanner::default().scan(source, Language::Python);
        assert_eq!(report.count(IssueKind::BareExcept), 1);
        assert_eq!(report.issues[0].line, 3);

        let source = "try:\n    pass\nexcept ValueError:\n    pass\n";
        let report = Scanner::default().scan(source, Language::Python);
        assert_eq!(report.count(IssueKind::BareExcept), 0);
    }

    #[test]
    fn test_issues_sorted_by_line() {
        let source = "# TODO: later\ntry:\n    print('x')\nexcept:\n    pass\n";
        let report = Scanner::default().scan(source, Language::Python);
        let kinds: Vec<(usize, IssueKind)> =
            report.issues.iter().map(|i| (i.line, i.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (1, IssueKind::Todo),
                (3, IssueKind::DebugCode),
                (4, IssueKind::BareExcept),
            ]
        );
    }

    #[test]
    fn test_suggestions() {
        let source = "from os import *\n\ndef f():\n    global counter\n    print(counter)\n";
        let scanner = Scanner::new(&AnalysisSettings { max_file_lines: 3 });
        let report = scanner.scan(source, Language::Python);

        assert_eq!(report.suggestions.len(), 5);
        assert_eq!(report.suggestions[0], "Add docstrings to: f");
        assert!(report.suggestions[1].contains("wildcard"));
        assert!(report.suggestions[2].contains("global"));
        assert!(report.suggestions[3].contains("5 lines"));
        assert!(report.suggestions[4].contains("remove_debug"));
    }

    #[test]
    fn test_clean_module_has_no_findings() {
        let source = "\"\"\"Module.\"\"\"\n\nimport os\n\n\ndef cwd():\n    \"\"\"Return cwd.\"\"\"\n    return os.getcwd()\n";
        let report = Scanner::default().scan(source, Language::Python);
        assert!(report.issues.is_empty());
        assert!(report.suggestions.is_empty());
        assert_eq!(report.structure.unwrap().imports, vec!["os"]);
    }
}
