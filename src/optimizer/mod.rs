//! Source optimizer
//!
//! Line-level rewrites only: dropping debug output, trimming trailing
//! whitespace and collapsing blank lines. None of them adds lines, and each
//! line keeps its original terminator (`\n` or `\r\n`).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Change, Language, OptimizationResult, OptimizationType};

/// Start of a Python debug call; the rest of the line is checked by [`call_is_whole_statement`]
static PY_DEBUG_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^print\s*\(").unwrap());

static JS_DEBUG_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^console\.(log|debug)\s*\(").unwrap());

/// Most blank lines allowed in a row after collapsing
const MAX_BLANK_RUN: usize = 2;

/// One source line with its terminator split off
#[derive(Debug, Clone)]
struct SourceLine {
    /// Original line number (1-indexed)
    number: usize,
    text: String,
    /// `"\n"`, `"\r\n"` or `""` for an unterminated last line
    eol: &'static str,
}

fn split_lines(source: &str) -> Vec<SourceLine> {
    source
        .split_inclusive('\n')
        .enumerate()
        .map(|(idx, piece)| {
            let (text, eol) = if let Some(text) = piece.strip_suffix("\r\n") {
                (text, "\r\n")
            } else if let Some(text) = piece.strip_suffix('\n') {
                (text, "\n")
            } else {
                (piece, "")
            };
            SourceLine {
                number: idx + 1,
                text: text.to_string(),
                eol,
            }
        })
        .collect()
}

/// Apply `kind` to `source`
pub fn optimize(source: &str, language: Language, kind: OptimizationType) -> OptimizationResult {
    let had_trailing_newline = source.ends_with('\n');

    let mut lines = split_lines(source);
    let original_lines = lines.len();
    let mut changes = Vec::new();

    if kind.removes_debug() {
        lines = remove_debug(lines, language, &mut changes);
    }
    if kind.strips_whitespace() {
        strip_whitespace(&mut lines, &mut changes);
    }
    if kind.collapses_blank_lines() {
        lines = collapse_blank_lines(lines, &mut changes);
    }

    // Dropping the unterminated last line must not leave a new trailing newline
    if !had_trailing_newline {
        if let Some(last) = lines.last_mut() {
            last.eol = "";
        }
    }

    let optimized_code: String = lines
        .iter()
        .flat_map(|l| [l.text.as_str(), l.eol])
        .collect();

    changes.sort_by_key(|c| c.line);

    let original_size = source.len();
    let optimized_size = optimized_code.len();
    let size_reduction = if original_size == 0 {
        0.0
    } else {
        let saved = original_size as f64 - optimized_size as f64;
        (saved / original_size as f64 * 10_000.0).round() / 100.0
    };

    OptimizationResult {
        optimized_lines: lines.len(),
        optimized_code,
        changes,
        original_size,
        optimized_size,
        original_lines,
        size_reduction,
    }
}

fn is_debug_line(line: &str, language: Language) -> bool {
    let trimmed = line.trim();
    let (call, comment) = match language {
        Language::Python => (&*PY_DEBUG_CALL, "#"),
        Language::Javascript | Language::Typescript => (&*JS_DEBUG_CALL, "//"),
        _ => return false,
    };

    match call.find(trimmed) {
        // the pattern ends with `(`
        Some(m) => call_is_whole_statement(trimmed, m.end() - 1, comment),
        None => false,
    }
}

/// True when the call opened at `open` closes on this line and only `;`
/// and a trailing comment follow it
fn call_is_whole_statement(line: &str, open: usize, comment: &str) -> bool {
    let Some(end) = matching_paren(line, open) else {
        return false;
    };
    let rest = line[end..].trim_start();
    let rest = rest.strip_prefix(';').unwrap_or(rest).trim_start();
    rest.is_empty() || rest.starts_with(comment)
}

/// Byte offset just past the bracket closing the one at `open`.
///
/// Brackets inside string literals are ignored. `None` if the call spans
/// several lines.
fn matching_paren(line: &str, open: usize) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }

    None
}

/// Python line without its trailing `# ...` comment
fn strip_python_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'#' => return &line[..i],
                _ => {}
            },
        }
        i += 1;
    }

    line
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn is_significant(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

fn opens_python_block(line: &str) -> bool {
    strip_python_comment(line).trim_end().ends_with(':')
}

fn remove_debug(
    lines: Vec<SourceLine>,
    language: Language,
    changes: &mut Vec<Change>,
) -> Vec<SourceLine> {
    let mut out: Vec<SourceLine> = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        if !is_debug_line(&line.text, language) {
            out.push(line.clone());
            continue;
        }

        // A Python block can't be empty: keep a `pass` when the print was its only statement.
        let needs_placeholder = language == Language::Python && {
            let indent = indent_of(&line.text);
            let opens_block = out
                .iter()
                .rev()
                .find(|l| is_significant(&l.text))
                .is_some_and(|l| opens_python_block(&l.text));
            let block_continues = lines[idx + 1..]
                .iter()
                .find(|l| is_significant(&l.text))
                .is_some_and(|l| indent_of(&l.text) >= indent);
            opens_block && !block_continues
        };

        if needs_placeholder {
            let indent = &line.text[..indent_of(&line.text)];
            out.push(SourceLine {
                number: line.number,
                text: format!("{}pass", indent),
                eol: line.eol,
            });
            changes.push(Change {
                kind: OptimizationType::RemoveDebug,
                line: line.number,
                description: "Replaced debug print with pass".to_string(),
            });
        } else {
            changes.push(Change {
                kind: OptimizationType::RemoveDebug,
                line: line.number,
                description: format!("Removed debug statement: {}", line.text.trim()),
            });
        }
    }

    out
}

fn strip_whitespace(lines: &mut [SourceLine], changes: &mut Vec<Change>) {
    for line in lines.iter_mut() {
        let trimmed_len = line.text.trim_end().len();
        if trimmed_len != line.text.len() {
            line.text.truncate(trimmed_len);
            changes.push(Change {
                kind: OptimizationType::StripWhitespace,
                line: line.number,
                description: "Removed trailing whitespace".to_string(),
            });
        }
    }
}

fn collapse_blank_lines(lines: Vec<SourceLine>, changes: &mut Vec<Change>) -> Vec<SourceLine> {
    let first = lines.iter().position(|l| !l.text.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.text.trim().is_empty());

    let mut out = Vec::with_capacity(lines.len());
    let mut blank_run = 0;

    for (idx, line) in lines.into_iter().enumerate() {
        let is_blank = line.text.trim().is_empty();
        let outside = match (first, last) {
            (Some(first), Some(last)) => idx < first || idx > last,
            _ => true,
        };

        if is_blank {
            blank_run += 1;
            if outside || blank_run > MAX_BLANK_RUN {
                changes.push(Change {
                    kind: OptimizationType::CollapseBlankLines,
                    line: line.number,
                    description: "Removed redundant blank line".to_string(),
                });
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push(line);
    }

    out
}
