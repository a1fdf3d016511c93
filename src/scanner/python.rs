//! Python syntax-tree walk
//!
//! One pass over the parsed module collects the top-level definitions,
//! imports, bare `except:` handlers and a shallow complexity count.

use std::collections::BTreeSet;

use rustpython_parser::ast::{self, Constant, ExceptHandler, Expr, Stmt};
use rustpython_parser::Parse;

use crate::{PythonStructure, SyntaxErrorInfo};

/// Everything the tree walk found in a module
#[derive(Debug, Clone, Default)]
pub struct ModuleSummary {
    pub structure: PythonStructure,
    /// Lines (1-indexed) of `except:` handlers without a type
    pub bare_excepts: Vec<usize>,
    /// Definitions without a docstring (`f`, `C`, `C.method`)
    pub missing_docstrings: Vec<String>,
}

/// Parse `source` and summarize it.
///
/// A parse failure yields the failing line and the parser message; there is
/// no partial summary.
pub fn summarize(source: &str) -> Result<ModuleSummary, SyntaxErrorInfo> {
    let suite = ast::Suite::parse(source, "<input>").map_err(|e| SyntaxErrorInfo {
        line: line_at(source, u32::from(e.offset) as usize),
        message: e.error.to_string(),
    })?;

    let mut walker = Walker {
        source,
        complexity: 1,
        bare_excepts: Vec::new(),
        imports: BTreeSet::new(),
    };
    walker.visit_body(&suite);

    let mut functions = Vec::new();
    let mut classes = Vec::new();
    let mut missing_docstrings = Vec::new();

    for stmt in &suite {
        match stmt {
            Stmt::FunctionDef(ast::StmtFunctionDef { name, body, .. })
            | Stmt::AsyncFunctionDef(ast::StmtAsyncFunctionDef { name, body, .. }) => {
                functions.push(name.as_str().to_string());
                if !has_docstring(body) {
                    missing_docstrings.push(name.as_str().to_string());
                }
            }
            Stmt::ClassDef(ast::StmtClassDef { name, body, .. }) => {
                let class_name = name.as_str();
                classes.push(class_name.to_string());
                if !has_docstring(body) {
                    missing_docstrings.push(class_name.to_string());
                }
                for method in methods(body) {
                    missing_docstrings.push(format!("{}.{}", class_name, method));
                }
            }
            _ => {}
        }
    }

    walker.bare_excepts.sort_unstable();

    Ok(ModuleSummary {
        structure: PythonStructure {
            functions,
            classes,
            imports: walker.imports.into_iter().collect(),
            complexity: walker.complexity,
        },
        bare_excepts: walker.bare_excepts,
        missing_docstrings,
    })
}

/// Names of methods in a class body that lack a docstring
fn methods(body: &[Stmt]) -> Vec<&str> {
    body.iter()
        .filter_map(|stmt| match stmt {
            Stmt::FunctionDef(ast::StmtFunctionDef { name, body, .. })
            | Stmt::AsyncFunctionDef(ast::StmtAsyncFunctionDef { name, body, .. })
                if !has_docstring(body) =>
            {
                Some(name.as_str())
            }
            _ => None,
        })
        .collect()
}

/// A body has a docstring when its first statement is a bare string literal
fn has_docstring(body: &[Stmt]) -> bool {
    match body.first() {
        Some(Stmt::Expr(ast::StmtExpr { value, .. })) => matches!(
            value.as_ref(),
            Expr::Constant(ast::ExprConstant {
                value: Constant::Str(_),
                ..
            })
        ),
        _ => false,
    }
}

struct Walker<'a> {
    source: &'a str,
    complexity: usize,
    bare_excepts: Vec<usize>,
    imports: BTreeSet<String>,
}

impl Walker<'_> {
    fn visit_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FunctionDef(ast::StmtFunctionDef { body, .. })
            | Stmt::AsyncFunctionDef(ast::StmtAsyncFunctionDef { body, .. })
            | Stmt::ClassDef(ast::StmtClassDef { body, .. })
            | Stmt::With(ast::StmtWith { body, .. })
            | Stmt::AsyncWith(ast::StmtAsyncWith { body, .. }) => self.visit_body(body),

            // `elif` shows up as a nested `If` in `orelse`
            Stmt::If(ast::StmtIf { body, orelse, .. })
            | Stmt::For(ast::StmtFor { body, orelse, .. })
            | Stmt::AsyncFor(ast::StmtAsyncFor { body, orelse, .. })
            | Stmt::While(ast::StmtWhile { body, orelse, .. }) => {
                self.complexity += 1;
                self.visit_body(body);
                self.visit_body(orelse);
            }

            Stmt::Try(ast::StmtTry {
                body,
                handlers,
                orelse,
                finalbody,
                ..
            })
            | Stmt::TryStar(ast::StmtTryStar {
                body,
                handlers,
                orelse,
                finalbody,
                ..
            }) => {
                self.visit_body(body);
                self.visit_handlers(handlers);
                self.visit_body(orelse);
                self.visit_body(finalbody);
            }

            Stmt::Match(ast::StmtMatch { cases, .. }) => {
                for case in cases {
                    self.complexity += 1;
                    self.visit_body(&case.body);
                }
            }

            Stmt::Import(ast::StmtImport { names, .. }) => {
                for alias in names {
                    self.imports.insert(alias.name.as_str().to_string());
                }
            }
            Stmt::ImportFrom(ast::StmtImportFrom { module, .. }) => {
                let module = module
                    .as_ref()
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| ".".to_string());
                self.imports.insert(module);
            }

            _ => {}
        }
    }

    fn visit_handlers(&mut self, handlers: &[ExceptHandler]) {
        for handler in handlers {
            match handler {
                ExceptHandler::ExceptHandler(ast::ExceptHandlerExceptHandler {
                    type_,
                    body,
                    range,
                    ..
                }) => {
                    self.complexity += 1;
                    if type_.is_none() {
                        self.bare_excepts
                            .push(line_at(self.source, u32::from(range.start()) as usize));
                    }
                    self.visit_body(body);
                }
            }
        }
    }
}

/// 1-indexed line containing byte `offset`, clamped to the last line
fn line_at(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    let line = source.as_bytes()[..end]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1;
    line.min(source.lines().count().max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(source: &str) -> ModuleSummary {
        summarize(source).expect("fixture should parse")
    }

    #[test]
    fn test_top_level_definitions_only() {
        let source = r#"
import os

def first():
    def nested():
        pass
    return nested

async def second():
    pass

class Widget:
    def method(self):
        pass

    class Inner:
        pass

if __name__ == "__main__":
    def not_top_level():
        pass
"#;
        let s = summary(source);
        assert_eq!(s.structure.functions, vec!["first", "second"]);
        assert_eq!(s.structure.classes, vec!["Widget"]);
    }

    #[test]
    fn test_imports_sorted_and_deduplicated() {
        let source = "import sys\nimport os.path, json\nfrom collections import OrderedDict\nfrom . import sibling\nimport sys\n";
        let s = summary(source);
        assert_eq!(
            s.structure.imports,
            vec![".", "collections", "json", "os.path", "sys"]
        );
    }

    #[test]
    fn test_bare_except_flagged_at_any_depth() {
        let source = r#"def f():
    try:
        risky()
    except:
        pass

try:
    other()
except ValueError:
    pass
"#;
        let s = summary(source);
        assert_eq!(s.bare_excepts, vec![4]);
    }

    #[test]
    fn test_typed_except_not_flagged() {
        let source = "try:\n    x = 1\nexcept (ValueError, KeyError) as e:\n    raise\n";
        assert!(summary(source).bare_excepts.is_empty());
    }

    #[test]
    fn test_complexity_counts_decision_nodes() {
        let source = r#"def f(x):
    if x > 0:
        return 1
    elif x < 0:
        return -1
    for i in range(3):
        while i:
            i -= 1
    try:
        pass
    except KeyError:
        pass
    return 0
"#;
        // 1 + if + elif + for + while + except
        assert_eq!(summary(source).structure.complexity, 6);
    }

    #[test]
    fn test_empty_module_has_base_complexity() {
        let s = summary("");
        assert_eq!(s.structure.complexity, 1);
        assert!(s.structure.functions.is_empty());
    }

    #[test]
    fn test_missing_docstrings() {
        let source = r#"def documented():
    """Does things."""

def bare():
    return 1

class Thing:
    """A thing."""

    def run(self):
        pass
"#;
        let s = summary(source);
        assert_eq!(s.missing_docstrings, vec!["bare", "Thing.run"]);
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let err = summarize("x = 1\ny = 2\ndef broken(:\n    pass\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_line_at() {
        let source = "a\nbb\nccc\n";
        assert_eq!(line_at(source, 0), 1);
        assert_eq!(line_at(source, 2), 2);
        assert_eq!(line_at(source, 5), 3);
        assert_eq!(line_at(source, 999), 3);
    }
}
