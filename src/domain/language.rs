//! Language labels and the file extension table

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Language label attached to stored files and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    Javascript,
    Typescript,
    Java,
    C,
    Cpp,
    Csharp,
    Go,
    Rust,
    Ruby,
    Php,
    Swift,
    Kotlin,
    Shell,
    Sql,
    Html,
    Css,
    Json,
    Yaml,
    Markdown,
    Text,
}

/// Allowed file extensions. Anything not listed here is rejected.
const EXTENSIONS: &[(&str, Language)] = &[
    ("py", Language::Python),
    ("pyw", Language::Python),
    ("js", Language::Javascript),
    ("mjs", Language::Javascript),
    ("cjs", Language::Javascript),
    ("jsx", Language::Javascript),
    ("ts", Language::Typescript),
    ("tsx", Language::Typescript),
    ("java", Language::Java),
    ("c", Language::C),
    ("h", Language::C),
    ("cpp", Language::Cpp),
    ("cc", Language::Cpp),
    ("cxx", Language::Cpp),
    ("hpp", Language::Cpp),
    ("cs", Language::Csharp),
    ("go", Language::Go),
    ("rs", Language::Rust),
    ("rb", Language::Ruby),
    ("php", Language::Php),
    ("swift", Language::Swift),
    ("kt", Language::Kotlin),
    ("kts", Language::Kotlin),
    ("sh", Language::Shell),
    ("bash", Language::Shell),
    ("sql", Language::Sql),
    ("html", Language::Html),
    ("htm", Language::Html),
    ("css", Language::Css),
    ("json", Language::Json),
    ("yaml", Language::Yaml),
    ("yml", Language::Yaml),
    ("md", Language::Markdown),
    ("txt", Language::Text),
];

impl Language {
    /// Parse a language label (case-insensitive, common aliases accepted)
    /// - python: py, python, python3
    /// - javascript: js, javascript, node
    /// - cpp: cpp, c++, cxx
    /// - csharp: cs, c#, csharp
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "python" | "py" | "python3" => Some(Language::Python),
            "javascript" | "js" | "node" => Some(Language::Javascript),
            "typescript" | "ts" => Some(Language::Typescript),
            "java" => Some(Language::Java),
            "c" => Some(Language::C),
            "cpp" | "c++" | "cxx" => Some(Language::Cpp),
            "csharp" | "c#" | "cs" => Some(Language::Csharp),
            "go" | "golang" => Some(Language::Go),
            "rust" | "rs" => Some(Language::Rust),
            "ruby" | "rb" => Some(Language::Ruby),
            "php" => Some(Language::Php),
            "swift" => Some(Language::Swift),
            "kotlin" | "kt" => Some(Language::Kotlin),
            "shell" | "sh" | "bash" => Some(Language::Shell),
            "sql" => Some(Language::Sql),
            "html" => Some(Language::Html),
            "css" => Some(Language::Css),
            "json" => Some(Language::Json),
            "yaml" | "yml" => Some(Language::Yaml),
            "markdown" | "md" => Some(Language::Markdown),
            "text" | "txt" | "plaintext" => Some(Language::Text),
            _ => None,
        }
    }

    /// Look up the language for a file extension (without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        EXTENSIONS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, lang)| *lang)
    }

    /// Detect the language of a filename from its extension
    pub fn detect(filename: &str) -> Option<Self> {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Comma-separated list of accepted extensions, for error messages
    pub fn allowed_extensions() -> String {
        EXTENSIONS
            .iter()
            .map(|(e, _)| format!(".{}", e))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Get the canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Csharp => "csharp",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Swift => "swift",
            Language::Kotlin => "kotlin",
            Language::Shell => "shell",
            Language::Sql => "sql",
            Language::Html => "html",
            Language::Css => "css",
            Language::Json => "json",
            Language::Yaml => "yaml",
            Language::Markdown => "markdown",
            Language::Text => "text",
        }
    }

    /// Line comment prefix, if the language has one
    pub fn line_comment(&self) -> Option<&'static str> {
        match self {
            Language::Python | Language::Ruby | Language::Shell | Language::Yaml => Some("#"),
            Language::Javascript
            | Language::Typescript
            | Language::Java
            | Language::C
            | Language::Cpp
            | Language::Csharp
            | Language::Go
            | Language::Rust
            | Language::Php
            | Language::Swift
            | Language::Kotlin => Some("//"),
            Language::Sql => Some("--"),
            Language::Html
            | Language::Css
            | Language::Json
            | Language::Markdown
            | Language::Text => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
