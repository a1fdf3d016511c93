use serde::{Deserialize, Serialize};

/// Which rewrites the optimizer should apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationType {
    /// Drop leftover debug output
    RemoveDebug,
    /// Remove trailing whitespace
    StripWhitespace,
    /// Collapse long runs of blank lines
    CollapseBlankLines,
    /// Everything above, in that order
    #[default]
    All,
}

impl OptimizationType {
    /// Parse an optimization type (supports short aliases)
    /// - remove_debug: debug, remove_debug, remove_prints
    /// - strip_whitespace: whitespace, strip_whitespace, trailing
    /// - collapse_blank_lines: blank, blank_lines, collapse_blank_lines
    /// - all: all, full
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "debug" | "remove_debug" | "remove_prints" => Some(OptimizationType::RemoveDebug),
            "whitespace" | "strip_whitespace" | "trailing" => {
                Some(OptimizationType::StripWhitespace)
            }
            "blank" | "blank_lines" | "collapse_blank_lines" => {
                Some(OptimizationType::CollapseBlankLines)
            }
            "all" | "full" => Some(OptimizationType::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationType::RemoveDebug => "remove_debug",
            OptimizationType::StripWhitespace => "strip_whitespace",
            OptimizationType::CollapseBlankLines => "collapse_blank_lines",
            OptimizationType::All => "all",
        }
    }

    pub fn removes_debug(&self) -> bool {
        matches!(self, OptimizationType::RemoveDebug | OptimizationType::All)
    }

    pub fn strips_whitespace(&self) -> bool {
        matches!(self, OptimizationType::StripWhitespace | OptimizationType::All)
    }

    pub fn collapses_blank_lines(&self) -> bool {
        matches!(
            self,
            OptimizationType::CollapseBlankLines | OptimizationType::All
        )
    }
}

impl std::fmt::Display for OptimizationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single rewrite applied by the optimizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Which rewrite produced this change
    pub kind: OptimizationType,
    /// Line in the input (1-indexed)
    pub line: usize,
    pub description: String,
}

/// Output of the optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub optimized_code: String,
    pub changes: Vec<Change>,
    pub original_size: usize,
    pub optimized_size: usize,
    pub original_lines: usize,
    pub optimized_lines: usize,
    /// Size reduction in percent of the original size
    pub size_reduction: f64,
}
