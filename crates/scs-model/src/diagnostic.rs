//! Normalized compiler diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Map a compiler severity or category string onto a severity.
    ///
    /// Anything the compiler labels as an error kind (`Error`,
    /// `ParserError`, `TypeError`, ...) is an error; `Warning` is a warning;
    /// everything else is informational.
    #[must_use]
    pub fn from_compiler_label(label: &str) -> Self {
        let lower = label.trim().to_ascii_lowercase();
        if lower.contains("error") || lower == "fatal" || lower == "exception" {
            Self::Error
        } else if lower.contains("warning") {
            Self::Warning
        } else {
            Self::Info
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A compiler-reported issue mapped onto a source position.
///
/// `line` and `column` are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Source or contract label the compiler attached, `None` for
    /// diagnostics against the edited file itself.
    pub contract_name: Option<String>,
    pub line: usize,
    pub column: usize,
    /// Produced by the formal-verification checker rather than the compiler
    /// proper.
    pub is_formal_verification: bool,
}

impl Diagnostic {
    /// Whether the editor should render this as a gutter annotation.
    #[must_use]
    pub fn is_annotation(&self) -> bool {
        self.contract_name.is_none()
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Per-severity tallies over a diagnostics list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticCounts {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub formal: usize,
}

impl DiagnosticCounts {
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        let mut counts = Self::default();
        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Info => counts.infos += 1,
            }
            if diagnostic.is_formal_verification {
                counts.formal += 1;
            }
        }
        counts
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}
