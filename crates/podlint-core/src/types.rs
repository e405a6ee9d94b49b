//! Core types shared by the config pipeline and the rule host.

use crate::diagnostic::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Severity level of a diagnostic.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    #[default]
    Error,
}

impl Severity {
    /// Parses the lowercase markup spelling (`"error"`, `"warning"`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A 1-based line/column position inside a markup document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextPosition {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl TextPosition {
    /// The first character of a document.
    pub const START: Self = Self { line: 1, column: 1 };

    /// Creates a new position.
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source code location of a rule finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// File path.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Location {
    /// Creates a new location from span information.
    #[must_use]
    pub fn from_span(file: PathBuf, span: proc_macro2::Span) -> Self {
        let start = span.start();
        Self {
            file,
            line: start.line,
            column: start.column + 1,
        }
    }

    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

/// A finding produced by a rule, positioned in 1-based source coordinates.
///
/// Violations are converted into [`crate::Diagnostic`]s by the
/// [`crate::DiagnosticMapper`] before they are reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "PL001").
    pub code: String,
    /// Rule name (e.g., "long-line").
    pub rule: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Primary location of the violation.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.code,
            self.message
        )
    }
}

/// Result of running a lint analysis.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All diagnostics, config diagnostics first, then rule findings.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of files checked.
    pub files_checked: usize,
    /// Severity at or above which the run fails (`<config failOn>`).
    pub fail_on: Severity,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_diagnostics_at(Severity::Error)
    }

    /// Returns true if any diagnostic reaches the `fail_on` threshold.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.has_diagnostics_at(self.fail_on)
    }

    /// Checks if any diagnostic meets or exceeds the given severity threshold.
    #[must_use]
    pub fn has_diagnostics_at(&self, severity: Severity) -> bool {
        self.diagnostics.iter().any(|d| d.severity >= severity)
    }

    /// Counts diagnostics as `(errors, warnings)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize) {
        let errors = self
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        (errors, self.diagnostics.len() - errors)
    }

    /// Formats every diagnostic followed by a one-line summary.
    #[must_use]
    pub fn format_report(&self) -> String {
        use std::fmt::Write;

        let mut report = String::new();
        for diagnostic in &self.diagnostics {
            let _ = writeln!(report, "{diagnostic}");
        }

        let (errors, warnings) = self.count_by_severity();
        let _ = write!(
            report,
            "Found {} error(s), {} warning(s) in {} file(s)",
            errors, warnings, self.files_checked
        );
        report
    }

    /// Adds diagnostics from another result.
    pub fn extend(&mut self, other: Self) {
        self.diagnostics.extend(other.diagnostics);
        self.files_checked += other.files_checked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_diagnostic(severity: Severity) -> Diagnostic {
        Diagnostic {
            path: Some(PathBuf::from("src/lib.rs")),
            line: 41,
            column: 9,
            severity,
            code: "PL001".to_string(),
            rule: "long-line".to_string(),
            message: "line is 130 characters long".to_string(),
        }
    }

    #[test]
    fn severity_orders_warning_below_error() {
        assert!(Severity::Warning < Severity::Error);
        assert_eq!(Severity::parse("warning"), Some(Severity::Warning));
        assert_eq!(Severity::parse("info"), None);
    }

    #[test]
    fn violation_display() {
        let v = Violation::new(
            "PL001",
            "long-line",
            Severity::Warning,
            Location::new(PathBuf::from("src/lib.rs"), 42, 10),
            "too long",
        );
        assert_eq!(v.to_string(), "src/lib.rs:42:10: warning [PL001] too long");
    }

    #[test]
    fn has_diagnostics_at_threshold() {
        let mut result = LintResult::new();
        result.diagnostics.push(make_diagnostic(Severity::Warning));
        assert!(!result.has_errors());
        assert!(result.has_diagnostics_at(Severity::Warning));
        assert!(!result.is_failure());

        result.fail_on = Severity::Warning;
        assert!(result.is_failure());
    }

    #[test]
    fn format_report_summarizes_counts() {
        let mut result = LintResult::new();
        result.files_checked = 3;
        result.diagnostics.push(make_diagnostic(Severity::Warning));
        result.diagnostics.push(make_diagnostic(Severity::Error));

        let report = result.format_report();
        assert!(report.contains("src/lib.rs:42:10"));
        assert!(report.ends_with("Found 1 error(s), 1 warning(s) in 3 file(s)"));
    }

    #[test]
    fn extend_merges_counts() {
        let mut a = LintResult::new();
        a.files_checked = 1;
        let mut b = LintResult::new();
        b.files_checked = 2;
        b.diagnostics.push(make_diagnostic(Severity::Error));
        a.extend(b);
        assert_eq!(a.files_checked, 3);
        assert_eq!(a.count_by_severity(), (1, 0));
    }
}
