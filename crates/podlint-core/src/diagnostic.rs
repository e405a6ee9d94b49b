//! Mapping of load failures, validation issues and rule findings onto one
//! diagnostic shape.
//!
//! Every source position inside podlint is 1-based; diagnostics are 0-based.
//! The mapper is the only place that converts between the two:
//!
//! | input | location |
//! |---|---|
//! | [`ParseError`] | parser line − 1, parser column − 1 |
//! | [`BindError`] with position | line − 1, column − 1 |
//! | [`BindError`] without position | 0, 0 |
//! | [`Issue`] | issue line − 1, issue column − 1 |
//!
//! A document without a path has no location at all.

use crate::binder::BindError;
use crate::markup::ParseError;
use crate::pod::{LoadFailure, LoadOutcome};
use crate::types::{Severity, TextPosition, Violation};
use crate::validate::Issue;
use miette::SourceSpan;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Code attached to configuration diagnostics.
pub const CONFIG_CODE: &str = "PL000";

/// Rule name attached to configuration diagnostics.
pub const CONFIG_RULE: &str = "config";

/// A 0-based position in a document, or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticLocation {
    /// Line and column (0-indexed).
    At {
        /// Line (0-indexed).
        line: usize,
        /// Column (0-indexed).
        column: usize,
    },
    /// The document has no path; there is nothing to point at.
    Unlocated,
}

/// Anything the mapper can place.
#[derive(Debug, Clone, Copy)]
pub enum Mappable<'a> {
    /// Malformed or unreadable document.
    Parse(&'a ParseError),
    /// Schema mismatch.
    Bind(&'a BindError),
    /// Validation issue.
    Issue(&'a Issue),
}

impl<'a> From<&'a LoadFailure> for Mappable<'a> {
    fn from(failure: &'a LoadFailure) -> Self {
        match failure {
            LoadFailure::Parse(e) => Self::Parse(e),
            LoadFailure::Bind(e) => Self::Bind(e),
        }
    }
}

impl<'a> From<&'a Issue> for Mappable<'a> {
    fn from(issue: &'a Issue) -> Self {
        Self::Issue(issue)
    }
}

/// A reportable diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Document path, absent for unlocated diagnostics.
    pub path: Option<PathBuf>,
    /// Line (0-indexed).
    pub line: usize,
    /// Column (0-indexed).
    pub column: usize,
    /// Severity.
    pub severity: Severity,
    /// Rule code (e.g., "PL001").
    pub code: String,
    /// Rule name (e.g., "long-line").
    pub rule: String,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(
                f,
                "{}:{}:{}: ",
                path.display(),
                self.line + 1,
                self.column + 1
            )?,
            None => write!(f, "<no location>: ")?,
        }
        write!(f, "{} [{}] {}", self.severity, self.code, self.message)
    }
}

/// Maps load results and rule findings onto [`Diagnostic`]s.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticMapper<'a> {
    path: Option<&'a Path>,
}

impl<'a> DiagnosticMapper<'a> {
    /// A mapper for the document at `path` (or an unlocated document).
    #[must_use]
    pub fn new(path: Option<&'a Path>) -> Self {
        Self { path }
    }

    /// A mapper for the document an outcome was loaded from.
    #[must_use]
    pub fn for_outcome(outcome: &'a LoadOutcome) -> Self {
        Self::new(outcome.source_path.as_deref())
    }

    /// Maps one item to its location and message.
    #[must_use]
    pub fn map(&self, item: Mappable<'_>) -> (DiagnosticLocation, String) {
        let (position, message) = match item {
            Mappable::Parse(e) => (Some(e.position()), e.message.clone()),
            Mappable::Bind(e) => (e.position(), e.to_string()),
            Mappable::Issue(i) => (Some(TextPosition::new(i.line, i.column)), i.message.clone()),
        };
        (self.locate(position), message)
    }

    /// Maps a load outcome to its config diagnostics.
    ///
    /// A parse or bind failure yields exactly one diagnostic; otherwise
    /// there is one per validation issue.
    #[must_use]
    pub fn diagnostics(outcome: &LoadOutcome) -> Vec<Diagnostic> {
        let mapper = DiagnosticMapper::for_outcome(outcome);
        match &outcome.failure {
            Some(failure) => vec![mapper.config_diagnostic(failure.into())],
            None => outcome
                .issues
                .iter()
                .map(|issue| mapper.config_diagnostic(issue.into()))
                .collect(),
        }
    }

    /// Maps a rule finding, applying the same 1-based → 0-based rule.
    #[must_use]
    pub fn map_violation(violation: &Violation) -> Diagnostic {
        Diagnostic {
            path: Some(violation.location.file.clone()),
            line: violation.location.line.saturating_sub(1),
            column: violation.location.column.saturating_sub(1),
            severity: violation.severity,
            code: violation.code.clone(),
            rule: violation.rule.clone(),
            message: violation.message.clone(),
        }
    }

    fn config_diagnostic(&self, item: Mappable<'_>) -> Diagnostic {
        let (location, message) = self.map(item);
        let (path, line, column) = match location {
            DiagnosticLocation::At { line, column } => {
                (self.path.map(Path::to_path_buf), line, column)
            }
            DiagnosticLocation::Unlocated => (None, 0, 0),
        };
        Diagnostic {
            path,
            line,
            column,
            severity: Severity::Error,
            code: CONFIG_CODE.to_string(),
            rule: CONFIG_RULE.to_string(),
            message,
        }
    }

    fn locate(&self, position: Option<TextPosition>) -> DiagnosticLocation {
        if self.path.is_none() {
            return DiagnosticLocation::Unlocated;
        }
        match position {
            Some(p) => DiagnosticLocation::At {
                line: p.line.saturating_sub(1),
                column: p.column.saturating_sub(1),
            },
            None => DiagnosticLocation::At { line: 0, column: 0 },
        }
    }
}

/// A [`Diagnostic`] rendered through miette, with its source text attached.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("[{code}] {message}")]
pub struct DiagnosticReport {
    code: String,
    message: String,
    #[source_code]
    source_code: String,
    #[label("{rule}")]
    span: SourceSpan,
    rule: String,
}

impl DiagnosticReport {
    /// Builds a report for `diagnostic` over the text it points into.
    #[must_use]
    pub fn new(diagnostic: &Diagnostic, source_code: impl Into<String>) -> Self {
        let source_code = source_code.into();
        let offset = offset_of(&source_code, diagnostic.line, diagnostic.column);
        Self {
            code: diagnostic.code.clone(),
            message: diagnostic.message.clone(),
            span: SourceSpan::from((offset, 0)),
            rule: diagnostic.rule.clone(),
            source_code,
        }
    }
}

/// Byte offset of a 0-based line/column, clamped to the text.
fn offset_of(text: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (i, line_content) in text.split_inclusive('\n').enumerate() {
        if i == line {
            let len = line_content.trim_end_matches('\n').len();
            return offset + column.min(len);
        }
        offset += line_content.len();
    }
    text.len()
}
