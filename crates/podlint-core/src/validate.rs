//! Semantic validation of a bound configuration tree.
//!
//! Each check looks at one node and yields at most one [`Issue`]. All checks
//! run on all nodes; the result is ordered by position in the document.

use crate::config::{
    parse_positive, AnalyzerSection, ConfigTree, ExcludeEntry, LongLineConfig, MAX_PARALLELISM,
};
use crate::types::TextPosition;

/// A located semantic-validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Issue {
    /// Line of the offending node (1-indexed).
    pub line: usize,
    /// Column of the offending node (1-indexed).
    pub column: usize,
    /// Human-readable message.
    pub message: String,
}

impl Issue {
    fn at(position: Option<TextPosition>, message: String) -> Self {
        let position = position.unwrap_or(TextPosition::START);
        Self {
            line: position.line,
            column: position.column,
            message,
        }
    }
}

/// Validates a configuration tree.
#[must_use]
pub fn validate(tree: &ConfigTree) -> Vec<Issue> {
    let mut issues = Vec::new();

    if let Some(analyzer) = &tree.analyzer {
        issues.extend(parallelism_in_range(analyzer));
        for exclude in &analyzer.excludes {
            issues.extend(exclude_is_glob(exclude, "pattern"));
        }
    }

    if let Some(long_line) = &tree.long_line {
        issues.extend(positive_bound(
            "maxLineLength",
            long_line.max_line_length.as_deref(),
            long_line.position,
        ));
        issues.extend(positive_bound(
            "tabWidth",
            long_line.tab_width.as_deref(),
            long_line.position,
        ));
        issues.extend(tab_width_within_line(long_line));
    }

    if let Some(unused) = &tree.unused_function {
        for exclude in &unused.excludes {
            issues.extend(exclude_is_glob(exclude, "name"));
        }
    }

    // Stable: issues on the same node keep check order.
    issues.sort_by_key(|i| (i.line, i.column));
    issues
}

fn positive_bound(
    attribute: &str,
    raw: Option<&str>,
    position: Option<TextPosition>,
) -> Option<Issue> {
    let raw = raw?;
    if parse_positive(raw).is_some() {
        return None;
    }
    Some(Issue::at(
        position,
        format!("{attribute} must be a positive integer, found \"{raw}\""),
    ))
}

fn tab_width_within_line(config: &LongLineConfig) -> Option<Issue> {
    let max = parse_positive(config.max_line_length.as_deref()?)?;
    let tab = parse_positive(config.tab_width.as_deref()?)?;
    (tab > max).then(|| {
        Issue::at(
            config.position,
            format!("tabWidth ({tab}) must not exceed maxLineLength ({max})"),
        )
    })
}

fn parallelism_in_range(analyzer: &AnalyzerSection) -> Option<Issue> {
    let n = analyzer.parallelism?;
    let in_range = usize::try_from(n).is_ok_and(|n| (1..=MAX_PARALLELISM).contains(&n));
    (!in_range).then(|| {
        Issue::at(
            analyzer.position,
            format!("parallelism must be between 1 and {MAX_PARALLELISM}, found {n}"),
        )
    })
}

fn exclude_is_glob(exclude: &ExcludeEntry, attribute: &str) -> Option<Issue> {
    if exclude.pattern.trim().is_empty() {
        return Some(Issue::at(
            exclude.position,
            format!("{attribute} must not be empty"),
        ));
    }
    glob::Pattern::new(&exclude.pattern).err().map(|e| {
        Issue::at(
            exclude.position,
            format!("{attribute} \"{}\" is not a valid glob: {e}", exclude.pattern),
        )
    })
}
