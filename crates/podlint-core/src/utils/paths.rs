//! Path and text helpers for AST analysis.

use syn::Path;

/// Returns the last segment of a path as a string.
///
/// # Example
///
/// ```ignore
/// // For path `crate::util::helper`
/// assert_eq!(last_ident(&path).as_deref(), Some("helper"));
/// ```
#[must_use]
pub fn last_ident(path: &Path) -> Option<String> {
    path.segments.last().map(|seg| seg.ident.to_string())
}

/// Display width of a line, with each tab counting as `tab_width` columns.
#[must_use]
pub fn expanded_width(line: &str, tab_width: usize) -> usize {
    line.chars()
        .map(|c| if c == '\t' { tab_width } else { 1 })
        .sum()
}
