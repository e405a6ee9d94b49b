//! Typed configuration tree.
//!
//! Every node is built by the [`binder`](crate::binder) from its schema entry
//! and keeps the markup position it came from. The tree is immutable once
//! built; the defaults (`ConfigTree::default()`) apply when no document is
//! supplied or when loading fails.

use crate::binder::{self, BindError, BoundElement, FromBound};
use crate::markup::MarkupElement;
use crate::schema::{self, ElementSchema};
use crate::types::{Severity, TextPosition};

/// Line length used when `maxLineLength` is absent or invalid.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 120;

/// Tab width used when `tabWidth` is absent or invalid.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Largest accepted `<Analyzer parallelism>`.
pub const MAX_PARALLELISM: usize = 256;

/// Rule name configured by `<LongLine>`.
pub const LONG_LINE_RULE: &str = "long-line";

/// Rule name configured by `<UnusedFunction>`.
pub const UNUSED_FUNCTION_RULE: &str = "unused-function";

/// Root of the typed configuration tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigTree {
    /// Severity threshold for a failing run.
    pub fail_on: Option<Severity>,
    /// `<Analyzer>` section.
    pub analyzer: Option<AnalyzerSection>,
    /// `<LongLine>` section.
    pub long_line: Option<LongLineConfig>,
    /// `<UnusedFunction>` section.
    pub unused_function: Option<UnusedFunctionConfig>,
    /// Position of the root element.
    pub position: Option<TextPosition>,
}

impl ConfigTree {
    /// Binds a parsed document onto the typed tree.
    ///
    /// # Errors
    ///
    /// Returns the first schema mismatch in document order.
    pub fn bind(root: &MarkupElement) -> Result<Self, BindError> {
        binder::bind(root)
    }

    /// Severity at or above which a run fails (default: error).
    #[must_use]
    pub fn fail_on(&self) -> Severity {
        self.fail_on.unwrap_or(Severity::Error)
    }

    /// Shared settings of a rule section, if the section is present.
    #[must_use]
    pub fn rule_settings(&self, rule_name: &str) -> Option<&RuleSettings> {
        match rule_name {
            LONG_LINE_RULE => self.long_line.as_ref().map(|c| &c.settings),
            UNUSED_FUNCTION_RULE => self.unused_function.as_ref().map(|c| &c.settings),
            _ => None,
        }
    }

    /// Checks if a rule is enabled. Rules are enabled unless switched off.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rule_settings(rule_name)
            .map_or(true, RuleSettings::is_enabled)
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rule_settings(rule_name).and_then(|s| s.severity)
    }

    /// Worker count for per-file checks, if configured and in
    /// `1..=MAX_PARALLELISM`.
    #[must_use]
    pub fn parallelism(&self) -> Option<usize> {
        self.analyzer
            .as_ref()
            .and_then(|a| a.parallelism)
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| (1..=MAX_PARALLELISM).contains(n))
    }

    /// Glob patterns excluded from analysis.
    #[must_use]
    pub fn exclude_patterns(&self) -> Vec<String> {
        self.analyzer
            .as_ref()
            .map(|a| a.excludes.iter().map(|e| e.pattern.clone()).collect())
            .unwrap_or_default()
    }
}

impl FromBound for ConfigTree {
    fn schema() -> &'static ElementSchema {
        &schema::CONFIG
    }

    fn from_bound(element: &BoundElement) -> Self {
        Self {
            fail_on: element.severity("failOn"),
            analyzer: element
                .child(schema::ANALYZER.name)
                .map(AnalyzerSection::from_bound),
            long_line: element
                .child(schema::LONG_LINE.name)
                .map(LongLineConfig::from_bound),
            unused_function: element
                .child(schema::UNUSED_FUNCTION.name)
                .map(UnusedFunctionConfig::from_bound),
            position: element.position,
        }
    }
}

/// `enabled` and `severity`, shared by every rule section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSettings {
    /// Whether this rule is enabled.
    pub enabled: Option<bool>,
    /// Severity override for this rule.
    pub severity: Option<Severity>,
}

impl RuleSettings {
    fn from_bound(element: &BoundElement) -> Self {
        Self {
            enabled: element.boolean("enabled"),
            severity: element.severity("severity"),
        }
    }

    /// Whether the rule runs (default: true).
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// An `<Exclude>` entry with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludeEntry {
    /// Glob pattern.
    pub pattern: String,
    /// Position of the `<Exclude>` element.
    pub position: Option<TextPosition>,
}

impl ExcludeEntry {
    fn from_bound(element: &BoundElement, attribute: &str) -> Self {
        Self {
            pattern: element.text(attribute).unwrap_or_default().to_string(),
            position: element.position,
        }
    }
}

/// `<Analyzer>` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzerSection {
    /// Requested worker count (validated against `1..=MAX_PARALLELISM`).
    pub parallelism: Option<i64>,
    /// Path globs excluded from analysis.
    pub excludes: Vec<ExcludeEntry>,
    /// Position of the `<Analyzer>` element.
    pub position: Option<TextPosition>,
}

impl FromBound for AnalyzerSection {
    fn schema() -> &'static ElementSchema {
        &schema::ANALYZER
    }

    fn from_bound(element: &BoundElement) -> Self {
        Self {
            parallelism: element.integer("parallelism"),
            excludes: element
                .children_named(schema::ANALYZER_EXCLUDE.name)
                .map(|e| ExcludeEntry::from_bound(e, "pattern"))
                .collect(),
            position: element.position,
        }
    }
}

/// `<LongLine>` section.
///
/// The bounds are kept as the literal markup text so that validation can
/// report the offending value verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LongLineConfig {
    /// Shared rule settings.
    pub settings: RuleSettings,
    /// Literal `maxLineLength` value.
    pub max_line_length: Option<String>,
    /// Literal `tabWidth` value.
    pub tab_width: Option<String>,
    /// Position of the `<LongLine>` element.
    pub position: Option<TextPosition>,
}

impl LongLineConfig {
    /// Effective maximum line length.
    #[must_use]
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
            .as_deref()
            .and_then(parse_positive)
            .unwrap_or(DEFAULT_MAX_LINE_LENGTH)
    }

    /// Effective tab width.
    #[must_use]
    pub fn tab_width(&self) -> usize {
        self.tab_width
            .as_deref()
            .and_then(parse_positive)
            .unwrap_or(DEFAULT_TAB_WIDTH)
    }
}

impl FromBound for LongLineConfig {
    fn schema() -> &'static ElementSchema {
        &schema::LONG_LINE
    }

    fn from_bound(element: &BoundElement) -> Self {
        Self {
            settings: RuleSettings::from_bound(element),
            max_line_length: element.text("maxLineLength").map(String::from),
            tab_width: element.text("tabWidth").map(String::from),
            position: element.position,
        }
    }
}

/// `<UnusedFunction>` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnusedFunctionConfig {
    /// Shared rule settings.
    pub settings: RuleSettings,
    /// Also report `pub` functions.
    pub include_public: Option<bool>,
    /// Function-name globs never reported.
    pub excludes: Vec<ExcludeEntry>,
    /// Position of the `<UnusedFunction>` element.
    pub position: Option<TextPosition>,
}

impl FromBound for UnusedFunctionConfig {
    fn schema() -> &'static ElementSchema {
        &schema::UNUSED_FUNCTION
    }

    fn from_bound(element: &BoundElement) -> Self {
        Self {
            settings: RuleSettings::from_bound(element),
            include_public: element.boolean("includePublic"),
            excludes: element
                .children_named(schema::UNUSED_FUNCTION_EXCLUDE.name)
                .map(|e| ExcludeEntry::from_bound(e, "name"))
                .collect(),
            position: element.position,
        }
    }
}

/// Parses a strictly positive integer.
#[must_use]
pub fn parse_positive(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|n| *n > 0)
}
