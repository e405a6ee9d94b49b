//! Rule to limit the display width of source lines.
//!
//! # Configuration
//!
//! `<LongLine maxLineLength="120" tabWidth="4"/>`. Values that fail
//! validation fall back to the defaults so the rule keeps running.

use podlint_core::config::{DEFAULT_MAX_LINE_LENGTH, DEFAULT_TAB_WIDTH, LONG_LINE_RULE};
use podlint_core::utils::expanded_width;
use podlint_core::{FileContext, Location, Rule, RunContext, Severity, Violation};

/// Rule code for long-line.
pub const CODE: &str = "PL001";

/// Rule name for long-line.
pub const NAME: &str = LONG_LINE_RULE;

/// Flags lines wider than `maxLineLength` columns.
#[derive(Debug, Clone, Default)]
pub struct LongLine;

impl LongLine {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for LongLine {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Limits line width, counting tabs as tabWidth columns"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &FileContext, _ast: &syn::File, run: &RunContext) -> Vec<Violation> {
        let outcome = run.config();
        let (max, tab_width) = outcome
            .root_config
            .long_line
            .as_ref()
            .map_or((DEFAULT_MAX_LINE_LENGTH, DEFAULT_TAB_WIDTH), |c| {
                (c.max_line_length(), c.tab_width())
            });

        ctx.content
            .lines()
            .enumerate()
            .filter_map(|(i, line)| {
                let width = expanded_width(line, tab_width);
                (width > max).then(|| {
                    Violation::new(
                        CODE,
                        NAME,
                        self.default_severity(),
                        Location::new(ctx.path.to_path_buf(), i + 1, max + 1),
                        format!("line is {width} columns wide, maximum is {max}"),
                    )
                })
            })
            .collect()
    }
}
