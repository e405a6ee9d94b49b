//! Check command implementation.

use anyhow::{Context, Result};
use podlint_core::{Analyzer, ConfigDocument, RuleBox};
use podlint_rules::all_rules;
use std::path::Path;

use crate::OutputFormat;

/// Command-line options for `check`.
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated rule names or codes.
    pub rules: Option<String>,
    /// Extra exclude globs.
    pub exclude: Vec<String>,
    /// Worker thread override.
    pub jobs: Option<usize>,
}

/// Runs the check command.
pub fn run(path: &Path, options: CheckOptions, config: ConfigDocument) -> Result<()> {
    let mut builder = Analyzer::builder()
        .root(path)
        .config_document(config)
        .excludes(options.exclude);

    if let Some(jobs) = options.jobs {
        builder = builder.parallelism(jobs);
    }

    let rules_to_add = match options.rules {
        Some(filter) => {
            let names: Vec<&str> = filter.split(',').map(str::trim).collect();
            filter_rules(&names)
        }
        None => all_rules(),
    };

    for rule in rules_to_add {
        builder = builder.rule_box(rule);
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!("Analyzing {:?} with {} rules", path, analyzer.rule_count());

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, options.format)?;

    if result.is_failure() {
        std::process::exit(1);
    }

    Ok(())
}

/// Selects built-in rules by name or code.
fn filter_rules(names: &[&str]) -> Vec<RuleBox> {
    let mut selected = Vec::new();
    let mut available = all_rules();

    for name in names {
        match available
            .iter()
            .position(|r| r.name() == *name || r.code() == *name)
        {
            Some(index) => selected.push(available.swap_remove(index)),
            None => tracing::warn!("Unknown rule: {}", name),
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_by_name_or_code() {
        let rules = filter_rules(&["long-line", "PL002", "nope"]);
        let codes: Vec<_> = rules.iter().map(|r| r.code()).collect();
        assert_eq!(codes, vec!["PL001", "PL002"]);
    }

    #[test]
    fn duplicates_select_once() {
        assert_eq!(filter_rules(&["long-line", "PL001"]).len(), 1);
    }
}
