//! Shared output formatting for lint results.

use anyhow::Result;
use podlint_core::{LintResult, Severity};

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    let (errors, warnings) = result.count_by_severity();

    for diagnostic in &result.diagnostics {
        let severity_indicator = match diagnostic.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
        };

        let location = diagnostic.path.as_ref().map_or_else(
            || "<no location>".to_string(),
            |p| format!("{}:{}:{}", p.display(), diagnostic.line + 1, diagnostic.column + 1),
        );
        println!("{} {} at {}", diagnostic.code, diagnostic.rule, location);
        println!("  {}: {}", severity_indicator, diagnostic.message);
        println!();
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, result.files_checked
    );
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for diagnostic in &result.diagnostics {
        println!("{diagnostic}");
    }
}
