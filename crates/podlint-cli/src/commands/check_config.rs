//! Check-config command implementation.

use anyhow::Result;
use podlint_core::{ConfigCache, ConfigDocument, DiagnosticMapper, DiagnosticReport};
use std::path::Path;

/// Runs the check-config command.
///
/// Loads the resolved configuration once and renders every problem with its
/// source excerpt. Exits with status 1 if there is any.
pub fn run(config: ConfigDocument) -> Result<()> {
    let Some(path) = config.path().map(Path::to_path_buf) else {
        println!("No configuration file found; defaults apply.");
        return Ok(());
    };

    let cache = ConfigCache::new(config);
    let outcome = cache.load();
    let diagnostics = DiagnosticMapper::diagnostics(&outcome);

    if diagnostics.is_empty() {
        println!("{}: configuration is valid", path.display());
        return Ok(());
    }

    let text = std::fs::read_to_string(&path).unwrap_or_default();
    for diagnostic in &diagnostics {
        let report = miette::Report::new(DiagnosticReport::new(diagnostic, text.clone()));
        eprintln!("{}:{}:{}", path.display(), diagnostic.line + 1, diagnostic.column + 1);
        eprintln!("{report:?}");
    }
    eprintln!("Found {} configuration problem(s)", diagnostics.len());

    std::process::exit(1);
}
