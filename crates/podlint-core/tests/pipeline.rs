//! Integration test: configuration document → cached outcome → diagnostics.
//!
//! Exercises the public pipeline the way the analyzer and the CLI use it.

use podlint_core::{
    ConcurrentBank, ConfigCache, ConfigDocument, ConfigTree, DiagnosticMapper, LoadFailure,
    MarkupParser, Severity,
};
use std::io::Write;
use std::sync::{Arc, Barrier};
use std::thread;

fn cache_for(text: &str) -> ConfigCache {
    ConfigCache::new(ConfigDocument::from_text("podlint.xml", text))
}

// ── Defaults ──

#[test]
fn no_document_yields_defaults_every_time() {
    let first = ConfigCache::new(ConfigDocument::absent()).load();
    let second = ConfigCache::new(ConfigDocument::absent()).load();

    assert_eq!(first.root_config, ConfigTree::default());
    assert!(first.issues.is_empty());
    assert!(first.failure.is_none());
    assert_eq!(*first, *second);
    assert!(DiagnosticMapper::diagnostics(&first).is_empty());
}

// ── Determinism ──

#[test]
fn pipeline_is_deterministic_and_order_stable() {
    let text = r#"<config>
  <UnusedFunction>
    <Exclude name="[bad"/>
  </UnusedFunction>
  <LongLine maxLineLength="wide" tabWidth="-1"/>
  <Analyzer parallelism="0"/>
</config>"#;

    let a = cache_for(text).load();
    let b = cache_for(text).load();
    assert_eq!(a.issues, b.issues);

    let lines: Vec<usize> = a.issues.iter().map(|i| i.line).collect();
    let mut sorted = lines.clone();
    sorted.sort_unstable();
    assert_eq!(lines, sorted);
    assert_eq!(a.issues.len(), 4);
}

// ── Failures map to exactly one diagnostic ──

#[test]
fn unterminated_root_is_one_parse_diagnostic() {
    let parser_error = MarkupParser::parse("<config>").unwrap_err();
    let outcome = cache_for("<config>").load();

    assert!(matches!(outcome.failure, Some(LoadFailure::Parse(_))));
    let diagnostics = DiagnosticMapper::diagnostics(&outcome);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].line, parser_error.line - 1);
    assert_eq!(diagnostics[0].column, parser_error.column - 1);
}

#[test]
fn non_numeric_bound_is_one_diagnostic() {
    let outcome = cache_for(r#"<config><LongLine maxLineLength="a"/></config>"#).load();
    let diagnostics = DiagnosticMapper::diagnostics(&outcome);

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("maxLineLength"));
    assert!(diagnostics[0].message.contains("\"a\""));
    assert_eq!(diagnostics[0].severity, Severity::Error);
}

#[test]
fn schema_mismatch_is_one_bind_diagnostic() {
    let outcome = cache_for(
        r#"<config>
  <LongLine maxLineLength="a" color="red"/>
</config>"#,
    )
    .load();

    assert!(matches!(outcome.failure, Some(LoadFailure::Bind(_))));
    assert!(outcome.issues.is_empty());
    assert_eq!(outcome.root_config, ConfigTree::default());

    let diagnostics = DiagnosticMapper::diagnostics(&outcome);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (1, 2));
    assert!(diagnostics[0].message.contains("color"));
}

#[test]
fn repeated_section_is_one_positioned_diagnostic() {
    let outcome = cache_for(
        "<config>\n<LongLine maxLineLength=\"80\"/>\n<LongLine maxLineLength=\"b\"/>\n</config>",
    )
    .load();

    assert!(matches!(outcome.failure, Some(LoadFailure::Bind(_))));
    let diagnostics = DiagnosticMapper::diagnostics(&outcome);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (2, 0));
    assert!(diagnostics[0].message.contains("duplicate element <LongLine>"));
}

#[test]
fn unreadable_file_reaches_the_user_as_a_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = ConfigCache::new(ConfigDocument::from_path(dir.path().join("nope.xml"))).load();

    let diagnostics = DiagnosticMapper::diagnostics(&outcome);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (0, 0));
    assert!(diagnostics[0].message.contains("nope.xml"));
}

#[test]
fn file_on_disk_round_trips_through_the_cache() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"<config failOn="warning">
  <Analyzer parallelism="3"/>
  <LongLine maxLineLength="100" tabWidth="4" severity="warning"/>
</config>"#
    )
    .unwrap();

    let outcome = ConfigCache::new(ConfigDocument::from_path(file.path())).load();
    assert!(outcome.is_clean());
    assert_eq!(outcome.source_path.as_deref(), Some(file.path()));
    assert_eq!(outcome.root_config.fail_on(), Severity::Warning);
    assert_eq!(outcome.root_config.parallelism(), Some(3));
}

// ── Compute-once under contention ──

#[test]
fn twenty_callers_one_outcome() {
    let cache = cache_for(r#"<config><LongLine maxLineLength="80"/></config>"#);
    let barrier = Barrier::new(20);

    let outcomes: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..20)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    cache.load()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(cache.load_count(), 1);
    assert!(outcomes.iter().all(|o| Arc::ptr_eq(o, &outcomes[0])));
}

// ── Bank ──

#[test]
fn fifty_writers_thousand_symbols_each() {
    let bank: ConcurrentBank<(usize, usize), (), String> = ConcurrentBank::new();

    thread::scope(|s| {
        for writer in 0..50 {
            let bank = &bank;
            s.spawn(move || {
                for i in 0..1000 {
                    bank.add_symbols([(writer, i)]);
                }
            });
        }
    });

    assert_eq!(bank.all_symbols().len(), 50_000);
}

#[test]
fn fifty_writers_one_batch_each() {
    let bank: ConcurrentBank<usize, (), String> = ConcurrentBank::new();

    thread::scope(|s| {
        for writer in 0..50 {
            let bank = &bank;
            s.spawn(move || bank.add_symbols(writer * 1000..(writer + 1) * 1000));
        }
    });

    let symbols = bank.all_symbols();
    assert_eq!(symbols.len(), 50_000);
    assert!((0..50_000).all(|n| symbols.contains(&n)));
}
