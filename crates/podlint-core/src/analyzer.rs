//! Core analyzer for orchestrating lint execution.

use crate::cache::{CancelFlag, LoadCancelled};
use crate::config::MAX_PARALLELISM;
use crate::context::{FileContext, RunContext};
use crate::diagnostic::{Diagnostic, DiagnosticMapper};
use crate::pod::{ConfigDocument, LoadOutcome};
use crate::rule::{Rule, RuleBox};
use crate::types::{LintResult, Violation};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing Rust source file.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// The worker pool could not be started.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The run was cancelled.
    #[error("Analysis cancelled")]
    Cancelled(#[from] LoadCancelled),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config_document: ConfigDocument,
    parallelism: Option<usize>,
    cancel: CancelFlag,
    fail_on_parse_error: bool,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration document loaded at the start of each run.
    #[must_use]
    pub fn config_document(mut self, document: ConfigDocument) -> Self {
        self.config_document = document;
        self
    }

    /// Sets the worker count, overriding `<Analyzer parallelism>`.
    /// Capped at [`MAX_PARALLELISM`]; zero leaves the choice to the config.
    #[must_use]
    pub fn parallelism(mut self, workers: usize) -> Self {
        self.parallelism = Some(workers)
            .filter(|n| *n > 0)
            .map(|n| n.min(MAX_PARALLELISM));
        self
    }

    /// Shares a cancellation signal with the caller.
    #[must_use]
    pub fn cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sets whether to fail on parse errors (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        if exclude_patterns.is_empty() {
            exclude_patterns.push("**/target/**".to_string());
        }

        Ok(Analyzer {
            root,
            rules: self.rules,
            exclude_patterns,
            config_document: self.config_document,
            parallelism: self.parallelism,
            cancel: self.cancel,
            fail_on_parse_error: self.fail_on_parse_error,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Each call to [`Analyzer::analyze`] is one run: it gets a fresh
/// [`RunContext`], loads the configuration once, checks every file in
/// parallel, then finalizes every rule.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config_document: ConfigDocument,
    parallelism: Option<usize>,
    cancel: CancelFlag,
    fail_on_parse_error: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the run's cancellation signal.
    #[must_use]
    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Analyzes all files and returns the results.
    ///
    /// Configuration problems are reported as diagnostics and never stop the
    /// run; rules fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails, the worker pool cannot be
    /// started, the run is cancelled, or a file fails to parse while
    /// `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let run = RunContext::new(self.config_document.clone()).with_cancel_flag(self.cancel.clone());
        let outcome = run.try_config()?;

        let mut result = LintResult::new();
        result.fail_on = outcome.root_config.fail_on();
        result.diagnostics = DiagnosticMapper::diagnostics(&outcome);
        if !result.diagnostics.is_empty() {
            warn!("Config has {} problem(s)", result.diagnostics.len());
        }

        let files = self.discover_files(&outcome)?;
        info!("Found {} files to analyze", files.len());

        let workers = self
            .parallelism
            .or_else(|| outcome.root_config.parallelism())
            .unwrap_or(0);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
        debug!("Checking files on {} worker(s)", pool.current_num_threads());

        let per_file: Vec<Result<Vec<Violation>, AnalyzerError>> = pool.install(|| {
            files
                .par_iter()
                .map(|path| self.analyze_file(path, &run, &outcome))
                .collect()
        });

        if run.is_cancelled() {
            warn!("Analysis cancelled after file checks");
            return Err(LoadCancelled.into());
        }

        let mut violations = Vec::new();
        for file_result in per_file {
            match file_result {
                Ok(file_violations) => {
                    violations.extend(file_violations);
                    result.files_checked += 1;
                }
                Err(AnalyzerError::Parse { path, message }) => {
                    warn!("Failed to parse {}: {}", path.display(), message);
                    if self.fail_on_parse_error {
                        return Err(AnalyzerError::Parse { path, message });
                    }
                }
                Err(e) => return Err(e),
            }
        }

        // Every check has joined; the bank is complete.
        for rule in self.enabled_rules(&outcome) {
            let found = rule.finalize(&run);
            violations.extend(Self::apply_severity_override(&outcome, rule.name(), found));
        }

        let mut findings: Vec<Diagnostic> = violations
            .iter()
            .map(DiagnosticMapper::map_violation)
            .collect();
        findings.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then(a.line.cmp(&b.line))
                .then(a.column.cmp(&b.column))
        });
        result.diagnostics.extend(findings);

        info!(
            "Analysis complete: {} diagnostics in {} files",
            result.diagnostics.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Analyzes a single file and returns violations.
    fn analyze_file(
        &self,
        path: &Path,
        run: &RunContext,
        outcome: &LoadOutcome,
    ) -> Result<Vec<Violation>, AnalyzerError> {
        if run.is_cancelled() {
            return Ok(Vec::new());
        }
        debug!("Analyzing: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let ast = syn::parse_file(&content).map_err(|e| AnalyzerError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let ctx = FileContext::new(path, &content, &self.root);
        let mut violations = Vec::new();

        for rule in self.enabled_rules(outcome) {
            let rule_violations = rule.check(&ctx, &ast, run);
            violations.extend(Self::apply_severity_override(
                outcome,
                rule.name(),
                rule_violations,
            ));
        }

        Ok(violations)
    }

    fn enabled_rules<'a>(&'a self, outcome: &'a LoadOutcome) -> impl Iterator<Item = &'a RuleBox> {
        self.rules.iter().filter(move |rule| {
            let enabled = outcome.root_config.is_rule_enabled(rule.name());
            if !enabled {
                debug!("Skipping disabled rule: {}", rule.name());
            }
            enabled
        })
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        outcome: &LoadOutcome,
        rule_name: &str,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = outcome.root_config.rule_severity(rule_name) {
            for v in &mut violations {
                v.severity = severity;
            }
        }
        violations
    }

    /// Discovers all Rust source files to analyze.
    fn discover_files(&self, outcome: &LoadOutcome) -> Result<Vec<PathBuf>, AnalyzerError> {
        let excludes = self.compile_excludes(outcome);
        let pattern = format!("{}/**/*.rs", self.root.display());
        let mut files = Vec::new();

        for entry in glob::glob(&pattern)? {
            let path = entry.map_err(|e| AnalyzerError::Io(e.into()))?;

            if Self::should_exclude(&excludes, &path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path);
        }

        Ok(files)
    }

    /// Builder excludes plus `<Analyzer><Exclude>` entries. Patterns that do
    /// not compile are skipped; the validator has already reported them.
    fn compile_excludes(&self, outcome: &LoadOutcome) -> Vec<glob::Pattern> {
        self.exclude_patterns
            .iter()
            .cloned()
            .chain(outcome.root_config.exclude_patterns())
            .filter_map(|p| glob::Pattern::new(&p).ok())
            .collect()
    }

    /// Checks if a path should be excluded.
    fn should_exclude(excludes: &[glob::Pattern], path: &Path) -> bool {
        excludes.iter().any(|p| p.matches_path(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let analyzer = Analyzer::builder()
            .root(".")
            .exclude("**/target/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.root().exists());
        assert_eq!(analyzer.rule_count(), 0);
    }

    #[test]
    fn test_exclude_patterns() {
        let analyzer = Analyzer::builder()
            .root(".")
            .exclude("**/vendor/**")
            .build()
            .expect("Failed to build analyzer");
        let outcome = crate::pod::load_document(&ConfigDocument::from_text(
            "podlint.xml",
            r#"<config><Analyzer><Exclude pattern="**/generated/**"/></Analyzer></config>"#,
        ));
        let excludes = analyzer.compile_excludes(&outcome);

        assert!(Analyzer::should_exclude(&excludes, Path::new("/foo/vendor/lib.rs")));
        assert!(Analyzer::should_exclude(&excludes, Path::new("/foo/generated/a.rs")));
        assert!(!Analyzer::should_exclude(&excludes, Path::new("/foo/src/lib.rs")));
    }

    #[test]
    fn test_zero_parallelism_is_ignored() {
        let analyzer = Analyzer::builder().parallelism(0).build().unwrap();
        assert_eq!(analyzer.parallelism, None);
    }

    #[test]
    fn test_parallelism_is_capped() {
        let analyzer = Analyzer::builder().parallelism(1_000_000).build().unwrap();
        assert_eq!(analyzer.parallelism, Some(MAX_PARALLELISM));
    }
}
