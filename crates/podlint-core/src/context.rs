//! Context types for rule execution.

use crate::bank::ConcurrentBank;
use crate::cache::{CancelFlag, ConfigCache, LoadCancelled};
use crate::pod::{ConfigDocument, LoadOutcome};
use crate::types::Location;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Context provided to per-file rules.
///
/// Contains metadata about the file being analyzed that rules can use
/// to make context-aware decisions (e.g., skip checks in test files).
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Path to the file, as discovered.
    pub path: &'a Path,
    /// File contents as a string.
    pub content: &'a str,
    /// Whether this file is detected as a test file.
    pub is_test: bool,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);

        Self {
            path,
            content,
            is_test: Self::detect_test_file(&relative_path),
            relative_path,
        }
    }

    /// Detects if a file is a test file based on path conventions.
    fn detect_test_file(path: &Path) -> bool {
        let in_test_dir = path.components().any(|c| match c {
            std::path::Component::Normal(s) => {
                matches!(s.to_str(), Some("tests" | "benches"))
            }
            _ => false,
        });
        if in_test_dir {
            return true;
        }

        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.ends_with("_test.rs") || name == "tests.rs")
    }
}

/// A named definition recorded in the [`SymbolBank`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId {
    /// Unqualified name.
    pub name: String,
    /// Where the name appears.
    pub location: Location,
}

impl SymbolId {
    /// Creates a symbol.
    #[must_use]
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

/// A call site recorded in the [`SymbolBank`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Invocation {
    /// Unqualified name of the callee.
    pub callee: String,
    /// Location of the call.
    pub location: Location,
}

impl Invocation {
    /// Creates an invocation.
    #[must_use]
    pub fn new(callee: impl Into<String>, location: Location) -> Self {
        Self {
            callee: callee.into(),
            location,
        }
    }
}

/// Cross-file facts gathered by rules: definitions, calls and references.
pub type SymbolBank = ConcurrentBank<SymbolId, Invocation, SymbolId>;

/// State shared by every rule for the duration of one analysis run.
///
/// Owns the run's configuration cache and symbol bank. Dropping the context
/// discards both.
#[derive(Debug)]
pub struct RunContext {
    cache: ConfigCache,
    bank: SymbolBank,
    cancel: CancelFlag,
}

impl RunContext {
    /// Creates a run that loads `document` through the markup pipeline.
    #[must_use]
    pub fn new(document: ConfigDocument) -> Self {
        Self::with_cache(ConfigCache::new(document))
    }

    /// Creates a run around an existing cache.
    #[must_use]
    pub fn with_cache(cache: ConfigCache) -> Self {
        Self {
            cache,
            bank: SymbolBank::new(),
            cancel: CancelFlag::new(),
        }
    }

    /// Uses `cancel` as this run's cancellation signal.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// The run's configuration, loaded on first use.
    #[must_use]
    pub fn config(&self) -> Arc<LoadOutcome> {
        self.cache.load()
    }

    /// The run's configuration, unless the run was cancelled before it
    /// loaded.
    ///
    /// # Errors
    ///
    /// Returns [`LoadCancelled`] if the run was cancelled first.
    pub fn try_config(&self) -> Result<Arc<LoadOutcome>, LoadCancelled> {
        self.cache.try_load(&self.cancel)
    }

    /// The run's configuration cache.
    #[must_use]
    pub fn cache(&self) -> &ConfigCache {
        &self.cache
    }

    /// The run's symbol bank.
    #[must_use]
    pub fn bank(&self) -> &SymbolBank {
        &self.bank
    }

    /// The run's cancellation signal.
    #[must_use]
    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Returns true if the run has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
