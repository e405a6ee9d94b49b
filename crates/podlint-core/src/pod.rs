//! Config documents and the outcome of loading one.

use crate::binder::BindError;
use crate::config::ConfigTree;
use crate::markup::{MarkupParser, ParseError};
use crate::validate::{validate, Issue};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A configuration document to load.
///
/// A document without a path stands for "no configuration": loading it
/// yields the default tree and no issues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    path: Option<PathBuf>,
    text: Option<String>,
}

impl ConfigDocument {
    /// No configuration document.
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    /// A document read from `path` when it is first loaded.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            text: None,
        }
    }

    /// A document whose text is already in memory.
    #[must_use]
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            text: Some(text.into()),
        }
    }

    /// Path of the document, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read(&self, path: &Path) -> Result<Cow<'_, str>, ParseError> {
        if let Some(text) = &self.text {
            return Ok(Cow::Borrowed(text));
        }
        std::fs::read_to_string(path)
            .map(Cow::Owned)
            .map_err(|e| ParseError {
                line: 1,
                column: 1,
                message: format!("failed to read {}: {e}", path.display()),
            })
    }
}

/// Structural failure that stopped a load before validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadFailure {
    /// The document could not be read or is malformed.
    #[error("{0}")]
    Parse(#[from] ParseError),
    /// The document does not match the schema.
    #[error("{0}")]
    Bind(#[from] BindError),
}

/// The result of loading a configuration document once for a run.
///
/// When `failure` is set, `root_config` holds the defaults and `issues` is
/// empty. Otherwise `root_config` is the bound tree and `issues` lists every
/// validation failure found in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Typed configuration consumed by rules.
    pub root_config: ConfigTree,
    /// Path of the loaded document.
    pub source_path: Option<PathBuf>,
    /// Parse or bind failure, if loading stopped early.
    pub failure: Option<LoadFailure>,
    /// Validation issues, in document order.
    pub issues: Vec<Issue>,
}

impl LoadOutcome {
    /// Default configuration for a document at `source_path` (or none).
    #[must_use]
    pub fn defaults(source_path: Option<PathBuf>) -> Self {
        Self {
            source_path,
            ..Self::default()
        }
    }

    fn failed(source_path: PathBuf, failure: LoadFailure) -> Self {
        Self {
            source_path: Some(source_path),
            failure: Some(failure),
            ..Self::default()
        }
    }

    /// Returns true if the document loaded without failures or issues.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failure.is_none() && self.issues.is_empty()
    }
}

/// Runs parse → bind → validate for `doc`.
///
/// Parse and bind failures stop the load; validation issues are all
/// collected. A document without a path, or with blank text, yields the
/// defaults without invoking the parser.
#[must_use]
pub fn load_document(doc: &ConfigDocument) -> LoadOutcome {
    let Some(path) = doc.path() else {
        debug!("No config document, using defaults");
        return LoadOutcome::defaults(None);
    };

    let text = match doc.read(path) {
        Ok(text) => text,
        Err(e) => return LoadOutcome::failed(path.to_path_buf(), e.into()),
    };
    if text.trim().is_empty() {
        debug!("Config {} is empty, using defaults", path.display());
        return LoadOutcome::defaults(Some(path.to_path_buf()));
    }

    let markup = match MarkupParser::parse(&text) {
        Ok(markup) => markup,
        Err(e) => return LoadOutcome::failed(path.to_path_buf(), e.into()),
    };
    let root_config = match ConfigTree::bind(&markup) {
        Ok(tree) => tree,
        Err(e) => return LoadOutcome::failed(path.to_path_buf(), e.into()),
    };
    let issues = validate(&root_config);

    LoadOutcome {
        root_config,
        source_path: Some(path.to_path_buf()),
        failure: None,
        issues,
    }
}
