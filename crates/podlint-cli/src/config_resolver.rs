//! Locates the configuration document for a project.
//!
//! The first hit wins: the `--config` path as given, then `podlint.xml` or
//! `.podlint.xml` in the project, then `config.xml` in the user directory
//! (`$PODLINT_CONFIG_DIR`, else `~/.podlint`). With no hit the document is
//! absent and defaults apply.

use podlint_core::ConfigDocument;
use std::path::{Path, PathBuf};
use tracing::debug;

const PROJECT_FILES: [&str; 2] = ["podlint.xml", ".podlint.xml"];

const USER_FILE: &str = "config.xml";

/// Resolves the document to load for `project_dir`.
///
/// An explicit path is returned without checking that it exists; a missing
/// file surfaces later as a config diagnostic.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigDocument {
    resolve_with(project_dir, explicit, user_config_dir().as_deref())
}

fn resolve_with(
    project_dir: &Path,
    explicit: Option<&Path>,
    user_dir: Option<&Path>,
) -> ConfigDocument {
    let found = explicit
        .map(Path::to_path_buf)
        .or_else(|| first_file(PROJECT_FILES.iter().map(|name| project_dir.join(name))))
        .or_else(|| first_file(user_dir.map(|dir| dir.join(USER_FILE))));

    match found {
        Some(path) => {
            debug!("Config document: {}", path.display());
            ConfigDocument::from_path(path)
        }
        None => {
            debug!("No config document, using defaults");
            ConfigDocument::absent()
        }
    }
}

fn first_file(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|p| p.is_file())
}

fn user_config_dir() -> Option<PathBuf> {
    std::env::var_os("PODLINT_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".podlint")))
}
