//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- podlint configuration -->
<config failOn="error">
  <Analyzer>
    <!-- Glob patterns to exclude from analysis -->
    <Exclude pattern="**/target/**"/>
    <Exclude pattern="**/generated/**"/>
  </Analyzer>

  <!-- Tabs count as tabWidth columns -->
  <LongLine maxLineLength="120" tabWidth="4" severity="warning"/>

  <UnusedFunction enabled="true" includePublic="false">
    <!-- Function names never reported -->
    <!-- <Exclude name="handle_*"/> -->
  </UnusedFunction>
</config>
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_default(Path::new("podlint.xml"), force)?;

    println!("Created podlint.xml");
    println!("\nNext steps:");
    println!("  1. Edit podlint.xml to configure rules");
    println!("  2. Run: podlint check-config");
    println!("  3. Run: podlint check");

    Ok(())
}

fn write_default(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use podlint_core::{load_document, ConfigDocument};

    #[test]
    fn default_config_loads_cleanly() {
        let outcome = load_document(&ConfigDocument::from_text("podlint.xml", DEFAULT_CONFIG));
        assert!(outcome.is_clean(), "{outcome:?}");
        assert_eq!(outcome.root_config.exclude_patterns().len(), 2);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("podlint.xml");
        std::fs::write(&path, "<config/>").unwrap();

        assert!(write_default(&path, false).is_err());
        write_default(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
