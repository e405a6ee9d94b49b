//! # podlint-rules
//!
//! Built-in lint rules for podlint.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | PL001 | `long-line` | Limits line width, counting tabs as `tabWidth` columns |
//! | PL002 | `unused-function` | Reports functions that are never called or referenced |
//!
//! Both rules read their settings from the run's configuration.
//!
//! ## Usage
//!
//! ```ignore
//! use podlint_core::Analyzer;
//! use podlint_rules::{LongLine, UnusedFunction};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .rule(LongLine::new())
//!     .rule(UnusedFunction::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod long_line;
mod unused_function;

pub use long_line::LongLine;
pub use unused_function::UnusedFunction;

use podlint_core::RuleBox;

/// Re-export core types for convenience.
pub use podlint_core::{Rule, Severity, Violation};

/// Returns every built-in rule.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![Box::new(LongLine::new()), Box::new(UnusedFunction::new())]
}
