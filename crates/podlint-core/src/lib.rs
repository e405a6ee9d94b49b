//! # podlint-core
//!
//! Configuration pipeline and rule host for podlint.
//!
//! A run loads one XML configuration document through a fixed pipeline and
//! shares the result with every rule:
//!
//! - [`MarkupParser`] turns raw text into a generic element tree
//! - the [`binder`] checks that tree against a declarative [`schema`] and
//!   builds the typed [`ConfigTree`]
//! - [`validate`](validate::validate) collects semantic [`Issue`]s
//! - [`ConfigCache`] runs all of the above at most once per run
//! - [`DiagnosticMapper`] turns every failure into a 0-based [`Diagnostic`]
//!
//! Rules run in parallel through the [`Analyzer`] and may record cross-file
//! facts in a [`ConcurrentBank`] for a final pass.
//!
//! ## Example
//!
//! ```ignore
//! use podlint_core::{Analyzer, ConfigDocument};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .config_document(ConfigDocument::from_path("podlint.xml"))
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! println!("{}", result.format_report());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod bank;
pub mod binder;
mod cache;
pub mod config;
mod context;
mod diagnostic;
pub mod markup;
mod pod;
mod rule;
pub mod schema;
mod types;
pub mod validate;

/// Utility modules for rule implementations.
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use bank::ConcurrentBank;
pub use binder::BindError;
pub use cache::{CancelFlag, ConfigCache, ConfigLoader, LoadCancelled, MarkupLoader};
pub use config::{ConfigTree, LongLineConfig, RuleSettings, UnusedFunctionConfig};
pub use context::{FileContext, Invocation, RunContext, SymbolBank, SymbolId};
pub use diagnostic::{
    Diagnostic, DiagnosticLocation, DiagnosticMapper, DiagnosticReport, Mappable, CONFIG_CODE,
    CONFIG_RULE,
};
pub use markup::{MarkupElement, MarkupParser, ParseError};
pub use pod::{load_document, ConfigDocument, LoadFailure, LoadOutcome};
pub use rule::{Rule, RuleBox};
pub use types::{LintResult, Location, Severity, TextPosition, Violation};
pub use validate::Issue;
