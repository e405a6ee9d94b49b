//! The rule trait.

use crate::context::{FileContext, RunContext};
use crate::types::{Severity, Violation};

/// A lint rule based on `syn` AST analysis.
///
/// [`check`](Rule::check) runs once per file, possibly on many threads at
/// once. Rules that need facts from every file record them in the run's
/// [`SymbolBank`](crate::SymbolBank) during `check` and report from
/// [`finalize`](Rule::finalize), which runs after all checks have finished.
///
/// # Example
///
/// ```ignore
/// use podlint_core::{FileContext, Rule, RunContext, Violation};
///
/// pub struct NoTodoComments;
///
/// impl Rule for NoTodoComments {
///     fn name(&self) -> &'static str { "no-todo-comments" }
///     fn code(&self) -> &'static str { "PL099" }
///
///     fn check(&self, ctx: &FileContext, ast: &syn::File, run: &RunContext) -> Vec<Violation> {
///         let mut visitor = TodoVisitor::new(ctx);
///         visitor.visit_file(ast);
///         visitor.violations
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "long-line").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "PL001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Checks a single file and returns any violations found.
    fn check(&self, ctx: &FileContext, ast: &syn::File, run: &RunContext) -> Vec<Violation>;

    /// Reports findings that need every file. Called once per run, after
    /// every [`check`](Rule::check) has returned.
    fn finalize(&self, _run: &RunContext) -> Vec<Violation> {
        Vec::new()
    }
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
