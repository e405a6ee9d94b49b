//! Rule to find functions that are never called or referenced.
//!
//! Works across files in two phases. During `check`, each file records its
//! function definitions as symbols, its call sites as invocations, and every
//! other use of a name (paths, `use` leaves) as reference symbols. During
//! `finalize`, definitions whose name never appears as a callee or a
//! reference are reported.
//!
//! Matching is by unqualified name, so two functions sharing a name keep each
//! other alive.
//!
//! # Configuration
//!
//! ```xml
//! <UnusedFunction includePublic="false">
//!   <Exclude name="handle_*"/>
//! </UnusedFunction>
//! ```
//!
//! Never reported: `main`, test code, trait impl methods, `pub` items unless
//! `includePublic` is set, and names matching an `Exclude` glob.

use podlint_core::config::UNUSED_FUNCTION_RULE;
use podlint_core::utils::{is_test_item, last_ident};
use podlint_core::{FileContext, Invocation, Location, Rule, RunContext, Severity, SymbolId, Violation};
use std::collections::HashSet;
use syn::punctuated::Punctuated;
use syn::visit::Visit;
use syn::{Expr, ImplItemFn, ItemFn, ItemImpl, ItemMod, Token, Visibility};
use tracing::debug;

/// Rule code for unused-function.
pub const CODE: &str = "PL002";

/// Rule name for unused-function.
pub const NAME: &str = UNUSED_FUNCTION_RULE;

/// Reports free and inherent functions that nothing uses.
#[derive(Debug, Clone, Default)]
pub struct UnusedFunction;

impl UnusedFunction {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for UnusedFunction {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Reports functions that are never called or referenced"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &FileContext, ast: &syn::File, run: &RunContext) -> Vec<Violation> {
        if ctx.is_test {
            return Vec::new();
        }

        let include_public = run
            .config()
            .root_config
            .unused_function
            .as_ref()
            .and_then(|c| c.include_public)
            .unwrap_or(false);

        let mut collector = FactCollector {
            ctx,
            include_public,
            in_trait_impl: false,
            symbols: Vec::new(),
            invocations: Vec::new(),
            references: Vec::new(),
        };
        collector.visit_file(ast);

        let bank = run.bank();
        bank.add_symbols(collector.symbols);
        bank.add_invocations(collector.invocations);
        bank.add_reference_symbols(collector.references);

        Vec::new()
    }

    fn finalize(&self, run: &RunContext) -> Vec<Violation> {
        let outcome = run.config();
        let excludes: Vec<glob::Pattern> = outcome
            .root_config
            .unused_function
            .iter()
            .flat_map(|c| &c.excludes)
            .filter_map(|e| glob::Pattern::new(&e.pattern).ok())
            .collect();

        let bank = run.bank();
        let mut used: HashSet<String> = bank
            .all_invocations()
            .into_iter()
            .map(|i| i.callee)
            .collect();
        used.extend(bank.all_reference_symbols().into_iter().map(|r| r.name));

        let mut unused: Vec<SymbolId> = bank
            .all_symbols()
            .into_iter()
            .filter(|s| !used.contains(&s.name))
            .filter(|s| !excludes.iter().any(|p| p.matches(&s.name)))
            .collect();
        unused.sort_by(|a, b| a.location.cmp(&b.location));
        debug!("{} of {} functions unused", unused.len(), bank.symbol_count());

        unused
            .into_iter()
            .map(|s| {
                Violation::new(
                    CODE,
                    NAME,
                    self.default_severity(),
                    s.location,
                    format!("function `{}` is never used", s.name),
                )
            })
            .collect()
    }
}

struct FactCollector<'a> {
    ctx: &'a FileContext<'a>,
    include_public: bool,
    in_trait_impl: bool,
    symbols: Vec<SymbolId>,
    invocations: Vec<Invocation>,
    references: Vec<SymbolId>,
}

impl FactCollector<'_> {
    fn location(&self, span: proc_macro2::Span) -> Location {
        Location::from_span(self.ctx.path.to_path_buf(), span)
    }

    fn define(&mut self, ident: &syn::Ident, vis: &Visibility) {
        if ident == "main" {
            return;
        }
        if !self.include_public && !matches!(vis, Visibility::Inherited) {
            return;
        }
        self.symbols
            .push(SymbolId::new(ident.to_string(), self.location(ident.span())));
    }

    fn reference(&mut self, path: &syn::Path) {
        if let (Some(name), Some(seg)) = (last_ident(path), path.segments.last()) {
            let location = self.location(seg.ident.span());
            self.references.push(SymbolId::new(name, location));
        }
    }
}

impl<'ast> Visit<'ast> for FactCollector<'_> {
    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        if is_test_item(&node.attrs) {
            return;
        }
        syn::visit::visit_item_mod(self, node);
    }

    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        if is_test_item(&node.attrs) {
            return;
        }
        self.define(&node.sig.ident, &node.vis);
        syn::visit::visit_item_fn(self, node);
    }

    fn visit_item_impl(&mut self, node: &'ast ItemImpl) {
        if is_test_item(&node.attrs) {
            return;
        }
        let was_in_trait_impl = self.in_trait_impl;
        self.in_trait_impl = node.trait_.is_some();
        syn::visit::visit_item_impl(self, node);
        self.in_trait_impl = was_in_trait_impl;
    }

    fn visit_impl_item_fn(&mut self, node: &'ast ImplItemFn) {
        if is_test_item(&node.attrs) {
            return;
        }
        if !self.in_trait_impl {
            self.define(&node.sig.ident, &node.vis);
        }
        syn::visit::visit_impl_item_fn(self, node);
    }

    fn visit_expr_call(&mut self, node: &'ast syn::ExprCall) {
        if let Expr::Path(func) = &*node.func {
            if let Some(seg) = func.path.segments.last() {
                let location = self.location(seg.ident.span());
                self.invocations
                    .push(Invocation::new(seg.ident.to_string(), location));
            }
            for arg in &node.args {
                self.visit_expr(arg);
            }
            return;
        }
        syn::visit::visit_expr_call(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast syn::ExprMethodCall) {
        let location = self.location(node.method.span());
        self.invocations
            .push(Invocation::new(node.method.to_string(), location));
        syn::visit::visit_expr_method_call(self, node);
    }

    fn visit_expr_path(&mut self, node: &'ast syn::ExprPath) {
        self.reference(&node.path);
        syn::visit::visit_expr_path(self, node);
    }

    fn visit_use_name(&mut self, node: &'ast syn::UseName) {
        let location = self.location(node.ident.span());
        self.references
            .push(SymbolId::new(node.ident.to_string(), location));
    }

    fn visit_use_rename(&mut self, node: &'ast syn::UseRename) {
        let location = self.location(node.ident.span());
        self.references
            .push(SymbolId::new(node.ident.to_string(), location));
    }

    // Macro bodies are opaque to syn; most call-like macros take
    // comma-separated expressions.
    fn visit_macro(&mut self, node: &'ast syn::Macro) {
        if let Ok(args) = node.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
            for arg in &args {
                self.visit_expr(arg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podlint_core::ConfigDocument;
    use std::path::Path;

    fn run_files(files: &[(&str, &str)], config: &str) -> Vec<Violation> {
        let run = RunContext::new(ConfigDocument::from_text("podlint.xml", config));
        let rule = UnusedFunction::new();
        for (path, code) in files {
            let ast = syn::parse_file(code).unwrap();
            let ctx = FileContext::new(Path::new(path), code, Path::new("."));
            assert!(rule.check(&ctx, &ast, &run).is_empty());
        }
        rule.finalize(&run)
    }

    fn names(violations: &[Violation]) -> Vec<String> {
        violations
            .iter()
            .map(|v| v.message.split('`').nth(1).unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn reports_uncalled_private_fn() {
        let violations = run_files(
            &[(
                "src/lib.rs",
                "fn used() {}\nfn unused() {}\nfn main() { used(); }\n",
            )],
            "",
        );
        assert_eq!(names(&violations), vec!["unused"]);
        assert_eq!(violations[0].location.line, 2);
        assert_eq!(violations[0].location.column, 4);
        assert_eq!(violations[0].severity, Severity::Warning);
    }

    #[test]
    fn calls_in_other_files_count() {
        let violations = run_files(
            &[
                ("src/a.rs", "fn helper() -> u32 { 1 }\n"),
                ("src/b.rs", "fn main() { let _ = crate::a::helper(); }\n"),
            ],
            "",
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn references_and_method_calls_count() {
        let code = r#"
struct S;
impl S {
    fn method(&self) {}
    fn by_path() {}
}
fn as_value(x: u32) -> u32 { x }
fn in_macro() -> u32 { 2 }
fn main() {
    S.method();
    let f = S::by_path;
    let _ = [1u32].iter().map(|x| as_value(*x));
    println!("{}", in_macro());
    f();
}
"#;
        assert!(run_files(&[("src/main.rs", code)], "").is_empty());
    }

    #[test]
    fn use_leaves_count_as_references() {
        let violations = run_files(
            &[
                ("src/util.rs", "fn exported() {}\n"),
                ("src/lib.rs", "use crate::util::exported as _e;\n"),
            ],
            "",
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn skips_tests_trait_impls_and_pub() {
        let code = r#"
pub fn api() {}
trait T { fn t(&self); }
struct S;
impl T for S { fn t(&self) {} }
#[test]
fn a_test() {}
#[cfg(test)]
mod tests { fn helper() {} }
"#;
        assert!(run_files(&[("src/lib.rs", code)], "").is_empty());
        assert!(run_files(&[("tests/it.rs", "fn orphan() {}\n")], "").is_empty());
    }

    #[test]
    fn include_public_reports_pub_fns() {
        let violations = run_files(
            &[("src/lib.rs", "pub fn api() {}\n")],
            r#"<config><UnusedFunction includePublic="true"/></config>"#,
        );
        assert_eq!(names(&violations), vec!["api"]);
    }

    #[test]
    fn excludes_are_globs() {
        let violations = run_files(
            &[("src/lib.rs", "fn handle_a() {}\nfn handle_b() {}\nfn other() {}\n")],
            r#"<config><UnusedFunction><Exclude name="handle_*"/></UnusedFunction></config>"#,
        );
        assert_eq!(names(&violations), vec!["other"]);
    }

    #[test]
    fn findings_are_ordered_by_location() {
        let violations = run_files(
            &[
                ("src/b.rs", "fn b1() {}\n"),
                ("src/a.rs", "fn a2() {}\nfn a1() {}\n"),
            ],
            "",
        );
        assert_eq!(names(&violations), vec!["a2", "a1", "b1"]);
    }
}
