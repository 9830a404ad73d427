//! The core runner for zlint responsible for the bulk of the linter's work.
//!
//! The crate is not CLI-specific and can be used from any project: it takes
//! a rule store and source code, builds the semantic model, runs the rules
//! and optionally applies fixes. Keeping the low-level linting work apart
//! from `zlint_cli` is what lets the linter facilities be reused.
//!
//! The structures at the core of the crate are the [`Rule`] and
//! [`LintRule`] traits. Rules run on a single file's semantic model and
//! have a couple of restrictions for clarity and speed:
//! - all rules must be [`Send`] and [`Sync`] so files can be linted in
//!   parallel
//! - rules may never rely on the results of other rules; within a file,
//!   hooks run in a fixed order (once, symbols, nodes, lines) but rules do
//!   not observe each other
//! - rules should never make any network or file requests
//!
//! ## Using the runner
//!
//! Build a [`RuleStore`] (usually [`RuleStore::builtins`] plus config
//! overrides), wrap it in a [`Linter`], and call [`lint_source`] per file.
//!
//! ## Fixing
//!
//! [`LintResult::fix`] applies the acceptable fixes from the run and
//! returns the rewritten source plus the diagnostics that remain.

mod context;
mod linter;
mod rule;
mod store;

pub mod autofix;
pub mod rule_prelude;
pub mod rules;
pub mod semantic;
pub mod testing;
pub mod util;
pub mod visit;

pub use crate::context::RuleCtx;
pub use crate::linter::Linter;
pub use crate::rule::{HookSet, LintRule, Rule, RuleCategory, RuleId, RuleLevel};
pub use crate::semantic::{Analysis, BuildFailure, Semantic, SemanticBuilder};
pub use crate::store::{ConfiguredRule, RuleStore};
pub use autofix::{apply_fixes, FixResult};
pub use rules::{get_rule_by_name, get_rule_suggestion};
pub use zlint_errors::{Diagnostic, Fix, FixKind, FixMeta, Severity, Source, Span};

/// The overall outcome of linting a file or a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Warnings,
    Failure,
}

impl Outcome {
    pub fn of<'a>(diagnostics: impl Iterator<Item = &'a Diagnostic>) -> Outcome {
        let mut outcome = Outcome::Success;
        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => return Outcome::Failure,
                Severity::Warning => outcome = Outcome::Warnings,
                Severity::Note => {}
            }
        }
        outcome
    }
}

/// The result of linting one file.
#[derive(Debug)]
pub struct LintResult {
    /// Diagnostics from the parser or the semantic builder; non-empty
    /// means the file was not linted.
    pub parser_diagnostics: Vec<Diagnostic>,
    /// The diagnostics emitted by the rules.
    pub diagnostics: Vec<Diagnostic>,
    /// The model, when the build succeeded.
    pub semantic: Option<Semantic>,
}

impl LintResult {
    pub fn all_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.parser_diagnostics.iter().chain(self.diagnostics.iter())
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::of(self.all_diagnostics())
    }

    /// Apply the acceptable fixes under `profile`. `None` when the file
    /// failed to build (fixing code that did not parse makes it worse).
    pub fn fix(&mut self, profile: FixMeta) -> Option<FixResult> {
        if !self.parser_diagnostics.is_empty() {
            return None;
        }
        let semantic = self.semantic.as_ref()?;
        let diagnostics = std::mem::take(&mut self.diagnostics);
        let result = apply_fixes(semantic.text(), diagnostics, profile);
        Some(result)
    }
}

/// Lint a single source buffer with the given linter.
pub fn lint_source(source: &Source, linter: &Linter) -> LintResult {
    match SemanticBuilder::build(source) {
        Err(failure) => LintResult {
            parser_diagnostics: failure.into_errors(),
            diagnostics: Vec::new(),
            semantic: None,
        },
        Ok(Analysis { semantic, errors }) => {
            let diagnostics = linter.run(&semantic);
            LintResult {
                parser_diagnostics: errors,
                diagnostics,
                semantic: Some(semantic),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{HomelessTry, NoCatchReturn, SuppressedErrors, UnusedDecls};

    fn lint(source: &str, store: RuleStore) -> LintResult {
        lint_source(&Source::anonymous(source), &Linter::new(store))
    }

    fn single(rule: Box<dyn LintRule>, level: RuleLevel) -> RuleStore {
        RuleStore::new().with_rule(rule, level)
    }

    #[test]
    fn homeless_try_reports_exactly_one_error() {
        let result = lint(
            "fn foo() void { _ = try bar(); }",
            single(Box::new(HomelessTry::default()), RuleLevel::Error),
        );
        assert_eq!(result.diagnostics.len(), 1);
        let diagnostic = &result.diagnostics[0];
        assert_eq!(diagnostic.code, "homeless-try");
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.labels.len(), 1);
        assert_eq!(
            diagnostic.help.as_deref(),
            Some("Change the return type to `!void`.")
        );
        // The label sits on the `try` token.
        let source = "fn foo() void { _ = try bar(); }";
        let span = diagnostic.primary_span();
        assert_eq!(&source[span.range()], "try");
        assert_eq!(result.outcome(), Outcome::Failure);
    }

    #[test]
    fn unused_decl_autofix_rewrites_the_file() {
        let source = "const x = 1;\nconst y = 2;\npub const z = x + 1;\n";
        let mut result = lint(
            source,
            single(Box::new(UnusedDecls::default()), RuleLevel::Warning),
        );
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].message.contains("`y`"));

        let fixed = result.fix(FixMeta::DANGEROUS_FIX).unwrap();
        assert!(fixed.did_fix);
        assert_eq!(fixed.source, "const x = 1;\npub const z = x + 1;\n");
        assert!(fixed.unfixed.is_empty());
    }

    #[test]
    fn unused_decl_fix_is_withheld_from_safe_profiles() {
        let source = "const y = 2;\n";
        let mut result = lint(
            source,
            single(Box::new(UnusedDecls::default()), RuleLevel::Warning),
        );
        let fixed = result.fix(FixMeta::SAFE_FIX).unwrap();
        assert!(!fixed.did_fix);
        assert_eq!(fixed.unfixed.len(), 1);
    }

    #[test]
    fn no_catch_return_rewrites_to_try() {
        let source = "fn foo() !void { bar() catch |e| return e; }";
        let mut result = lint(
            source,
            single(Box::new(NoCatchReturn::default()), RuleLevel::Warning),
        );
        assert_eq!(result.diagnostics.len(), 1);
        let fixed = result.fix(FixMeta::SAFE_FIX).unwrap();
        assert!(fixed.did_fix);
        assert_eq!(fixed.source, "fn foo() !void { try bar(); }");
        assert!(fixed.unfixed.is_empty());
    }

    #[test]
    fn multi_statement_catch_gets_no_fix() {
        let source = "fn foo() !void { bar() catch |e| { log(); return e; }; }";
        let mut result = lint(
            source,
            single(Box::new(NoCatchReturn::default()), RuleLevel::Warning),
        );
        assert_eq!(result.diagnostics.len(), 1);
        let fixed = result.fix(FixMeta::SAFE_FIX).unwrap();
        assert!(!fixed.did_fix);
        assert_eq!(fixed.unfixed.len(), 1);
    }

    #[test]
    fn suppressed_errors_label_the_handler() {
        let source = "fn foo() void { risky() catch unreachable; }";
        let result = lint(
            source,
            single(Box::new(SuppressedErrors::default()), RuleLevel::Warning),
        );
        assert_eq!(result.diagnostics.len(), 1);
        let span = result.diagnostics[0].primary_span();
        assert_eq!(&source[span.range()], "unreachable");
    }

    #[test]
    fn writer_suppression_is_whitelisted() {
        let source = "fn foo(w: Writer) void { w.writeAll(\"x\") catch {}; }";
        let result = lint(
            source,
            single(Box::new(SuppressedErrors::default()), RuleLevel::Warning),
        );
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn parse_failures_skip_linting() {
        let result = lint(
            "const = 1;",
            RuleStore::new().builtins(),
        );
        assert!(!result.parser_diagnostics.is_empty());
        assert!(result.diagnostics.is_empty());
        assert!(result.semantic.is_none());
        assert_eq!(result.parser_diagnostics[0].code, "parse");
    }

    #[test]
    fn empty_source_lints_clean() {
        let result = lint("", RuleStore::new().builtins());
        assert!(result.parser_diagnostics.is_empty());
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.outcome(), Outcome::Success);
    }

    #[test]
    fn disabled_rules_never_dispatch() {
        let store = RuleStore::new().with_rule(Box::new(HomelessTry::default()), RuleLevel::Off);
        assert!(store.is_empty());
        let result = lint("fn foo() void { _ = try bar(); }", store);
        assert!(result.diagnostics.is_empty());
    }
}
