//! Helpers for rule tests; see the [`rule_tests!`](crate::rule_tests) macro.

use zlint_errors::{Diagnostic, Source};

use crate::linter::Linter;
use crate::rule::{LintRule, Rule, RuleLevel};
use crate::store::RuleStore;

/// Lint `source` with exactly one rule enabled. Rules that default to
/// `off` are promoted to `warning` so their fixtures still dispatch.
pub fn lint_source_with_rule(rule: Box<dyn LintRule>, source: &str) -> Vec<Diagnostic> {
    let level = match rule.default_level() {
        RuleLevel::Off => RuleLevel::Warning,
        level => level,
    };
    let linter = Linter::new(RuleStore::new().with_rule(rule, level));
    let source = Source::anonymous(source);
    let result = crate::lint_source(&source, &linter);
    assert!(
        result.parser_diagnostics.is_empty(),
        "rule fixture failed to parse: {:#?}",
        result.parser_diagnostics
    );
    result.diagnostics
}

pub fn assert_lint_err(rule: Box<dyn LintRule>, source: &str) {
    let name = rule.name();
    let diagnostics = lint_source_with_rule(rule, source);
    assert!(
        !diagnostics.is_empty(),
        "expected `{}` to report a diagnostic for:\n{}",
        name,
        source
    );
}

pub fn assert_lint_ok(rule: Box<dyn LintRule>, source: &str) {
    let name = rule.name();
    let diagnostics = lint_source_with_rule(rule, source);
    assert!(
        diagnostics.is_empty(),
        "expected `{}` to stay quiet for:\n{}\nbut it reported: {:#?}",
        name,
        source,
        diagnostics
    );
}

/// Generate `invalid`/`valid` tests for a rule from err/ok fixtures.
#[macro_export]
macro_rules! rule_tests {
    (
        $rule:expr,
        err: { $($err:expr),* $(,)? },
        ok: { $($ok:expr),* $(,)? }
    ) => {
        #[cfg(test)]
        mod rule_tests {
            use super::*;

            #[test]
            fn invalid() {
                $( $crate::testing::assert_lint_err(Box::new($rule), $err); )*
            }

            #[test]
            fn valid() {
                $( $crate::testing::assert_lint_ok(Box::new($rule), $ok); )*
            }
        }
    };
}
