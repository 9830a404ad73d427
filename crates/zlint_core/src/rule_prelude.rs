//! Everything a rule implementation needs, in one import.

pub use crate::autofix::FixBuilder;
pub use crate::context::RuleCtx;
pub use crate::rule::{HookSet, LintRule, Rule, RuleCategory, RuleId, RuleLevel};
pub use crate::semantic::{
    RefFlags, Reference, Scope, ScopeFlags, ScopeId, Semantic, Symbol, SymbolFlags, SymbolId,
    Visibility,
};
pub use crate::{declare_lint, rule_tests};

pub use zlint_errors::file::Line;
pub use zlint_errors::{Diagnostic, Fix, FixKind, FixMeta, Severity, Span};
pub use zlint_syntax::{full, Ast, NodeId, Tag, TokenId, TokenList, TokenTag};
