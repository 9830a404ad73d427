//! The per-file facade rules see.
//!
//! One [`RuleCtx`] is threaded through every hook of every rule for a
//! file. It exposes read access to the semantic model, span and snippet
//! helpers, diagnostic factories pre-tagged with the current rule's name
//! and severity, and the reporting entry points. [`RuleCtx::
//! update_for_rule`] swaps the current rule between dispatches.

use zlint_errors::{Diagnostic, Fix, FixMeta, Severity, Span, Str};
use zlint_syntax::{Ast, NodeId, TokenId, TokenList};

use crate::autofix::FixBuilder;
use crate::rule::{LintRule, Rule, RuleLevel};
use crate::semantic::Semantic;
use crate::util;

pub struct RuleCtx<'a> {
    semantic: &'a Semantic,
    rule_name: &'static str,
    severity: Severity,
    fix_capability: FixMeta,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> RuleCtx<'a> {
    pub fn new(semantic: &'a Semantic) -> Self {
        Self {
            semantic,
            rule_name: "",
            severity: Severity::Warning,
            fix_capability: FixMeta::NONE,
            diagnostics: Vec::new(),
        }
    }

    /// Reset the current rule name, severity and fix capability before
    /// dispatching to `rule`.
    pub fn update_for_rule(&mut self, rule: &dyn LintRule, level: RuleLevel) {
        self.rule_name = rule.name();
        self.severity = level.severity().unwrap_or(Severity::Warning);
        self.fix_capability = rule.fix_capability();
    }

    pub fn semantic(&self) -> &'a Semantic {
        self.semantic
    }

    pub fn ast(&self) -> &'a Ast {
        self.semantic.ast()
    }

    pub fn tokens(&self) -> &'a TokenList {
        self.semantic.tokens()
    }

    pub fn text(&self) -> &'a str {
        self.semantic.text()
    }

    pub fn rule_name(&self) -> &'static str {
        self.rule_name
    }

    // ------------------------------------------------------------------
    // Span and snippet helpers
    // ------------------------------------------------------------------

    pub fn span_of_node(&self, node: NodeId) -> Span {
        self.semantic.node_span(node)
    }

    pub fn span_of_token(&self, token: TokenId) -> Span {
        self.tokens().span(self.text(), token)
    }

    pub fn snippet_of_node(&self, node: NodeId) -> &'a str {
        self.semantic.node_text(node)
    }

    pub fn snippet_of_token(&self, token: TokenId) -> &'a str {
        self.tokens().slice(self.text(), token)
    }

    /// The contiguous `//` comment block directly above `token`, if any,
    /// as one borrowed slice of the source.
    pub fn comments_before(&self, token: TokenId) -> Option<&'a str> {
        let offset = self.tokens().start(token) as usize;
        util::comments_before(self.text(), offset)
    }

    /// The comment block directly above the first token of `node`.
    pub fn comments_before_node(&self, node: NodeId) -> Option<&'a str> {
        util::comments_before(self.text(), self.span_of_node(node).start as usize)
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// A diagnostic pre-tagged with the current rule's name and severity.
    /// Decorate it (labels, help) and hand it to [`RuleCtx::report`].
    pub fn diagnostic(&self, message: impl Into<Str>) -> Diagnostic {
        Diagnostic::new(self.severity, self.rule_name, message.into())
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        let diagnostic = diagnostic.with_source(self.semantic.source().clone());
        self.diagnostics.push(diagnostic);
    }

    /// Report a diagnostic together with a fix produced by `build`.
    ///
    /// A rule that never advertised a fix capability must not fix: in
    /// debug builds that is an invariant violation, in release builds the
    /// fix is dropped and the bare diagnostic reported.
    pub fn report_with_fix(
        &mut self,
        diagnostic: Diagnostic,
        build: impl FnOnce(&FixBuilder<'_>) -> Fix,
    ) {
        if self.fix_capability.is_none() {
            debug_assert!(
                false,
                "rule `{}` produced a fix without advertising a fix capability",
                self.rule_name
            );
            log::warn!(
                "dropping fix from rule `{}`: no advertised fix capability",
                self.rule_name
            );
            self.report(diagnostic);
            return;
        }
        let builder = FixBuilder::new(self.semantic, self.fix_capability);
        let fix = build(&builder);
        self.report(diagnostic.with_fix(fix));
    }
}
