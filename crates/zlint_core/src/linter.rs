//! The per-file rule driver.
//!
//! Hooks run in a fixed order: `run_once`, then `run_on_symbol` over the
//! symbol table in insertion order, then `run_on_node` over one AST walk in
//! source order, then `run_on_line` over the lines of the file. A panic in
//! one rule's hook is contained to that rule × that dispatch: it is logged
//! with the rule name and the offending node, and the run continues.

use std::panic::{catch_unwind, AssertUnwindSafe};

use zlint_errors::file::lines;
use zlint_errors::Diagnostic;
use zlint_syntax::{Ast, NodeId};

use crate::context::RuleCtx;
use crate::rule::{HookSet, Rule};
use crate::semantic::Semantic;
use crate::store::{ConfiguredRule, RuleStore};
use crate::visit::{Visitor, Walker};

pub struct Linter {
    store: RuleStore,
}

impl Linter {
    pub fn new(store: RuleStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    /// Run every enabled rule over one file's semantic model.
    pub fn run(&self, semantic: &Semantic) -> Vec<Diagnostic> {
        let mut ctx = RuleCtx::new(semantic);

        for entry in self.filtered(HookSet::ONCE) {
            ctx.update_for_rule(&*entry.rule, entry.level);
            guard(entry, None, || {
                entry.rule.run_once(&mut ctx);
            });
        }

        let symbol_rules = self.filtered(HookSet::SYMBOL);
        if !symbol_rules.is_empty() {
            for symbol in semantic.symbols().ids() {
                for entry in &symbol_rules {
                    ctx.update_for_rule(&*entry.rule, entry.level);
                    guard(entry, None, || {
                        entry.rule.run_on_symbol(symbol, &mut ctx);
                    });
                }
            }
        }

        let node_rules = self.filtered(HookSet::NODE);
        if !node_rules.is_empty() {
            let mut dispatch = NodeDispatch {
                ctx,
                rules: node_rules,
            };
            Walker::new(semantic.ast(), semantic.tokens()).walk(&mut dispatch);
            ctx = dispatch.ctx;
        }

        let line_rules = self.filtered(HookSet::LINE);
        if !line_rules.is_empty() {
            for line in lines(semantic.text()) {
                for entry in &line_rules {
                    ctx.update_for_rule(&*entry.rule, entry.level);
                    guard(entry, None, || {
                        entry.rule.run_on_line(&line, &mut ctx);
                    });
                }
            }
        }

        ctx.diagnostics
    }

    fn filtered(&self, hook: HookSet) -> Vec<&ConfiguredRule> {
        self.store
            .iter()
            .filter(|entry| entry.rule.hooks().contains(hook))
            .collect()
    }
}

struct NodeDispatch<'a, 'sem> {
    ctx: RuleCtx<'sem>,
    rules: Vec<&'a ConfiguredRule>,
}

impl<'a, 'sem> Visitor for NodeDispatch<'a, 'sem> {
    fn enter_node(&mut self, node: NodeId, _ast: &Ast) {
        let ctx = &mut self.ctx;
        for entry in &self.rules {
            ctx.update_for_rule(&*entry.rule, entry.level);
            guard(entry, Some(node), || {
                entry.rule.run_on_node(node, &mut *ctx);
            });
        }
    }
}

/// Contain a rule fault to one rule × one dispatch.
fn guard(entry: &ConfiguredRule, node: Option<NodeId>, dispatch: impl FnOnce()) {
    if let Err(panic) = catch_unwind(AssertUnwindSafe(dispatch)) {
        let description = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        match node {
            Some(node) => log::warn!(
                "rule `{}` failed on node {}: {}",
                entry.rule.name(),
                node,
                description
            ),
            None => log::warn!("rule `{}` failed: {}", entry.rule.name(), description),
        }
    }
}

#[cfg(test)]
mod tests {
    use zlint_errors::file::Line;
    use zlint_errors::Source;

    use crate::rule_prelude::*;
    use crate::semantic::SemanticBuilder;
    use crate::store::RuleStore;
    use crate::Linter;

    declare_lint! {
        /**
        Internal test rule exercising every hook.
        */
        EveryHook,
        Restriction,
        Warning,
        NONE,
        "every-hook",
        hooks: [ONCE, SYMBOL, NODE, LINE]
    }

    #[typetag::serde]
    impl LintRule for EveryHook {
        fn run_once(&self, ctx: &mut RuleCtx<'_>) -> Option<()> {
            ctx.report(ctx.diagnostic("once"));
            Some(())
        }

        fn run_on_symbol(&self, _symbol: SymbolId, ctx: &mut RuleCtx<'_>) -> Option<()> {
            ctx.report(ctx.diagnostic("symbol"));
            Some(())
        }

        fn run_on_node(&self, node: NodeId, ctx: &mut RuleCtx<'_>) -> Option<()> {
            if ctx.ast().tag(node) == Tag::Identifier {
                ctx.report(ctx.diagnostic("node"));
            }
            Some(())
        }

        fn run_on_line(&self, _line: &Line<'_>, ctx: &mut RuleCtx<'_>) -> Option<()> {
            ctx.report(ctx.diagnostic("line"));
            Some(())
        }
    }

    declare_lint! {
        /**
        Internal test rule that panics on every node.
        */
        FaultyRule,
        Restriction,
        Warning,
        NONE,
        "faulty-rule",
        hooks: [NODE]
    }

    #[typetag::serde]
    impl LintRule for FaultyRule {
        fn run_on_node(&self, _node: NodeId, _ctx: &mut RuleCtx<'_>) -> Option<()> {
            panic!("intentional test fault");
        }
    }

    fn semantic_for(source: &str) -> crate::Semantic {
        SemanticBuilder::build(&Source::anonymous(source))
            .expect("fixture must build")
            .semantic
    }

    #[test]
    fn hooks_run_in_phase_order() {
        let semantic = semantic_for("const a = 1;\npub const b = a;\n");
        let linter = Linter::new(
            RuleStore::new().with_rule(Box::new(EveryHook::default()), RuleLevel::Warning),
        );
        let diagnostics = linter.run(&semantic);

        let phases: Vec<&str> = diagnostics
            .iter()
            .map(|diagnostic| match &*diagnostic.message {
                "once" => "once",
                "symbol" => "symbol",
                "node" => "node",
                "line" => "line",
                other => panic!("unexpected message {:?}", other),
            })
            .collect();
        let first_symbol = phases.iter().position(|&p| p == "symbol").unwrap();
        let first_node = phases.iter().position(|&p| p == "node").unwrap();
        let first_line = phases.iter().position(|&p| p == "line").unwrap();
        assert_eq!(phases[0], "once");
        assert!(first_symbol < first_node);
        assert!(first_node < first_line);
        assert_eq!(phases.iter().filter(|&&p| p == "once").count(), 1);
        // Two symbols, one identifier reference, two lines.
        assert_eq!(phases.iter().filter(|&&p| p == "symbol").count(), 2);
        assert_eq!(phases.iter().filter(|&&p| p == "node").count(), 1);
        assert_eq!(phases.iter().filter(|&&p| p == "line").count(), 2);
    }

    #[test]
    fn a_faulty_rule_does_not_take_down_the_run() {
        let semantic = semantic_for("const a = 1;\npub const b = a;\n");
        let linter = Linter::new(
            RuleStore::new()
                .with_rule(Box::new(FaultyRule::default()), RuleLevel::Warning)
                .with_rule(Box::new(EveryHook::default()), RuleLevel::Warning),
        );
        let diagnostics = linter.run(&semantic);
        // The healthy rule still reported from every phase.
        assert!(diagnostics.iter().any(|d| d.message == "once"));
        assert!(diagnostics.iter().any(|d| d.message == "node"));
    }

    #[test]
    #[should_panic(expected = "without advertising a fix capability")]
    fn fixing_without_a_capability_is_a_developer_error() {
        let semantic = semantic_for("const a = 1;\npub const b = a;\n");
        let mut ctx = RuleCtx::new(&semantic);
        let rule = EveryHook::default();
        ctx.update_for_rule(&rule, RuleLevel::Warning);
        let err = ctx.diagnostic("bad");
        ctx.report_with_fix(err, |fixer| fixer.noop());
    }
}
