//! Depth-first iterative AST traversal.
//!
//! The walker drives a [`Visitor`] over every node with paired
//! `enter_node`/`exit_node` hooks. Nodes whose tag belongs to a full family
//! are dispatched to the matching `visit_<kind>` method with the canonical
//! view already built; when a full visitor is not overridden it falls back
//! to the per-tag hook, and from there to the catch-all [`Visitor::
//! visit_node`]. Returning [`WalkState::Skip`] prunes the subtree (the exit
//! hook still fires); [`WalkState::Stop`] ends the walk immediately.
//!
//! Function parameters have no AST node of their own, so the walker
//! synthesizes a [`Visitor::visit_fn_param`] call per parameter whenever it
//! canonicalizes a function prototype, before descending into the parameter
//! type expressions.

use zlint_syntax::full::{
    full_node, FnParam, FullArrayInit, FullArrayType, FullAssignDestructure, FullCall,
    FullContainerDecl, FullContainerField, FullFor, FullFnProto, FullIf, FullNode, FullPtrType,
    FullSlice, FullStructInit, FullSwitchCase, FullVarDecl, FullWhile,
};
use zlint_syntax::{Ast, NodeId, Tag, TokenList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    /// Descend into the node's children.
    Continue,
    /// Do not descend into this subtree; the walk itself continues.
    Skip,
    /// Terminate the entire walk.
    Stop,
}

#[allow(unused_variables)]
pub trait Visitor {
    fn enter_node(&mut self, node: NodeId, ast: &Ast) {}
    fn exit_node(&mut self, node: NodeId, ast: &Ast) {}

    /// Catch-all for any node without a more specific visitor.
    fn visit_node(&mut self, node: NodeId, ast: &Ast) -> WalkState {
        WalkState::Continue
    }

    // Per-tag hooks for shapes without a full-node family.
    fn visit_identifier(&mut self, node: NodeId, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_try(&mut self, node: NodeId, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_catch(&mut self, node: NodeId, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_test_decl(&mut self, node: NodeId, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_error_set_decl(&mut self, node: NodeId, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_block(&mut self, node: NodeId, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }

    // Full-node hooks; each replaces the per-tag path when overridden.
    fn visit_var_decl(&mut self, node: NodeId, full: &FullVarDecl, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_assign_destructure(
        &mut self,
        node: NodeId,
        full: &FullAssignDestructure,
        ast: &Ast,
    ) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_if(&mut self, node: NodeId, full: &FullIf, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_while(&mut self, node: NodeId, full: &FullWhile, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_for(&mut self, node: NodeId, full: &FullFor, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_fn_proto(&mut self, node: NodeId, full: &FullFnProto, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_container_field(
        &mut self,
        node: NodeId,
        full: &FullContainerField,
        ast: &Ast,
    ) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_struct_init(&mut self, node: NodeId, full: &FullStructInit, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_array_init(&mut self, node: NodeId, full: &FullArrayInit, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_array_type(&mut self, node: NodeId, full: &FullArrayType, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_ptr_type(&mut self, node: NodeId, full: &FullPtrType, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_slice(&mut self, node: NodeId, full: &FullSlice, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_container_decl(
        &mut self,
        node: NodeId,
        full: &FullContainerDecl,
        ast: &Ast,
    ) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_switch_case(&mut self, node: NodeId, full: &FullSwitchCase, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }
    fn visit_call(&mut self, node: NodeId, full: &FullCall, ast: &Ast) -> WalkState {
        self.visit_node(node, ast)
    }

    /// Synthesized per function parameter; parameters have no node of
    /// their own.
    fn visit_fn_param(&mut self, fn_proto: NodeId, param: &FnParam, ast: &Ast) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Enter,
    Exit,
}

pub struct Walker<'a> {
    ast: &'a Ast,
    tokens: &'a TokenList,
}

impl<'a> Walker<'a> {
    pub fn new(ast: &'a Ast, tokens: &'a TokenList) -> Self {
        Self { ast, tokens }
    }

    pub fn walk<V: Visitor>(&self, visitor: &mut V) {
        let mut stack: Vec<(NodeId, Phase)> = Vec::new();
        let mut children: Vec<NodeId> = Vec::new();

        let decls = self.ast.root_decls();
        for decl in decls.iter().rev() {
            stack.push((*decl, Phase::Exit));
            stack.push((*decl, Phase::Enter));
        }

        while let Some((node, phase)) = stack.pop() {
            match phase {
                Phase::Exit => visitor.exit_node(node, self.ast),
                Phase::Enter => {
                    visitor.enter_node(node, self.ast);
                    let full = full_node(self.ast, self.tokens, node);
                    let state = self.dispatch(visitor, node, full.as_ref());
                    match state {
                        WalkState::Stop => return,
                        WalkState::Skip => continue,
                        WalkState::Continue => {}
                    }

                    children.clear();
                    match &full {
                        Some(full) => full.children(self.ast, &mut children),
                        None => self.ast.children_of(node, &mut children),
                    }
                    for child in children.iter().rev() {
                        self.check_cycle(&stack, *child);
                        stack.push((*child, Phase::Exit));
                        stack.push((*child, Phase::Enter));
                    }
                }
            }
        }
    }

    fn dispatch<V: Visitor>(
        &self,
        visitor: &mut V,
        node: NodeId,
        full: Option<&FullNode>,
    ) -> WalkState {
        if let Some(full) = full {
            return match full {
                FullNode::VarDecl(f) => visitor.visit_var_decl(node, f, self.ast),
                FullNode::AssignDestructure(f) => {
                    visitor.visit_assign_destructure(node, f, self.ast)
                }
                FullNode::If(f) => visitor.visit_if(node, f, self.ast),
                FullNode::While(f) => visitor.visit_while(node, f, self.ast),
                FullNode::For(f) => visitor.visit_for(node, f, self.ast),
                FullNode::FnProto(f) => {
                    let state = visitor.visit_fn_proto(node, f, self.ast);
                    if state == WalkState::Continue {
                        for param in f.iter_params(self.ast, self.tokens) {
                            visitor.visit_fn_param(node, &param, self.ast);
                        }
                    }
                    state
                }
                FullNode::ContainerField(f) => visitor.visit_container_field(node, f, self.ast),
                FullNode::StructInit(f) => visitor.visit_struct_init(node, f, self.ast),
                FullNode::ArrayInit(f) => visitor.visit_array_init(node, f, self.ast),
                FullNode::ArrayType(f) => visitor.visit_array_type(node, f, self.ast),
                FullNode::PtrType(f) => visitor.visit_ptr_type(node, f, self.ast),
                FullNode::Slice(f) => visitor.visit_slice(node, f, self.ast),
                FullNode::ContainerDecl(f) => visitor.visit_container_decl(node, f, self.ast),
                FullNode::SwitchCase(f) => visitor.visit_switch_case(node, f, self.ast),
                FullNode::Call(f) => visitor.visit_call(node, f, self.ast),
            };
        }

        match self.ast.tag(node) {
            Tag::Identifier => visitor.visit_identifier(node, self.ast),
            Tag::Try => visitor.visit_try(node, self.ast),
            Tag::Catch => visitor.visit_catch(node, self.ast),
            Tag::TestDecl => visitor.visit_test_decl(node, self.ast),
            Tag::ErrorSetDecl => visitor.visit_error_set_decl(node, self.ast),
            Tag::BlockTwo | Tag::BlockTwoSemicolon | Tag::Block | Tag::BlockSemicolon => {
                visitor.visit_block(node, self.ast)
            }
            _ => visitor.visit_node(node, self.ast),
        }
    }

    /// A malformed tree can alias a node into two parents; catch it in
    /// debug builds instead of walking forever.
    #[cfg(debug_assertions)]
    fn check_cycle(&self, stack: &[(NodeId, Phase)], child: NodeId) {
        let open = stack
            .iter()
            .any(|(node, phase)| *node == child && *phase == Phase::Exit)
            && !stack
                .iter()
                .any(|(node, phase)| *node == child && *phase == Phase::Enter);
        debug_assert!(!open, "node {} is already being visited", child);
    }

    #[cfg(not(debug_assertions))]
    fn check_cycle(&self, _stack: &[(NodeId, Phase)], _child: NodeId) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use zlint_syntax::parse;

    #[derive(Debug, PartialEq)]
    enum Event {
        Enter(NodeId),
        Exit(NodeId),
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
        skip: Option<Tag>,
        stop: Option<Tag>,
        var_decl_visits: usize,
        fallback_visits_of_var_decls: usize,
        fn_params: usize,
    }

    impl Visitor for Recorder {
        fn enter_node(&mut self, node: NodeId, _ast: &Ast) {
            self.events.push(Event::Enter(node));
        }

        fn exit_node(&mut self, node: NodeId, _ast: &Ast) {
            self.events.push(Event::Exit(node));
        }

        fn visit_node(&mut self, node: NodeId, ast: &Ast) -> WalkState {
            if matches!(
                ast.tag(node),
                Tag::SimpleVarDecl | Tag::AlignedVarDecl | Tag::LocalVarDecl | Tag::GlobalVarDecl
            ) {
                self.fallback_visits_of_var_decls += 1;
            }
            if self.stop == Some(ast.tag(node)) {
                return WalkState::Stop;
            }
            if self.skip == Some(ast.tag(node)) {
                return WalkState::Skip;
            }
            WalkState::Continue
        }

        fn visit_var_decl(
            &mut self,
            _node: NodeId,
            _full: &zlint_syntax::full::FullVarDecl,
            _ast: &Ast,
        ) -> WalkState {
            self.var_decl_visits += 1;
            WalkState::Continue
        }

        fn visit_fn_param(
            &mut self,
            _fn_proto: NodeId,
            _param: &zlint_syntax::full::FnParam,
            _ast: &Ast,
        ) {
            self.fn_params += 1;
        }
    }

    const SAMPLE: &str = "const limit = 10;\nfn check(value: u32, extra: u32) bool {\n    if (value > limit) {\n        return false;\n    }\n    return extra != 0;\n}\n";

    fn record(source: &str, configure: impl FnOnce(&mut Recorder)) -> Recorder {
        let parsed = parse(source);
        assert!(parsed.ok(), "bad walker fixture: {:#?}", parsed.errors);
        let mut recorder = Recorder::default();
        configure(&mut recorder);
        Walker::new(&parsed.ast, &parsed.tokens).walk(&mut recorder);
        recorder
    }

    #[test]
    fn every_enter_has_a_properly_nested_exit() {
        let recorder = record(SAMPLE, |_| {});
        let mut open = Vec::new();
        for event in &recorder.events {
            match event {
                Event::Enter(node) => open.push(*node),
                Event::Exit(node) => {
                    assert_eq!(open.pop(), Some(*node), "exit order must mirror enter order");
                }
            }
        }
        assert!(open.is_empty(), "unmatched enters: {:?}", open);
        assert!(!recorder.events.is_empty());
    }

    #[test]
    fn skip_prunes_descendants_but_still_exits() {
        let skipped = record(SAMPLE, |recorder| {
            recorder.skip = Some(Tag::FnDecl);
        });
        let full = record(SAMPLE, |_| {});
        assert!(skipped.events.len() < full.events.len());

        // The function declaration itself still pairs enter/exit.
        let parsed = parse(SAMPLE);
        let fn_decl = parsed
            .ast
            .root_decls()
            .into_iter()
            .find(|decl| parsed.ast.tag(*decl) == Tag::FnDecl)
            .unwrap();
        assert!(skipped.events.contains(&Event::Enter(fn_decl)));
        assert!(skipped.events.contains(&Event::Exit(fn_decl)));

        // Nothing inside the function body was entered.
        let body = parsed.ast.data(fn_decl).rhs_node();
        assert!(!skipped.events.contains(&Event::Enter(body)));
    }

    #[test]
    fn stop_ends_the_walk_immediately() {
        let stopped = record(SAMPLE, |recorder| {
            recorder.stop = Some(Tag::FnDecl);
        });
        match stopped.events.last() {
            Some(Event::Enter(node)) => {
                let parsed = parse(SAMPLE);
                assert_eq!(parsed.ast.tag(*node), Tag::FnDecl);
            }
            other => panic!("the walk should end on the stopping enter, got {:?}", other),
        }
    }

    #[test]
    fn full_visitors_replace_the_tag_fallback() {
        let recorder = record(SAMPLE, |_| {});
        assert_eq!(recorder.var_decl_visits, 1);
        assert_eq!(
            recorder.fallback_visits_of_var_decls, 0,
            "the tag fallback must not fire when the full visitor is overridden"
        );
    }

    #[test]
    fn fn_params_are_synthesized() {
        let recorder = record(SAMPLE, |_| {});
        assert_eq!(recorder.fn_params, 2);
    }
}
