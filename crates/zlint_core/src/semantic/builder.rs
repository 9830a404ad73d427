//! Single-pass construction of the semantic model.
//!
//! The builder rides the AST walker once: scopes open and close with the
//! enter/exit hooks, symbols are bound as their declarations are entered,
//! and identifier references are recorded against the scope they occur in.
//! Name resolution runs as a separate pass after the walk, when every
//! symbol of the file exists, so container-level declarations resolve
//! regardless of their order in the file.

use std::collections::HashMap;

use zlint_errors::{Diagnostic, Source, Span};
use zlint_syntax::full::{
    self, catch_payload_token, full_container_decl, full_fn_proto, full_if, full_switch_case,
    full_var_decl, full_while, FullFnProto,
};
use zlint_syntax::{parse, Ast, NodeId, OptTokenId, Tag, TokenId, TokenList, TokenTag};

use super::{
    NodeLinks, OptSymbolId, RefFlags, RefId, Reference, ScopeFlags, ScopeId, ScopeTree, Semantic,
    Symbol, SymbolFlags, SymbolId, SymbolTable, Visibility,
};
use crate::visit::{Visitor, Walker};

/// A successfully built model plus any non-fatal diagnostics.
#[derive(Debug)]
pub struct Analysis {
    pub semantic: Semantic,
    pub errors: Vec<Diagnostic>,
}

/// Why a file could not be analyzed. The collected diagnostics are
/// returned either way.
#[derive(Debug)]
pub enum BuildFailure {
    Parse(Vec<Diagnostic>),
    Analysis(Vec<Diagnostic>),
}

impl BuildFailure {
    pub fn into_errors(self) -> Vec<Diagnostic> {
        match self {
            BuildFailure::Parse(errors) | BuildFailure::Analysis(errors) => errors,
        }
    }
}

pub struct SemanticBuilder;

impl SemanticBuilder {
    /// Parse `source` and build its semantic model.
    pub fn build(source: &Source) -> Result<Analysis, BuildFailure> {
        let parsed = parse(source.text());
        if !parsed.errors.is_empty() {
            let errors = parsed
                .errors
                .into_iter()
                .map(|diagnostic| diagnostic.with_source(source.clone()))
                .collect();
            return Err(BuildFailure::Parse(errors));
        }

        let node_count = parsed.ast.node_count();
        let mut pass = BuildPass {
            source: source.clone(),
            ast: &parsed.ast,
            tokens: &parsed.tokens,
            symbols: SymbolTable::default(),
            scopes: ScopeTree::new(NodeId::NULL),
            references: Vec::new(),
            links: NodeLinks::with_capacity(node_count),
            scope_stack: vec![(ScopeTree::ROOT, NodeId::NULL)],
            node_stack: Vec::new(),
            container_stack: Vec::new(),
            container_owners: HashMap::new(),
            errors: Vec::new(),
        };

        if source.is_empty() {
            let (symbols, scopes, references, links, errors) = pass.finish();
            return Ok(Analysis {
                semantic: Semantic {
                    source: source.clone(),
                    parse: parsed,
                    symbols,
                    scopes,
                    references,
                    unresolved: Vec::new(),
                    links,
                },
                errors,
            });
        }

        Walker::new(&parsed.ast, &parsed.tokens).walk(&mut pass);

        if pass.scope_stack.len() != 1 {
            pass.errors.push(
                Diagnostic::error("analysis", "scope tracking lost its balance")
                    .with_source(source.clone()),
            );
            return Err(BuildFailure::Analysis(pass.errors));
        }

        let unresolved = pass.resolve_references();
        let (symbols, scopes, references, links, errors) = pass.finish();

        Ok(Analysis {
            semantic: Semantic {
                source: source.clone(),
                parse: parsed,
                symbols,
                scopes,
                references,
                unresolved,
                links,
            },
            errors,
        })
    }
}

struct ContainerCtx {
    node: NodeId,
    scope: ScopeId,
    owner: Option<SymbolId>,
}

struct BuildPass<'p> {
    source: Source,
    ast: &'p Ast,
    tokens: &'p TokenList,
    symbols: SymbolTable,
    scopes: ScopeTree,
    references: Vec<Reference>,
    links: NodeLinks,
    /// `(scope, opener)` pairs; the opener is the node whose exit pops it.
    scope_stack: Vec<(ScopeId, NodeId)>,
    node_stack: Vec<NodeId>,
    container_stack: Vec<ContainerCtx>,
    /// Container/error-set init nodes whose enclosing variable declaration
    /// owns their members and exports.
    container_owners: HashMap<NodeId, SymbolId>,
    errors: Vec<Diagnostic>,
}

impl<'p> BuildPass<'p> {
    fn finish(
        self,
    ) -> (
        SymbolTable,
        ScopeTree,
        Vec<Reference>,
        NodeLinks,
        Vec<Diagnostic>,
    ) {
        (
            self.symbols,
            self.scopes,
            self.references,
            self.links,
            self.errors,
        )
    }

    fn current_scope(&self) -> ScopeId {
        self.scope_stack.last().expect("the root scope never pops").0
    }

    fn open_scope(&mut self, node: NodeId, flags: ScopeFlags) -> ScopeId {
        let parent = self.current_scope();
        let scope = self.scopes.add_scope(parent, node, flags);
        self.scope_stack.push((scope, node));
        scope
    }

    fn token_text(&self, token: TokenId) -> &str {
        let span = self.tokens.span(self.source.text(), token);
        &self.source.text()[span.range()]
    }

    fn declare(
        &mut self,
        name_token: Option<TokenId>,
        debug_name: &'static str,
        decl: NodeId,
        flags: SymbolFlags,
        visibility: Visibility,
    ) -> SymbolId {
        let scope = self.current_scope();
        let name_span = match name_token {
            Some(token) => self.tokens.span(self.source.text(), token),
            None => Span::empty(self.ast.span(decl).start),
        };
        let id = self.symbols.push(Symbol {
            id: SymbolId::new(0),
            name_span,
            debug_name: if name_token.is_some() { "" } else { debug_name },
            token: OptTokenId::from(name_token),
            decl,
            scope,
            visibility,
            flags,
            references: Vec::new(),
            members: Vec::new(),
            exports: Vec::new(),
        });
        self.scopes.bind(scope, id);
        id
    }

    /// Record `symbol` as a member or export of the container whose scope
    /// we are currently binding into, if any.
    fn attach_to_container(&mut self, symbol: SymbolId, member: bool) {
        let scope = self.current_scope();
        let owner = match self.container_stack.last() {
            Some(ctx) if ctx.scope == scope => ctx.owner,
            _ => return,
        };
        if let Some(owner) = owner {
            if member {
                self.symbols.symbol_mut(owner).members.push(symbol);
            } else {
                self.symbols.symbol_mut(owner).exports.push(symbol);
            }
        }
    }

    // --------------------------------------------------------------
    // Declarations
    // --------------------------------------------------------------

    fn enter_var_decl(&mut self, node: NodeId) {
        let full = full_var_decl(self.ast, self.tokens, node);
        let mut flags = SymbolFlags::VARIABLE;
        if full.is_const(self.tokens) {
            flags = flags | SymbolFlags::CONST;
        }
        if full.comptime_token.is_some() {
            flags = flags | SymbolFlags::COMPTIME;
        }
        if let Some(token) = full.extern_export_token {
            flags = flags
                | match self.tokens.tag(token) {
                    TokenTag::KeywordExport => SymbolFlags::EXPORT,
                    _ => SymbolFlags::EXTERN,
                };
        }
        if let Some(init) = full.init_node.non_null() {
            flags = flags | container_kind_flags(self.ast, self.tokens, init);
        }
        let visibility = if full.is_pub() {
            Visibility::Public
        } else {
            Visibility::Private
        };

        let symbol = self.declare(Some(full.name_token()), "", node, flags, visibility);

        if flags.intersects(SymbolFlags::CONST) {
            self.attach_to_container(symbol, false);
        }
        if let Some(init) = full.init_node.non_null() {
            if !container_kind_flags(self.ast, self.tokens, init).is_empty() {
                self.container_owners.insert(init, symbol);
            }
        }
    }

    fn enter_fn(&mut self, node: NodeId, proto: &FullFnProto) {
        let mut flags = SymbolFlags::FN;
        if proto.extern_export_token.is_some() {
            flags = flags | SymbolFlags::EXTERN;
        }
        let visibility = if proto.visib_token.is_some() {
            Visibility::Public
        } else {
            Visibility::Private
        };

        if let Some(name_token) = proto.name_token {
            let symbol = self.declare(Some(name_token), "", node, flags, visibility);
            let member = self.is_method(proto);
            self.attach_to_container(symbol, member);
        }

        // The signature scope: parameters and return-type references live
        // here; the body block nests inside it.
        self.open_scope(node, ScopeFlags::FUNCTION);
        let params: Vec<_> = proto.iter_params(self.ast, self.tokens).collect();
        let proto_node = match self.ast.tag(node) {
            Tag::FnDecl => self.ast.data(node).lhs_node(),
            _ => node,
        };
        for param in params {
            let mut flags = SymbolFlags::FN_PARAM | SymbolFlags::CONST;
            if let Some(token) = param.comptime_noalias_token {
                if self.tokens.tag(token) == TokenTag::KeywordComptime {
                    flags = flags | SymbolFlags::COMPTIME;
                }
            }
            self.declare(param.name_token, "param", proto_node, flags, Visibility::Private);
        }
    }

    /// A function is a method when its first parameter names the
    /// container it is declared in, directly or through a pointer.
    fn is_method(&self, proto: &FullFnProto) -> bool {
        let ctx = match self.container_stack.last() {
            Some(ctx) if ctx.scope == self.current_scope() => ctx,
            _ => return false,
        };
        let owner = match ctx.owner {
            Some(owner) => owner,
            None => return false,
        };
        let owner_span = self.symbols.symbol(owner).name_span;
        let owner_name = &self.source.text()[owner_span.range()];
        if owner_name.is_empty() {
            return false;
        }

        let first = match proto.params.first(self.ast) {
            Some(first) => first,
            None => return false,
        };
        let type_node = match self.ast.tag(first) {
            Tag::PtrTypeAligned | Tag::PtrTypeSentinel | Tag::PtrType | Tag::PtrTypeBitRange => {
                self.ast.data(first).rhs_node()
            }
            _ => first,
        };
        self.ast.tag(type_node) == Tag::Identifier
            && self.token_text(self.ast.main_token(type_node)) == owner_name
    }

    fn enter_container_decl(&mut self, node: NodeId) {
        let container = full_container_decl(self.ast, self.tokens, node);
        let flags = match container.kind_tag(self.tokens) {
            TokenTag::KeywordStruct => ScopeFlags::STRUCT,
            TokenTag::KeywordEnum => ScopeFlags::ENUM,
            TokenTag::KeywordUnion => ScopeFlags::UNION,
            _ => ScopeFlags::STRUCT,
        };
        let scope = self.open_scope(node, flags);
        let owner = self.container_owners.remove(&node);
        self.container_stack.push(ContainerCtx { node, scope, owner });
    }

    fn enter_error_set(&mut self, node: NodeId) {
        let scope = self.open_scope(node, ScopeFlags::ERROR);
        let owner = self.container_owners.remove(&node);
        self.container_stack.push(ContainerCtx { node, scope, owner });

        // Error values are tokens, not nodes: `error { A, B }`.
        let data = self.ast.data(node);
        let mut index = self.ast.main_token(node).get() + 2;
        while index < data.rhs {
            if self.tokens.tag_at(index) == TokenTag::Identifier {
                let symbol = self.declare(
                    Some(TokenId::new(index)),
                    "",
                    node,
                    SymbolFlags::ERROR | SymbolFlags::CONST,
                    Visibility::Public,
                );
                self.attach_to_container(symbol, true);
            }
            index += 1;
        }
    }

    fn bind_payload(&mut self, token: Option<TokenId>, decl: NodeId, extra: SymbolFlags) {
        if let Some(token) = token {
            self.declare(
                Some(token),
                "",
                decl,
                SymbolFlags::PAYLOAD | SymbolFlags::CONST | extra,
                Visibility::Private,
            );
        }
    }

    /// `for (a, b) |x, *y, z|` binds one payload per input.
    fn bind_for_payloads(&mut self, first: Option<TokenId>, decl: NodeId) {
        let mut index = match first {
            Some(token) => token.get(),
            None => return,
        };
        loop {
            if self.tokens.tag_at(index) == TokenTag::Identifier {
                self.bind_payload(Some(TokenId::new(index)), decl, SymbolFlags::NONE);
            } else {
                break;
            }
            if self.tokens.tag_at(index + 1) != TokenTag::Comma {
                break;
            }
            index += 2;
            if self.tokens.tag_at(index) == TokenTag::Asterisk {
                index += 1;
            }
        }
    }

    // --------------------------------------------------------------
    // References
    // --------------------------------------------------------------

    fn record_reference(&mut self, node: NodeId, parent: NodeId) {
        let token = self.ast.main_token(node);
        // `anytype` rides an identifier node; `_` is a discard.
        if self.tokens.tag(token) == TokenTag::KeywordAnytype || self.token_text(token) == "_" {
            return;
        }
        let flags = self.classify_reference(parent, node);
        let id = RefId::new(self.references.len() as u32);
        self.references.push(Reference {
            id,
            node,
            scope: self.current_scope(),
            symbol: OptSymbolId::NONE,
            flags,
        });
    }

    fn classify_reference(&self, parent: NodeId, node: NodeId) -> RefFlags {
        use Tag::*;
        if parent.is_null() {
            return RefFlags::READ;
        }
        let data = self.ast.data(parent);
        match self.ast.tag(parent) {
            Assign => {
                if data.lhs_node() == node {
                    RefFlags::WRITE
                } else {
                    RefFlags::READ
                }
            }
            CallOne | CallOneComma | Call | CallComma => {
                if data.lhs_node() == node {
                    RefFlags::CALL | RefFlags::READ
                } else {
                    RefFlags::READ
                }
            }
            SimpleVarDecl | ContainerFieldInit | ContainerFieldAlign | ContainerField => {
                if data.lhs_node() == node {
                    RefFlags::TYPE
                } else {
                    RefFlags::READ
                }
            }
            LocalVarDecl | GlobalVarDecl => {
                let full = full_var_decl(self.ast, self.tokens, parent);
                if full.type_node == node {
                    RefFlags::TYPE
                } else {
                    RefFlags::READ
                }
            }
            FnProtoSimple | FnProtoMulti | FnProtoOne | FnProto | PtrTypeAligned
            | PtrTypeSentinel | PtrType | PtrTypeBitRange | ArrayType | ArrayTypeSentinel
            | OptionalType | ErrorUnion | MergeErrorSets => RefFlags::TYPE,
            _ => RefFlags::READ,
        }
    }

    /// Scope-chain name lookup for every recorded reference; returns the
    /// ids that stayed unresolved.
    fn resolve_references(&mut self) -> Vec<RefId> {
        let mut unresolved = Vec::new();
        for index in 0..self.references.len() {
            let reference = self.references[index];
            let name = {
                let token = self.ast.main_token(reference.node);
                let span = self.tokens.span(self.source.text(), token);
                span
            };
            let name = &self.source.text()[name.range()];

            let mut resolved = None;
            'scopes: for scope in self.scopes.ancestors(reference.scope).collect::<Vec<_>>() {
                // Later bindings shadow earlier ones within a scope.
                for &symbol in self.scopes.bindings(scope).iter().rev() {
                    let span = self.symbols.symbol(symbol).name_span;
                    if !span.is_empty() && &self.source.text()[span.range()] == name {
                        resolved = Some(symbol);
                        break 'scopes;
                    }
                }
            }

            match resolved {
                Some(symbol) => {
                    self.references[index].symbol = OptSymbolId::some(symbol);
                    self.symbols.symbol_mut(symbol).references.push(reference.id);
                }
                None => unresolved.push(reference.id),
            }
        }
        unresolved
    }
}

fn container_kind_flags(ast: &Ast, tokens: &TokenList, init: NodeId) -> SymbolFlags {
    use Tag::*;
    match ast.tag(init) {
        ContainerDeclTwo | ContainerDeclTwoTrailing | ContainerDecl | ContainerDeclTrailing
        | ContainerDeclArg | ContainerDeclArgTrailing => {
            match tokens.tag(ast.main_token(init)) {
                TokenTag::KeywordStruct => SymbolFlags::STRUCT,
                TokenTag::KeywordEnum => SymbolFlags::ENUM,
                TokenTag::KeywordUnion => SymbolFlags::UNION,
                _ => SymbolFlags::NONE,
            }
        }
        TaggedUnionTwo | TaggedUnionTwoTrailing | TaggedUnion | TaggedUnionTrailing => {
            SymbolFlags::UNION
        }
        ErrorSetDecl => SymbolFlags::ERROR,
        _ => SymbolFlags::NONE,
    }
}

impl<'p> Visitor for BuildPass<'p> {
    fn enter_node(&mut self, node: NodeId, ast: &Ast) {
        let parent = self.node_stack.last().copied().unwrap_or(NodeId::NULL);
        self.links.set(node, parent, self.current_scope());
        self.node_stack.push(node);

        use Tag::*;
        match ast.tag(node) {
            SimpleVarDecl | AlignedVarDecl | LocalVarDecl | GlobalVarDecl => {
                self.enter_var_decl(node)
            }
            FnDecl => {
                if let Some(proto) = full_fn_proto(ast, self.tokens, node) {
                    self.enter_fn(node, &proto);
                }
            }
            FnProtoSimple | FnProtoMulti | FnProtoOne | FnProto => {
                let parent_is_fn_decl =
                    !parent.is_null() && ast.tag(parent) == Tag::FnDecl;
                if !parent_is_fn_decl {
                    if let Some(proto) = full_fn_proto(ast, self.tokens, node) {
                        self.enter_fn(node, &proto);
                    }
                }
            }
            BlockTwo | BlockTwoSemicolon | Block | BlockSemicolon => {
                let mut flags = ScopeFlags::BLOCK;
                if !parent.is_null() && ast.tag(parent) == Tag::FnDecl {
                    flags = flags | ScopeFlags::FUNCTION;
                }
                self.open_scope(node, flags);
            }
            ContainerDeclTwo | ContainerDeclTwoTrailing | ContainerDecl
            | ContainerDeclTrailing | ContainerDeclArg | ContainerDeclArgTrailing
            | TaggedUnionTwo | TaggedUnionTwoTrailing | TaggedUnion | TaggedUnionTrailing => {
                self.enter_container_decl(node)
            }
            ErrorSetDecl => self.enter_error_set(node),
            ContainerFieldInit | ContainerFieldAlign | ContainerField => {
                let field = full::full_container_field(ast, self.tokens, node);
                let symbol = self.declare(
                    Some(field.name_token),
                    "",
                    node,
                    SymbolFlags::MEMBER,
                    Visibility::Public,
                );
                self.attach_to_container(symbol, true);
            }
            IfSimple | If => {
                self.open_scope(node, ScopeFlags::NONE);
                let full = full_if(ast, self.tokens, node);
                self.bind_payload(full.payload_token, node, SymbolFlags::NONE);
                self.bind_payload(full.error_token, node, SymbolFlags::NONE);
            }
            WhileSimple | WhileCont | While => {
                self.open_scope(node, ScopeFlags::NONE);
                let full = full_while(ast, self.tokens, node);
                self.bind_payload(full.payload_token, node, SymbolFlags::NONE);
                self.bind_payload(full.error_token, node, SymbolFlags::NONE);
            }
            ForSimple | For => {
                self.open_scope(node, ScopeFlags::NONE);
                let full = full::full_for(ast, self.tokens, node);
                self.bind_for_payloads(full.payload_token, node);
            }
            Catch => {
                self.open_scope(node, ScopeFlags::CATCH);
                let payload = catch_payload_token(ast, self.tokens, node);
                self.bind_payload(payload, node, SymbolFlags::CATCH_PARAM);
            }
            SwitchCaseOne | SwitchCaseInlineOne | SwitchCase | SwitchCaseInline => {
                self.open_scope(node, ScopeFlags::NONE);
                let case = full_switch_case(ast, self.tokens, node);
                self.bind_payload(case.payload_token, node, SymbolFlags::NONE);
            }
            Errdefer => {
                self.open_scope(node, ScopeFlags::NONE);
                let data = ast.data(node);
                if data.lhs != 0 {
                    self.bind_payload(
                        Some(TokenId::new(data.lhs - 1)),
                        node,
                        SymbolFlags::NONE,
                    );
                }
            }
            Comptime => {
                self.open_scope(node, ScopeFlags::COMPTIME);
            }
            TestDecl => {
                self.open_scope(node, ScopeFlags::TEST);
            }
            Identifier => self.record_reference(node, parent),
            _ => {}
        }
    }

    fn exit_node(&mut self, node: NodeId, _ast: &Ast) {
        self.node_stack.pop();
        if let Some(&(_, opener)) = self.scope_stack.last() {
            if opener == node {
                self.scope_stack.pop();
            }
        }
        if let Some(ctx) = self.container_stack.last() {
            if ctx.node == node {
                self.container_stack.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::ScopeTree;
    use indoc::indoc;

    fn build(source: &str) -> Semantic {
        let source = Source::anonymous(source);
        match SemanticBuilder::build(&source) {
            Ok(analysis) => {
                assert!(analysis.errors.is_empty(), "{:#?}", analysis.errors);
                analysis.semantic
            }
            Err(failure) => panic!("build failed: {:#?}", failure.into_errors()),
        }
    }

    fn symbol_named(semantic: &Semantic, name: &str) -> SymbolId {
        semantic
            .symbols()
            .ids()
            .find(|&id| semantic.symbol_name(id) == name)
            .unwrap_or_else(|| panic!("no symbol named `{}`", name))
    }

    #[test]
    fn scope_parents_precede_their_children() {
        let semantic = build(indoc! {"
            const a = 1;
            fn f(x: u32) void {
                if (x > a) {
                    var y = x;
                    _ = y;
                }
            }
        "});
        for scope in semantic.scopes().iter() {
            if let Some(parent) = scope.parent {
                assert!(parent.get() < scope.id.get());
            } else {
                assert_eq!(scope.id, ScopeTree::ROOT);
            }
        }
        // Every ancestor chain terminates at the root.
        for scope in semantic.scopes().iter() {
            let last = semantic.scopes().ancestors(scope.id).last().unwrap();
            assert_eq!(last, ScopeTree::ROOT);
        }
    }

    #[test]
    fn every_symbol_scope_exists() {
        let semantic = build("fn f(x: u32) u32 { const y = x; return y; }");
        for symbol in semantic.symbols().iter() {
            assert!(symbol.scope.index() < semantic.scopes().len());
        }
    }

    #[test]
    fn functions_get_signature_and_body_scopes() {
        let semantic = build("fn f(x: u32) void { var y = x; _ = y; }");
        let x = symbol_named(&semantic, "x");
        let y = symbol_named(&semantic, "y");

        let signature = semantic.scopes().scope(semantic.symbol(x).scope);
        assert!(signature.flags.contains(ScopeFlags::FUNCTION));
        assert!(!signature.flags.contains(ScopeFlags::BLOCK));

        let body = semantic.scopes().scope(semantic.symbol(y).scope);
        assert!(body.flags.contains(ScopeFlags::FUNCTION));
        assert!(body.flags.contains(ScopeFlags::BLOCK));
        assert_eq!(body.parent, Some(signature.id));
    }

    #[test]
    fn references_and_symbols_cross_link() {
        let semantic = build("const a = 1;\npub const b = a + 1;\n");
        let a = symbol_named(&semantic, "a");
        let references = &semantic.symbol(a).references;
        assert_eq!(references.len(), 1);
        let reference = semantic.reference(references[0]);
        assert_eq!(reference.symbol.get(), Some(a));
        assert!(reference.flags.intersects(RefFlags::READ));
    }

    #[test]
    fn unresolved_references_are_kept_aside() {
        let semantic = build("pub const a = missing;\n");
        assert_eq!(semantic.unresolved_references().len(), 1);
        let id = semantic.unresolved_references()[0];
        assert!(semantic.reference(id).symbol.is_none());
    }

    #[test]
    fn members_and_exports_are_disjoint() {
        let semantic = build(indoc! {"
            const Point = struct {
                x: f32,
                y: f32,
                pub const dims = 2;
                pub fn len(self: Point) f32 {
                    return self.x;
                }
                fn helper(value: f32) f32 {
                    return value;
                }
            };
            pub const P = Point;
        "});
        let point = symbol_named(&semantic, "Point");
        let symbol = semantic.symbol(point);
        assert!(symbol.flags.contains(SymbolFlags::STRUCT));

        let members: Vec<_> = symbol
            .members
            .iter()
            .map(|&id| semantic.symbol_name(id).to_string())
            .collect();
        let exports: Vec<_> = symbol
            .exports
            .iter()
            .map(|&id| semantic.symbol_name(id).to_string())
            .collect();
        assert_eq!(members, vec!["x", "y", "len"]);
        assert_eq!(exports, vec!["dims", "helper"]);
        for member in &symbol.members {
            assert!(!symbol.exports.contains(member));
        }
    }

    #[test]
    fn payload_symbols_hang_off_the_control_flow_node() {
        let semantic = build("fn f() void { g() catch |e| use(e); }");
        let e = symbol_named(&semantic, "e");
        let symbol = semantic.symbol(e);
        assert!(symbol.flags.contains(SymbolFlags::PAYLOAD));
        assert!(symbol.flags.contains(SymbolFlags::CATCH_PARAM));
        assert!(symbol.flags.contains(SymbolFlags::CONST));
        assert_eq!(semantic.ast().tag(symbol.decl), Tag::Catch);
        assert!(semantic
            .scopes()
            .scope(symbol.scope)
            .flags
            .contains(ScopeFlags::CATCH));
        assert_eq!(symbol.references.len(), 1);
    }

    #[test]
    fn error_set_values_become_error_symbols() {
        let semantic = build("const Errors = error { OutOfSpace, BadInput };\npub const E = Errors;\n");
        let errors = symbol_named(&semantic, "Errors");
        assert!(semantic.symbol(errors).flags.contains(SymbolFlags::ERROR));
        let out_of_space = symbol_named(&semantic, "OutOfSpace");
        let value = semantic.symbol(out_of_space);
        assert!(value.flags.contains(SymbolFlags::ERROR));
        assert_eq!(semantic.symbol(errors).members.len(), 2);
    }

    #[test]
    fn annotated_globals_still_bind() {
        let semantic = build(
            "var buffer: u32 linksection(\".bss\") = 0;\npub fn get() u32 { return buffer; }\n",
        );
        let buffer = symbol_named(&semantic, "buffer");
        let symbol = semantic.symbol(buffer);
        assert_eq!(semantic.ast().tag(symbol.decl), Tag::GlobalVarDecl);
        assert!(symbol.flags.contains(SymbolFlags::VARIABLE));
        assert_eq!(symbol.references.len(), 1);
    }

    #[test]
    fn node_links_know_parents_and_scopes() {
        let semantic = build("fn f() void { g(); }");
        let ast = semantic.ast();
        let fn_decl = ast.root_decls()[0];
        let body = ast.data(fn_decl).rhs_node();
        assert_eq!(semantic.links().parent(body), Some(fn_decl));
        assert_eq!(semantic.links().parent(fn_decl), Some(NodeId::NULL));

        // The body's *enclosing* scope is the signature scope, not the
        // block scope it creates.
        let body_scope = semantic.links().scope(body);
        let scope = semantic.scopes().scope(body_scope);
        assert!(scope.flags.contains(ScopeFlags::FUNCTION));
        assert!(!scope.flags.contains(ScopeFlags::BLOCK));
    }

    #[test]
    fn empty_source_builds_an_empty_model() {
        let semantic = build("");
        assert_eq!(semantic.symbols().len(), 0);
        assert_eq!(semantic.scopes().len(), 1);
        assert!(semantic.references().is_empty());
    }

    #[test]
    fn write_references_are_classified() {
        let semantic = build("fn f() void { var x = 0; x = 1; _ = x; }");
        let x = symbol_named(&semantic, "x");
        let flags: Vec<_> = semantic
            .symbol(x)
            .references
            .iter()
            .map(|&id| semantic.reference(id).flags)
            .collect();
        assert!(flags.iter().any(|f| f.intersects(RefFlags::WRITE)));
    }

    #[test]
    fn type_references_are_classified() {
        let semantic = build("const Row = struct { n: u32 };\nfn f(r: Row) void { _ = r; }");
        let row = symbol_named(&semantic, "Row");
        let flags: Vec<_> = semantic
            .symbol(row)
            .references
            .iter()
            .map(|&id| semantic.reference(id).flags)
            .collect();
        assert!(!flags.is_empty());
        assert!(flags.iter().any(|f| f.intersects(RefFlags::TYPE)));
    }
}
