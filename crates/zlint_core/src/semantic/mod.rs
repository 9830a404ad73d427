//! The per-file semantic model.
//!
//! Built once by the [`builder`], read-only afterwards: a symbol table, a
//! lexically nested scope tree, the reference list, and two parallel arrays
//! linking every AST node to its enclosing scope and its parent node. All
//! cross-links are plain indices; the model owns a [`Source`] clone so
//! symbol names can be borrowed straight out of the file text.

pub mod builder;
mod reference;
mod scope;
mod symbol;

pub use builder::{Analysis, BuildFailure, SemanticBuilder};
pub use reference::{RefFlags, Reference};
pub use scope::{Scope, ScopeFlags, ScopeTree};
pub use symbol::{Symbol, SymbolFlags, SymbolTable, Visibility};

use zlint_errors::{Source, Span};
use zlint_syntax::{define_index, Ast, NodeId, Parse, TokenList};

define_index! {
    /// Index of a symbol in the symbol table.
    SymbolId,
    OptSymbolId
}

define_index! {
    /// Index of a scope in the scope tree.
    ScopeId,
    OptScopeId
}

define_index! {
    /// Index of a reference in the reference list.
    RefId,
    OptRefId
}

/// Parallel arrays indexed by AST node id.
///
/// `parent` follows the null-node convention: entry 0 (the root) holds the
/// null sentinel, and a top-level declaration's parent is the root (also
/// node 0). `scope` holds the scope *enclosing* the node, which for
/// scope-introducing nodes is not the scope they create.
#[derive(Debug, Clone, Default)]
pub struct NodeLinks {
    scope: Vec<ScopeId>,
    parent: Vec<NodeId>,
}

impl NodeLinks {
    pub fn with_capacity(node_count: usize) -> Self {
        Self {
            scope: vec![ScopeId::new(0); node_count],
            parent: vec![NodeId::NULL; node_count],
        }
    }

    pub fn set(&mut self, node: NodeId, parent: NodeId, scope: ScopeId) {
        self.parent[node.index()] = parent;
        self.scope[node.index()] = scope;
    }

    pub fn scope(&self, node: NodeId) -> ScopeId {
        self.scope[node.index()]
    }

    /// The parent node, or `None` for the root.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        if node.is_null() {
            return None;
        }
        Some(self.parent[node.index()])
    }

    /// Walk `node`, its parent, its grandparent, … up to the root.
    pub fn ancestors<'a>(&'a self, node: NodeId) -> impl Iterator<Item = NodeId> + 'a {
        let mut current = Some(node);
        std::iter::from_fn(move || {
            let node = current?;
            current = self.parent(node);
            Some(node)
        })
    }
}

/// The complete semantic model for one file.
#[derive(Debug)]
pub struct Semantic {
    pub(crate) source: Source,
    pub(crate) parse: Parse,
    pub(crate) symbols: SymbolTable,
    pub(crate) scopes: ScopeTree,
    pub(crate) references: Vec<Reference>,
    /// References that did not resolve to a local symbol; kept for lazy or
    /// cross-file resolution.
    pub(crate) unresolved: Vec<RefId>,
    pub(crate) links: NodeLinks,
}

impl Semantic {
    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn text(&self) -> &str {
        self.source.text()
    }

    pub fn ast(&self) -> &Ast {
        &self.parse.ast
    }

    pub fn tokens(&self) -> &TokenList {
        &self.parse.tokens
    }

    pub fn parse(&self) -> &Parse {
        &self.parse
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn links(&self) -> &NodeLinks {
        &self.links
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        self.symbols.symbol(id)
    }

    pub fn reference(&self, id: RefId) -> &Reference {
        &self.references[id.index()]
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn unresolved_references(&self) -> &[RefId] {
        &self.unresolved
    }

    /// The symbol's name as written in the source; empty for anonymous
    /// bindings (use [`Symbol::debug_name`] there).
    pub fn symbol_name(&self, id: SymbolId) -> &str {
        let span = self.symbols.symbol(id).name_span;
        self.source.slice(span)
    }

    pub fn node_span(&self, node: NodeId) -> Span {
        self.parse.ast.span(node)
    }

    pub fn node_text(&self, node: NodeId) -> &str {
        self.source.slice(self.parse.ast.span(node))
    }
}
