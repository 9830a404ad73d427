use std::fmt;

use zlint_syntax::NodeId;

use super::{ScopeId, SymbolId};

/// Packed classification bits for a scope.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeFlags(u16);

impl ScopeFlags {
    pub const NONE: ScopeFlags = ScopeFlags(0);
    /// The file's root scope; exactly one per file.
    pub const TOP: ScopeFlags = ScopeFlags(1 << 0);
    pub const FUNCTION: ScopeFlags = ScopeFlags(1 << 1);
    pub const STRUCT: ScopeFlags = ScopeFlags(1 << 2);
    pub const ENUM: ScopeFlags = ScopeFlags(1 << 3);
    pub const UNION: ScopeFlags = ScopeFlags(1 << 4);
    pub const ERROR: ScopeFlags = ScopeFlags(1 << 5);
    pub const BLOCK: ScopeFlags = ScopeFlags(1 << 6);
    pub const COMPTIME: ScopeFlags = ScopeFlags(1 << 7);
    pub const CATCH: ScopeFlags = ScopeFlags(1 << 8);
    pub const TEST: ScopeFlags = ScopeFlags(1 << 9);

    pub const CONTAINER: ScopeFlags = ScopeFlags(
        Self::STRUCT.0 | Self::ENUM.0 | Self::UNION.0 | Self::ERROR.0,
    );

    pub const fn merge(self, other: ScopeFlags) -> ScopeFlags {
        ScopeFlags(self.0 | other.0)
    }

    pub const fn intersects(self, other: ScopeFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn contains(self, other: ScopeFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for ScopeFlags {
    type Output = ScopeFlags;

    fn bitor(self, other: ScopeFlags) -> ScopeFlags {
        self.merge(other)
    }
}

impl fmt::Debug for ScopeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: &[(ScopeFlags, &str)] = &[
            (ScopeFlags::TOP, "top"),
            (ScopeFlags::FUNCTION, "function"),
            (ScopeFlags::STRUCT, "struct"),
            (ScopeFlags::ENUM, "enum"),
            (ScopeFlags::UNION, "union"),
            (ScopeFlags::ERROR, "error"),
            (ScopeFlags::BLOCK, "block"),
            (ScopeFlags::COMPTIME, "comptime"),
            (ScopeFlags::CATCH, "catch"),
            (ScopeFlags::TEST, "test"),
        ];
        let mut set = f.debug_set();
        for (flag, name) in NAMES {
            if self.intersects(*flag) {
                set.entry(name);
            }
        }
        set.finish()
    }
}

/// One lexical region.
#[derive(Debug, Clone, Copy)]
pub struct Scope {
    pub id: ScopeId,
    /// Only the root scope has no parent.
    pub parent: Option<ScopeId>,
    /// The AST node that introduced the scope.
    pub node: NodeId,
    pub flags: ScopeFlags,
}

/// The scope tree: scopes in creation order plus, per scope, the child
/// scopes and the symbols bound directly in it (both in insertion order).
#[derive(Debug, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    children: Vec<Vec<ScopeId>>,
    bindings: Vec<Vec<SymbolId>>,
}

impl ScopeTree {
    pub const ROOT: ScopeId = ScopeId::new(0);

    /// Seed the tree with the root scope bound to `root_node`.
    pub fn new(root_node: NodeId) -> Self {
        let mut tree = Self::default();
        tree.scopes.push(Scope {
            id: Self::ROOT,
            parent: None,
            node: root_node,
            flags: ScopeFlags::TOP,
        });
        tree.children.push(Vec::new());
        tree.bindings.push(Vec::new());
        tree
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    /// Child scopes, in the order they were opened.
    pub fn children(&self, id: ScopeId) -> &[ScopeId] {
        &self.children[id.index()]
    }

    /// Symbols bound directly in the scope, in binding order.
    pub fn bindings(&self, id: ScopeId) -> &[SymbolId] {
        &self.bindings[id.index()]
    }

    /// Walk `scope`, its parent, … up to and including the root.
    pub fn ancestors<'a>(&'a self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + 'a {
        let mut current = Some(scope);
        std::iter::from_fn(move || {
            let scope = current?;
            current = self.scopes[scope.index()].parent;
            Some(scope)
        })
    }

    pub(crate) fn add_scope(
        &mut self,
        parent: ScopeId,
        node: NodeId,
        flags: ScopeFlags,
    ) -> ScopeId {
        let id = ScopeId::new(self.scopes.len() as u32);
        debug_assert!(parent.get() < id.get(), "a scope's parent must precede it");
        self.scopes.push(Scope {
            id,
            parent: Some(parent),
            node,
            flags,
        });
        self.children.push(Vec::new());
        self.bindings.push(Vec::new());
        self.children[parent.index()].push(id);
        id
    }

    pub(crate) fn bind(&mut self, scope: ScopeId, symbol: SymbolId) {
        self.bindings[scope.index()].push(symbol);
    }
}
