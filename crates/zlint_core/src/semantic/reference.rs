use std::fmt;

use zlint_syntax::NodeId;

use super::{OptSymbolId, RefId, ScopeId};

/// How an identifier use site touches the symbol it names.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct RefFlags(u8);

impl RefFlags {
    pub const READ: RefFlags = RefFlags(1 << 0);
    pub const WRITE: RefFlags = RefFlags(1 << 1);
    pub const TYPE: RefFlags = RefFlags(1 << 2);
    pub const CALL: RefFlags = RefFlags(1 << 3);

    pub const fn merge(self, other: RefFlags) -> RefFlags {
        RefFlags(self.0 | other.0)
    }

    pub const fn intersects(self, other: RefFlags) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for RefFlags {
    type Output = RefFlags;

    fn bitor(self, other: RefFlags) -> RefFlags {
        self.merge(other)
    }
}

impl fmt::Debug for RefFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: &[(RefFlags, &str)] = &[
            (RefFlags::READ, "read"),
            (RefFlags::WRITE, "write"),
            (RefFlags::TYPE, "type"),
            (RefFlags::CALL, "call"),
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

/// An identifier use site.
#[derive(Debug, Clone, Copy)]
pub struct Reference {
    pub id: RefId,
    /// The identifier node making the reference.
    pub node: NodeId,
    /// The scope the reference is made from.
    pub scope: ScopeId,
    /// The resolved symbol; none when unresolved.
    pub symbol: OptSymbolId,
    pub flags: RefFlags,
}
