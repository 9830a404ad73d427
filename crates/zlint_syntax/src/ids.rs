//! Newtype indices for every id domain in the engine.
//!
//! Each domain gets a dense `u32` newtype. Optional encodings reserve
//! `u32::MAX` as the null marker, except nodes: the root node (index 0) can
//! never be the child of another node, so [`NodeId::NULL`] doubles as the
//! "absent child" sentinel inside node data words, matching the AST contract.

/// Define a `u32` index newtype together with its optional sibling.
#[macro_export]
macro_rules! define_index {
    ($(#[$meta:meta])* $name:ident, $(#[$opt_meta:meta])* $opt:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(raw: u32) -> Self {
                $name(raw)
            }

            pub const fn get(self) -> u32 {
                self.0
            }

            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        $(#[$opt_meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $opt(u32);

        impl $opt {
            pub const NONE: $opt = $opt(u32::MAX);

            pub const fn some(id: $name) -> Self {
                $opt(id.0)
            }

            pub fn get(self) -> Option<$name> {
                if self.0 == u32::MAX {
                    None
                } else {
                    Some($name(self.0))
                }
            }

            pub fn is_none(self) -> bool {
                self.0 == u32::MAX
            }

            /// # Panics
            /// Panics when the value is the null marker.
            pub fn unwrap(self) -> $name {
                self.get().expect("unwrapped a null index")
            }
        }

        impl From<Option<$name>> for $opt {
            fn from(opt: Option<$name>) -> Self {
                match opt {
                    Some(id) => $opt::some(id),
                    None => $opt::NONE,
                }
            }
        }
    };
}

define_index! {
    /// Index of a node in the AST's dense node array.
    NodeId,
    OptNodeId
}

define_index! {
    /// Index of a token in the token list.
    TokenId,
    OptTokenId
}

impl NodeId {
    /// The root node, and the "absent child" sentinel inside data words.
    pub const NULL: NodeId = NodeId(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// `self` unless it is the null sentinel.
    pub fn non_null(self) -> Option<NodeId> {
        if self.is_null() {
            None
        } else {
            Some(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_round_trip() {
        assert_eq!(OptTokenId::NONE.get(), None);
        let id = TokenId::new(7);
        assert_eq!(OptTokenId::some(id).get(), Some(id));
        assert_eq!(OptTokenId::some(id).unwrap(), id);
    }

    #[test]
    fn null_node_is_the_root_index() {
        assert_eq!(NodeId::NULL.get(), 0);
        assert_eq!(NodeId::new(3).non_null(), Some(NodeId::new(3)));
        assert_eq!(NodeId::NULL.non_null(), None);
    }
}
