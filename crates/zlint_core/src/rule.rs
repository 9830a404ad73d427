//! The rule abstraction.
//!
//! A rule is two traits: [`Rule`] carries the metadata (name, category,
//! default level, advertised fix capability, and which hooks it
//! implements), [`LintRule`] carries the dispatch hooks themselves. Hooks
//! return `Option<()>` so rule bodies can bail with `?`. Rules are
//! `typetag`-serialized trait objects keyed by their kebab-case name, which
//! is also how the JSON config file addresses them.

use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use zlint_errors::{FixMeta, Severity};
use zlint_errors::file::Line;
use zlint_syntax::NodeId;

use crate::context::RuleCtx;
use crate::semantic::SymbolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Compiler,
    Correctness,
    Suspicious,
    Restriction,
    Pedantic,
    Style,
}

/// A rule's configured (or default) severity. `Off` rules are never
/// registered in a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    Off,
    Warning,
    Error,
}

impl RuleLevel {
    pub fn severity(self) -> Option<Severity> {
        match self {
            RuleLevel::Off => None,
            RuleLevel::Warning => Some(Severity::Warning),
            RuleLevel::Error => Some(Severity::Error),
        }
    }
}

/// Which of the four dispatch hooks a rule implements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookSet(u8);

impl HookSet {
    pub const EMPTY: HookSet = HookSet(0);
    pub const ONCE: HookSet = HookSet(1 << 0);
    pub const NODE: HookSet = HookSet(1 << 1);
    pub const SYMBOL: HookSet = HookSet(1 << 2);
    pub const LINE: HookSet = HookSet(1 << 3);

    pub const fn merge(self, other: HookSet) -> HookSet {
        HookSet(self.0 | other.0)
    }

    pub const fn contains(self, other: HookSet) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Stable rule id, derived from the rule name at compile time (FNV-1a).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(u64);

impl RuleId {
    pub const fn from_name(name: &str) -> RuleId {
        let bytes = name.as_bytes();
        let mut hash = 0xcbf2_9ce4_8422_2325u64;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            i += 1;
        }
        RuleId(hash)
    }
}

/// Rule metadata. Implemented by [`declare_lint!`](crate::declare_lint).
pub trait Rule {
    fn name(&self) -> &'static str;
    fn category(&self) -> RuleCategory;
    fn default_level(&self) -> RuleLevel;
    fn fix_capability(&self) -> FixMeta;
    fn hooks(&self) -> HookSet;

    fn id(&self) -> RuleId {
        RuleId::from_name(self.name())
    }

    fn docs(&self) -> &'static str {
        ""
    }
}

/// The dispatch hooks. All default to doing nothing; [`Rule::hooks`]
/// advertises which ones a rule actually implements so the engine only
/// drives those.
#[allow(unused_variables)]
#[typetag::serde]
pub trait LintRule: Rule + DynClone + Send + Sync + std::fmt::Debug {
    /// Runs once per file, before anything else.
    fn run_once(&self, ctx: &mut RuleCtx<'_>) -> Option<()> {
        None
    }

    /// Runs for every AST node, in source order.
    fn run_on_node(&self, node: NodeId, ctx: &mut RuleCtx<'_>) -> Option<()> {
        None
    }

    /// Runs for every symbol, in insertion order.
    fn run_on_symbol(&self, symbol: SymbolId, ctx: &mut RuleCtx<'_>) -> Option<()> {
        None
    }

    /// Runs for every source line.
    fn run_on_line(&self, line: &Line<'_>, ctx: &mut RuleCtx<'_>) -> Option<()> {
        None
    }
}

dyn_clone::clone_trait_object!(LintRule);

/// Declare a lint rule: the struct (with optional config fields and their
/// defaults), its `Rule` impl, and its compile-time id.
///
/// ```ignore
/// declare_lint! {
///     /**
///     Disallows overly long lines.
///     */
///     LineLength,
///     Style,
///     Off,
///     NONE,
///     "line-length",
///     hooks: [LINE],
///     pub max_length: usize = 120
/// }
/// ```
#[macro_export]
macro_rules! declare_lint {
    (
        $(#[doc = $doc:expr])*
        $name:ident,
        $category:ident,
        $level:ident,
        $fix:ident,
        $code:expr,
        hooks: [$($hook:ident),+ $(,)?]
        $(, $(#[$field_meta:meta])* $field_vis:vis $field:ident : $field_ty:ty = $default:expr)*
        $(,)?
    ) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
        #[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
        #[serde(rename_all = "camelCase", default)]
        pub struct $name {
            $($(#[$field_meta])* $field_vis $field: $field_ty),*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $($field: $default),*
                }
            }
        }

        impl $name {
            pub const ID: $crate::RuleId = $crate::RuleId::from_name($code);
        }

        impl $crate::Rule for $name {
            fn name(&self) -> &'static str {
                $code
            }

            fn category(&self) -> $crate::RuleCategory {
                $crate::RuleCategory::$category
            }

            fn default_level(&self) -> $crate::RuleLevel {
                $crate::RuleLevel::$level
            }

            fn fix_capability(&self) -> $crate::FixMeta {
                $crate::FixMeta::$fix
            }

            fn hooks(&self) -> $crate::HookSet {
                $crate::HookSet::EMPTY$(.merge($crate::HookSet::$hook))+
            }

            fn id(&self) -> $crate::RuleId {
                Self::ID
            }

            fn docs(&self) -> &'static str {
                concat!($($doc, "\n"),*)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_ids_are_stable_and_distinct() {
        let a = RuleId::from_name("homeless-try");
        let b = RuleId::from_name("homeless-try");
        let c = RuleId::from_name("unused-decls");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn hook_sets_compose() {
        let hooks = HookSet::EMPTY.merge(HookSet::NODE).merge(HookSet::LINE);
        assert!(hooks.contains(HookSet::NODE));
        assert!(hooks.contains(HookSet::LINE));
        assert!(!hooks.contains(HookSet::ONCE));
        assert!(!hooks.contains(HookSet::SYMBOL));
    }
}
