use serde::{Deserialize, Serialize};

use crate::{Span, Str};

/// What kind of rewrite a fix is.
///
/// A `Fix` is a change the linter is confident enough to apply under `--fix`.
/// A `Suggestion` is a possible change the user must opt into separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum FixKind {
    None,
    Fix,
    Suggestion,
}

impl Default for FixKind {
    fn default() -> Self {
        FixKind::None
    }
}

/// The `{kind, dangerous}` capability matrix.
///
/// Rules advertise one of these in their metadata, and the user's fix profile
/// is one of these too. [`FixMeta::can_apply`] decides whether a concrete fix
/// is acceptable under a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct FixMeta {
    pub kind: FixKind,
    pub dangerous: bool,
}

impl FixMeta {
    pub const NONE: FixMeta = FixMeta {
        kind: FixKind::None,
        dangerous: false,
    };
    pub const SAFE_FIX: FixMeta = FixMeta {
        kind: FixKind::Fix,
        dangerous: false,
    };
    pub const DANGEROUS_FIX: FixMeta = FixMeta {
        kind: FixKind::Fix,
        dangerous: true,
    };
    pub const SAFE_SUGGESTION: FixMeta = FixMeta {
        kind: FixKind::Suggestion,
        dangerous: false,
    };
    pub const DANGEROUS_SUGGESTION: FixMeta = FixMeta {
        kind: FixKind::Suggestion,
        dangerous: true,
    };

    /// Whether a fix described by `other` may be applied under this profile.
    ///
    /// The profile must want fixes at all, must match the fix's kind, and a
    /// dangerous fix additionally requires a dangerous profile.
    pub fn can_apply(self, other: FixMeta) -> bool {
        self.kind != FixKind::None && (self.dangerous || !other.dangerous) && self.kind == other.kind
    }

    pub fn is_none(self) -> bool {
        self.kind == FixKind::None
    }
}

/// A span-based text replacement attached to a diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fix {
    pub span: Span,
    pub replacement: Str,
    pub kind: FixKind,
    pub dangerous: bool,
}

impl Fix {
    pub fn new(span: Span, replacement: impl Into<Str>, meta: FixMeta) -> Self {
        Self {
            span,
            replacement: replacement.into(),
            kind: meta.kind,
            dangerous: meta.dangerous,
        }
    }

    pub fn meta(&self) -> FixMeta {
        FixMeta {
            kind: self.kind,
            dangerous: self.dangerous,
        }
    }

    /// An empty span with an empty replacement changes nothing.
    pub fn is_noop(&self) -> bool {
        self.span.is_empty() && self.replacement.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_matrix() {
        assert!(FixMeta::SAFE_FIX.can_apply(FixMeta::SAFE_FIX));
        assert!(FixMeta::DANGEROUS_FIX.can_apply(FixMeta::SAFE_FIX));
        assert!(FixMeta::DANGEROUS_FIX.can_apply(FixMeta::DANGEROUS_FIX));
        assert!(!FixMeta::SAFE_FIX.can_apply(FixMeta::DANGEROUS_FIX));
        assert!(!FixMeta::NONE.can_apply(FixMeta::SAFE_FIX));
        assert!(!FixMeta::SAFE_FIX.can_apply(FixMeta::SAFE_SUGGESTION));
        assert!(!FixMeta::SAFE_SUGGESTION.can_apply(FixMeta::SAFE_FIX));
    }

    #[test]
    fn noop_detection() {
        let noop = Fix::new(Span::empty(0), "", FixMeta::SAFE_FIX);
        assert!(noop.is_noop());

        // An empty span with a replacement is an insertion, not a no-op.
        let insert = Fix::new(Span::empty(0), "x", FixMeta::SAFE_FIX);
        assert!(!insert.is_noop());
    }
}
