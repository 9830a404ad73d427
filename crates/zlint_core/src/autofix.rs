//! Applying fixes to a source buffer.
//!
//! Diagnostics carry optional span-based replacements. The applier filters
//! them against the user's fix profile, sorts by span start and applies
//! them in one left-to-right pass; when two fixes overlap, the first in
//! start order wins and the loser's diagnostic joins the unfixed residue.

use std::fmt;

use zlint_errors::{Diagnostic, Fix, FixMeta, Span, Str};
use zlint_syntax::{NodeId, TokenId};

use crate::semantic::Semantic;

/// What the fixer produced for one file.
#[derive(Debug)]
pub struct FixResult {
    /// Whether at least one fix was actually applied.
    pub did_fix: bool,
    /// The rewritten source; empty when `did_fix` is false.
    pub source: String,
    /// Diagnostics that had no fix, an unacceptable fix, or lost an
    /// overlap.
    pub unfixed: Vec<Diagnostic>,
}

/// Apply every acceptable fix in `diagnostics` to `source`.
pub fn apply_fixes(source: &str, diagnostics: Vec<Diagnostic>, profile: FixMeta) -> FixResult {
    let mut fixable = Vec::new();
    let mut unfixed = Vec::new();

    for diagnostic in diagnostics {
        let acceptable = diagnostic
            .fix
            .as_ref()
            .map_or(false, |fix| profile.can_apply(fix.meta()) && !fix.is_noop());
        if acceptable {
            fixable.push(diagnostic);
        } else {
            unfixed.push(diagnostic);
        }
    }

    fixable.sort_by_key(|diagnostic| fix_of(diagnostic).span.start);

    let mut out = String::new();
    let mut last_end = 0u32;
    let mut did_fix = false;
    for diagnostic in fixable {
        let fix = fix_of(&diagnostic);
        if fix.span.start < last_end {
            // Overlap: first span wins, this diagnostic stays unfixed.
            unfixed.push(diagnostic);
            continue;
        }
        out.push_str(&source[last_end as usize..fix.span.start as usize]);
        out.push_str(&fix.replacement);
        last_end = fix.span.end;
        did_fix = true;
    }

    if !did_fix {
        return FixResult {
            did_fix: false,
            source: String::new(),
            unfixed,
        };
    }
    out.push_str(&source[last_end as usize..]);
    FixResult {
        did_fix,
        source: out,
        unfixed,
    }
}

fn fix_of(diagnostic: &Diagnostic) -> &Fix {
    diagnostic
        .fix
        .as_ref()
        .expect("only diagnostics with fixes reach the applier")
}

/// Rule-side helper for building fixes. The builder carries the rule's
/// advertised capability so every fix it emits inherits the right kind and
/// danger bits.
pub struct FixBuilder<'a> {
    semantic: &'a Semantic,
    meta: FixMeta,
}

impl<'a> FixBuilder<'a> {
    pub(crate) fn new(semantic: &'a Semantic, meta: FixMeta) -> Self {
        Self { semantic, meta }
    }

    /// A fix that changes nothing; the applier drops it.
    pub fn noop(&self) -> Fix {
        Fix::new(Span::empty(0), "", self.meta)
    }

    pub fn delete(&self, span: Span) -> Fix {
        Fix::new(span, "", self.meta)
    }

    pub fn replace(&self, span: Span, replacement: impl Into<Str>) -> Fix {
        Fix::new(span, replacement.into(), self.meta)
    }

    pub fn replace_fmt(&self, span: Span, args: fmt::Arguments<'_>) -> Fix {
        Fix::new(span, args.to_string(), self.meta)
    }

    pub fn span_covering_node(&self, node: NodeId) -> Span {
        self.semantic.node_span(node)
    }

    pub fn span_covering_token(&self, token: TokenId) -> Span {
        self.semantic
            .tokens()
            .span(self.semantic.text(), token)
    }

    pub fn snippet_of_node(&self, node: NodeId) -> &'a str {
        self.semantic.node_text(node)
    }

    pub fn snippet_of_token(&self, token: TokenId) -> &'a str {
        self.semantic
            .tokens()
            .slice(self.semantic.text(), token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(span: Span, replacement: &'static str) -> Diagnostic {
        Diagnostic::warning("test-rule", "problem")
            .with_fix(Fix::new(span, replacement, FixMeta::SAFE_FIX))
    }

    #[test]
    fn no_fixes_yields_no_output() {
        let result = apply_fixes("source", vec![], FixMeta::SAFE_FIX);
        assert!(!result.did_fix);
        assert!(result.source.is_empty());
        assert!(result.unfixed.is_empty());
    }

    #[test]
    fn one_fix_splices_the_replacement() {
        let source = "0123456789";
        let result = apply_fixes(source, vec![fixed(Span::new(2, 5), "AB")], FixMeta::SAFE_FIX);
        assert!(result.did_fix);
        assert_eq!(result.source, "01AB56789");
        assert!(result.unfixed.is_empty());
    }

    #[test]
    fn non_overlapping_fixes_apply_in_any_input_order() {
        let source = "0123456789";
        let a = fixed(Span::new(0, 2), "X");
        let b = fixed(Span::new(5, 7), "Y");
        let forward = apply_fixes(source, vec![a.clone(), b.clone()], FixMeta::SAFE_FIX);
        let backward = apply_fixes(source, vec![b, a], FixMeta::SAFE_FIX);
        assert_eq!(forward.source, "X234Y789");
        assert_eq!(forward.source, backward.source);
    }

    #[test]
    fn overlapping_fixes_keep_the_first_in_start_order() {
        let source = "0123456789";
        let first = fixed(Span::new(0, 5), "A");
        let second = fixed(Span::new(3, 8), "B");
        let result = apply_fixes(source, vec![second, first], FixMeta::SAFE_FIX);
        assert!(result.did_fix);
        assert_eq!(result.source, "A56789");
        assert_eq!(result.unfixed.len(), 1);
    }

    #[test]
    fn empty_span_with_replacement_inserts() {
        let result = apply_fixes(
            "abc",
            vec![fixed(Span::empty(0), "zz")],
            FixMeta::SAFE_FIX,
        );
        assert_eq!(result.source, "zzabc");
    }

    #[test]
    fn noop_fixes_are_dropped_to_unfixed() {
        let result = apply_fixes("abc", vec![fixed(Span::empty(0), "")], FixMeta::SAFE_FIX);
        assert!(!result.did_fix);
        assert!(result.source.is_empty());
        assert_eq!(result.unfixed.len(), 1);
    }

    #[test]
    fn dangerous_fixes_need_a_dangerous_profile() {
        let dangerous = Diagnostic::warning("test-rule", "problem")
            .with_fix(Fix::new(Span::new(0, 1), "X", FixMeta::DANGEROUS_FIX));
        let timid = apply_fixes("abc", vec![dangerous.clone()], FixMeta::SAFE_FIX);
        assert!(!timid.did_fix);
        assert_eq!(timid.unfixed.len(), 1);

        let bold = apply_fixes("abc", vec![dangerous], FixMeta::DANGEROUS_FIX);
        assert!(bold.did_fix);
        assert_eq!(bold.source, "Xbc");
    }
}
