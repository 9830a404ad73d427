//! Diagnostic primitives shared by every zlint crate.
//!
//! The linter's error currency is the [`Diagnostic`]: the parser emits them,
//! rules emit them, and the CLI reporter renders them. A diagnostic carries a
//! severity, a rule code, labeled source spans, an optional help string and an
//! optional [`Fix`]. Diagnostics hold a cheap-clone [`Source`] handle so they
//! can outlive the per-file pipeline that produced them.
//!
//! Messages, label text and help strings are [`Str`] values: either a
//! `'static` string that is free to clone, or an owned formatted string.

pub mod emitter;
pub mod file;

mod fix;
mod source;
mod span;

pub use fix::{Fix, FixKind, FixMeta};
pub use source::Source;
pub use span::{Label, Span};

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Copy-on-write string used for every human-readable part of a diagnostic.
pub type Str = Cow<'static, str>;

/// How serious a diagnostic is.
///
/// The ordering is meaningful: `Error > Warning > Note`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single report about a piece of source code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The rule name for lint findings, or `parse`/`analysis`/`io` for
    /// engine-level failures.
    pub code: Str,
    pub message: Str,
    /// Pathname of the file the diagnostic points into, if known.
    pub source_name: Option<String>,
    /// Handle on the source text the spans index into. Not serialized; the
    /// wire format carries offsets only.
    #[serde(skip)]
    pub source: Option<Source>,
    pub labels: Vec<Label>,
    pub help: Option<Str>,
    pub fix: Option<Fix>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: impl Into<Str>, message: impl Into<Str>) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            source_name: None,
            source: None,
            labels: Vec::new(),
            help: None,
            fix: None,
        }
    }

    pub fn error(code: impl Into<Str>, message: impl Into<Str>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn warning(code: impl Into<Str>, message: impl Into<Str>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn note(code: impl Into<Str>, message: impl Into<Str>) -> Self {
        Self::new(Severity::Note, code, message)
    }

    /// Attach the primary label, the span the diagnostic is "about".
    pub fn primary(mut self, span: impl Into<Span>, message: impl Into<Str>) -> Self {
        self.labels.push(Label::primary(span.into(), message.into()));
        self
    }

    /// Attach a secondary label pointing at related code.
    pub fn secondary(mut self, span: impl Into<Span>, message: impl Into<Str>) -> Self {
        self.labels
            .push(Label::secondary(span.into(), message.into()));
        self
    }

    pub fn help(mut self, help: impl Into<Str>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    pub fn with_source(mut self, source: Source) -> Self {
        if self.source_name.is_none() {
            self.source_name = source.pathname().map(|p| p.display().to_string());
        }
        self.source = Some(source);
        self
    }

    /// The span of the primary label, or of the first label if no label is
    /// marked primary, or an empty span at offset zero.
    pub fn primary_span(&self) -> Span {
        self.labels
            .iter()
            .find(|label| label.primary)
            .or_else(|| self.labels.first())
            .map(|label| label.span)
            .unwrap_or_default()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
