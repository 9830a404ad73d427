use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::Span;

/// A source file's text plus its pathname.
///
/// Cloning is an `Arc` bump, which is what lets diagnostics keep the text
/// alive after the per-file pipeline that read it has finished.
#[derive(Debug, Clone)]
pub struct Source {
    inner: Arc<SourceInner>,
}

#[derive(Debug)]
struct SourceInner {
    text: String,
    pathname: Option<PathBuf>,
}

impl Source {
    pub fn new(text: String, pathname: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(SourceInner { text, pathname }),
        }
    }

    /// An in-memory source with no pathname, mostly for tests.
    pub fn anonymous(text: impl Into<String>) -> Self {
        Self::new(text.into(), None)
    }

    pub fn text(&self) -> &str {
        &self.inner.text
    }

    pub fn len(&self) -> usize {
        self.inner.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.text.is_empty()
    }

    pub fn pathname(&self) -> Option<&Path> {
        self.inner.pathname.as_deref()
    }

    /// The pathname if there is one, otherwise a placeholder.
    pub fn name(&self) -> Cow<'_, str> {
        match self.pathname() {
            Some(path) => path.to_string_lossy(),
            None => Cow::Borrowed("<input>"),
        }
    }

    /// The text covered by `span`. Out-of-bounds spans yield an empty slice
    /// rather than panicking; a diagnostic with a bad span is still worth
    /// printing.
    pub fn slice(&self, span: Span) -> &str {
        self.inner.text.get(span.range()).unwrap_or("")
    }
}

impl PartialEq for Source {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Source {}
