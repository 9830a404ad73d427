//! The shared diagnostic sink and run counters.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use termcolor::WriteColor;
use zlint_core::{Diagnostic, Severity};
use zlint_errors::emitter::Emitter;

/// Aggregated counts for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stats {
    pub files_processed: usize,
    pub files_with_errors: usize,
    pub diagnostics_emitted: usize,
    pub errors_emitted: usize,
}

/// Shared by every worker: atomic counters plus a mutex-protected sink.
///
/// Diagnostics are also retained so callers (and tests) can inspect the
/// run after the fact; the per-file pipeline's buffers are gone by then.
pub struct Reporter {
    files_processed: AtomicUsize,
    files_with_errors: AtomicUsize,
    diagnostics_emitted: AtomicUsize,
    errors_emitted: AtomicUsize,
    sink: Mutex<Box<dyn WriteColor + Send>>,
    collected: Mutex<Vec<Diagnostic>>,
}

impl Reporter {
    pub fn new(sink: Box<dyn WriteColor + Send>) -> Self {
        Self {
            files_processed: AtomicUsize::new(0),
            files_with_errors: AtomicUsize::new(0),
            diagnostics_emitted: AtomicUsize::new(0),
            errors_emitted: AtomicUsize::new(0),
            sink: Mutex::new(sink),
            collected: Mutex::new(Vec::new()),
        }
    }

    /// Emit one file's diagnostics as a batch, ordered by span within the
    /// file. Cross-file order is whatever the workers produce.
    pub fn report(&self, mut diagnostics: Vec<Diagnostic>) {
        if diagnostics.is_empty() {
            return;
        }
        diagnostics.sort_by_key(|diagnostic| diagnostic.primary_span().start);

        let errors = diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Error)
            .count();
        self.diagnostics_emitted
            .fetch_add(diagnostics.len(), Ordering::Relaxed);
        self.errors_emitted.fetch_add(errors, Ordering::Relaxed);
        if errors > 0 {
            self.files_with_errors.fetch_add(1, Ordering::Relaxed);
        }

        {
            let mut sink = self.sink.lock().unwrap();
            let mut emitter = Emitter::new(&mut **sink);
            for diagnostic in &diagnostics {
                if let Err(error) = emitter.emit(diagnostic) {
                    log::warn!("failed to write a diagnostic: {}", error);
                }
            }
        }

        self.collected.lock().unwrap().extend(diagnostics);
    }

    /// Record a file-level I/O failure as a diagnostic.
    pub fn report_io_error(&self, path: &Path, error: &std::io::Error) {
        let mut diagnostic = Diagnostic::error("io", error.to_string());
        diagnostic.source_name = Some(path.display().to_string());
        self.report(vec![diagnostic]);
    }

    pub fn tick_processed(&self) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> Stats {
        Stats {
            files_processed: self.files_processed.load(Ordering::Relaxed),
            files_with_errors: self.files_with_errors.load(Ordering::Relaxed),
            diagnostics_emitted: self.diagnostics_emitted.load(Ordering::Relaxed),
            errors_emitted: self.errors_emitted.load(Ordering::Relaxed),
        }
    }

    /// Every diagnostic reported so far, in emission order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.collected.lock().unwrap().clone()
    }
}
