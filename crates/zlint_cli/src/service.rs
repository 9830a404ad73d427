//! The parallel lint service.
//!
//! A bounded rayon pool runs the per-file pipeline: open, read, build the
//! semantic model, lint, optionally fix, and hand the survivors to the
//! shared reporter. One linter instance (rule store plus config) is shared
//! by every worker as an immutable read; the pipeline's buffers are
//! per-file and die with the task.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use zlint_core::{apply_fixes, lint_source, FixMeta, Linter, Source};

use crate::reporter::Reporter;

pub struct LintService {
    linter: Arc<Linter>,
    pool: rayon::ThreadPool,
    fix_profile: FixMeta,
    reporter: Arc<Reporter>,
}

impl LintService {
    pub fn new(
        linter: Linter,
        threads: Option<usize>,
        fix_profile: FixMeta,
        reporter: Arc<Reporter>,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        let threads = threads.unwrap_or_else(num_cpus::get);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("zlint-worker-{}", index))
            .build()?;
        Ok(Self {
            linter: Arc::new(linter),
            pool,
            fix_profile,
            reporter,
        })
    }

    /// Lint every file, distributing the per-file pipelines over the
    /// pool. Each worker takes ownership of the paths it processes.
    pub fn run(&self, files: Vec<PathBuf>) {
        self.pool.install(|| {
            files
                .into_par_iter()
                .for_each(|path| self.process_file(path));
        });
    }

    fn process_file(&self, path: PathBuf) {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) => {
                self.reporter.report_io_error(&path, &error);
                return;
            }
        };
        self.reporter.tick_processed();
        if text.is_empty() {
            return;
        }

        let source = Source::new(text, Some(path.clone()));
        let result = lint_source(&source, &self.linter);
        if !result.parser_diagnostics.is_empty() {
            self.reporter.report(result.parser_diagnostics);
            return;
        }

        let mut diagnostics = result.diagnostics;
        if !self.fix_profile.is_none() {
            let fixed = apply_fixes(source.text(), diagnostics, self.fix_profile);
            if fixed.did_fix {
                if let Err(error) = write_in_place(&path, &fixed.source) {
                    self.reporter.report_io_error(&path, &error);
                }
            }
            diagnostics = fixed.unfixed;
        }
        self.reporter.report(diagnostics);
    }
}

/// Write-then-rename so a crash mid-write never truncates the original.
fn write_in_place(path: &Path, contents: &str) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".zlint-tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::Buffer;
    use zlint_core::RuleStore;

    fn make_service(threads: usize, fix_profile: FixMeta) -> (LintService, Arc<Reporter>) {
        let reporter = Arc::new(Reporter::new(Box::new(Buffer::no_color())));
        let service = LintService::new(
            Linter::new(RuleStore::new().builtins()),
            Some(threads),
            fix_profile,
            Arc::clone(&reporter),
        )
        .unwrap();
        (service, reporter)
    }

    fn write_fixtures(dir: &Path) -> Vec<PathBuf> {
        let fixtures = [
            ("one.zig", "fn foo() void { _ = try bar(); }\n"),
            ("two.zig", "const unused = 1;\npub const kept = 2;\n"),
            ("three.zig", "fn ok() !void { try bar(); }\n"),
            ("empty.zig", ""),
        ];
        fixtures
            .iter()
            .map(|(name, contents)| {
                let path = dir.join(name);
                fs::write(&path, contents).unwrap();
                path
            })
            .collect()
    }

    fn emission_key(reporter: &Reporter) -> Vec<(String, String, u32, u32, String)> {
        let mut keys: Vec<_> = reporter
            .diagnostics()
            .into_iter()
            .map(|diagnostic| {
                let span = diagnostic.primary_span();
                (
                    diagnostic.source_name.clone().unwrap_or_default(),
                    diagnostic.code.to_string(),
                    span.start,
                    span.end,
                    diagnostic.message.to_string(),
                )
            })
            .collect();
        keys.sort();
        keys
    }

    #[test]
    fn parallel_runs_emit_the_same_diagnostic_multiset() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_fixtures(dir.path());

        let (serial, serial_reporter) = make_service(1, FixMeta::NONE);
        serial.run(files.clone());

        let (parallel, parallel_reporter) = make_service(4, FixMeta::NONE);
        parallel.run(files);

        assert_eq!(
            emission_key(&serial_reporter),
            emission_key(&parallel_reporter)
        );
        assert_eq!(
            serial_reporter.stats().files_processed,
            parallel_reporter.stats().files_processed
        );
    }

    #[test]
    fn io_failures_become_file_level_diagnostics() {
        let (service, reporter) = make_service(1, FixMeta::NONE);
        service.run(vec![PathBuf::from("/zlint/does/not/exist.zig")]);
        let diagnostics = reporter.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "io");
        assert_eq!(reporter.stats().errors_emitted, 1);
    }

    #[test]
    fn fix_mode_rewrites_files_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixable.zig");
        fs::write(&path, "const x = 1;\nconst y = 2;\npub const z = x + 1;\n").unwrap();

        let (service, reporter) = make_service(1, FixMeta::DANGEROUS_FIX);
        service.run(vec![path.clone()]);

        let rewritten = fs::read_to_string(&path).unwrap();
        assert_eq!(rewritten, "const x = 1;\npub const z = x + 1;\n");
        // The applied fix's diagnostic is consumed, not reported.
        assert!(reporter
            .diagnostics()
            .iter()
            .all(|diagnostic| diagnostic.code != "unused-decls"));
    }

    #[test]
    fn parse_failures_report_and_skip_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.zig");
        fs::write(&path, "const = 1;\n").unwrap();

        let (service, reporter) = make_service(2, FixMeta::NONE);
        service.run(vec![path]);
        let diagnostics = reporter.diagnostics();
        assert!(!diagnostics.is_empty());
        assert!(diagnostics.iter().all(|diagnostic| diagnostic.code == "parse"));
    }
}
