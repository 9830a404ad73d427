//! CLI crate and glue for the zlint project.
//!
//! Everything user-facing lives here: argument parsing, the JSON config
//! loader, file discovery, the parallel lint service and the shared
//! reporter. The actual linting is `zlint_core`'s job.

pub mod config;
pub mod files;
pub mod reporter;
pub mod service;

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use structopt::StructOpt;
use termcolor::{ColorChoice, StandardStream};
use zlint_core::{FixKind, FixMeta, Linter, Rule};

use crate::config::Config;
use crate::reporter::Reporter;
use crate::service::LintService;

/// Exit code when the run produced no error-severity findings.
pub const EXIT_OK: i32 = 0;
/// Exit code when at least one error-severity finding was emitted.
pub const EXIT_FINDINGS: i32 = 1;
/// Exit code for invocation, config or I/O failures.
pub const EXIT_INVOCATION: i32 = 2;

#[derive(Debug, StructOpt)]
#[structopt(name = "zlint", about = "A linter for the Zig programming language")]
pub struct Options {
    /// Files or directories to lint; defaults to the current directory.
    pub paths: Vec<PathBuf>,

    /// Apply fixes and rewrite files in place.
    #[structopt(long)]
    pub fix: bool,

    /// Also apply fixes marked dangerous. Implies --fix.
    #[structopt(long = "dangerous-fixes")]
    pub dangerous_fixes: bool,

    /// Number of worker threads; defaults to the number of CPUs.
    #[structopt(long, short = "j")]
    pub threads: Option<usize>,

    /// Path to a JSON config file; defaults to ./zlint.json when present.
    #[structopt(long)]
    pub config: Option<PathBuf>,

    /// List every registered rule and exit.
    #[structopt(long = "list-rules")]
    pub list_rules: bool,
}

impl Options {
    fn fix_profile(&self) -> FixMeta {
        if self.fix || self.dangerous_fixes {
            FixMeta {
                kind: FixKind::Fix,
                dangerous: self.dangerous_fixes,
            }
        } else {
            FixMeta::NONE
        }
    }
}

pub fn run(options: Options) -> i32 {
    if options.list_rules {
        for rule in zlint_core::rules::all() {
            println!(
                "{:<20} {:?} (default: {:?})",
                rule.name(),
                rule.category(),
                rule.default_level()
            );
        }
        return EXIT_OK;
    }

    let config = match Config::load(options.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{} {}", "error:".red().bold(), error);
            return EXIT_INVOCATION;
        }
    };

    let ignore = match files::compile_ignore(&config.ignore) {
        Ok(ignore) => ignore,
        Err(error) => {
            eprintln!("{} invalid ignore pattern: {}", "error:".red().bold(), error);
            return EXIT_INVOCATION;
        }
    };

    let store = match config.into_store() {
        Ok(store) => store,
        Err(error) => {
            eprintln!("{} {}", "error:".red().bold(), error);
            return EXIT_INVOCATION;
        }
    };

    let paths = if options.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        options.paths.clone()
    };
    let files = match files::collect_files(&paths, &ignore) {
        Ok(files) => files,
        Err(error) => {
            eprintln!("{} {}", "error:".red().bold(), error);
            return EXIT_INVOCATION;
        }
    };

    let reporter = Arc::new(Reporter::new(Box::new(StandardStream::stderr(
        ColorChoice::Auto,
    ))));
    let service = match LintService::new(
        Linter::new(store),
        options.threads,
        options.fix_profile(),
        Arc::clone(&reporter),
    ) {
        Ok(service) => service,
        Err(error) => {
            eprintln!("{} failed to start workers: {}", "error:".red().bold(), error);
            return EXIT_INVOCATION;
        }
    };

    service.run(files);

    let stats = reporter.stats();
    log::debug!(
        "linted {} files, {} with errors, {} diagnostics",
        stats.files_processed,
        stats.files_with_errors,
        stats.diagnostics_emitted
    );
    if stats.errors_emitted > 0 {
        EXIT_FINDINGS
    } else {
        EXIT_OK
    }
}
