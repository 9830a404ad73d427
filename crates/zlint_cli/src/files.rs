//! Discovering the `.zig` files to lint.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Compile the config's ignore globs.
pub fn compile_ignore(patterns: &[String]) -> Result<Vec<glob::Pattern>, glob::PatternError> {
    patterns
        .iter()
        .map(|pattern| glob::Pattern::new(pattern))
        .collect()
}

fn is_ignored(path: &Path, ignore: &[glob::Pattern]) -> bool {
    ignore.iter().any(|pattern| pattern.matches_path(path))
}

fn is_zig_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "zig")
}

/// Walk `paths` and collect every `.zig` file not matched by an ignore
/// pattern. A nonexistent explicit path is an invocation error;
/// unreadable entries deeper in the walk are logged and skipped.
pub fn collect_files(paths: &[PathBuf], ignore: &[glob::Pattern]) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file or directory: {}", path.display()),
            ));
        }
        if path.is_file() {
            if !is_ignored(path, ignore) {
                files.push(path.clone());
            }
            continue;
        }
        for entry in WalkDir::new(path) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    log::warn!("skipping unreadable entry: {}", error);
                    continue;
                }
            };
            if entry.file_type().is_file()
                && is_zig_file(entry.path())
                && !is_ignored(entry.path(), ignore)
            {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn collects_zig_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("src");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("a.zig"), "const a = 1;").unwrap();
        fs::write(nested.join("b.zig"), "const b = 1;").unwrap();
        fs::write(nested.join("notes.txt"), "not zig").unwrap();

        let files = collect_files(&[dir.path().to_path_buf()], &[]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|path| is_zig_file(path)));
    }

    #[test]
    fn ignore_patterns_filter_the_walk() {
        let dir = tempfile::tempdir().unwrap();
        let vendored = dir.path().join("vendor");
        fs::create_dir(&vendored).unwrap();
        fs::write(dir.path().join("a.zig"), "const a = 1;").unwrap();
        fs::write(vendored.join("dep.zig"), "const dep = 1;").unwrap();

        let ignore = compile_ignore(&["**/vendor/**".to_string()]).unwrap();
        let files = collect_files(&[dir.path().to_path_buf()], &ignore).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.zig"));
    }

    #[test]
    fn missing_paths_are_invocation_errors() {
        let result = collect_files(&[PathBuf::from("/definitely/not/here")], &[]);
        assert!(result.is_err());
    }
}
