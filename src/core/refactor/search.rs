//! Search backends that find files importing a symbol.
//!
//! The locator only needs "which files under these roots, minus these
//! directories, contain an import of this symbol". [`ScanSearch`] answers that
//! in-process; [`GrepSearch`] delegates to the system `grep`.

use regex::bytes::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::utils::command;

/// What to search for and where.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Directories to search recursively.
    pub roots: Vec<PathBuf>,
    /// Directory names to skip at any depth.
    pub exclude_dirs: Vec<String>,
    /// File extension to include, without the dot.
    pub extension: String,
    /// Symbol whose imports are searched for.
    pub symbol: String,
}

/// Capability: find candidate files for a query.
///
/// "No matches" is `Ok(vec![])`. Any other failure is an error so callers
/// never act on a partial file list.
pub trait ReferenceSearch {
    fn name(&self) -> &'static str;
    fn search(&self, query: &SearchQuery) -> Result<Vec<PathBuf>>;
}

/// Which backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchBackend {
    #[default]
    Scan,
    Grep,
}

impl SearchBackend {
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "scan" => Ok(SearchBackend::Scan),
            "grep" => Ok(SearchBackend::Grep),
            _ => Err(Error::validation_invalid_argument(
                "search",
                format!("Unknown search backend '{}'. Use: scan, grep", s),
                Some(vec!["scan".to_string(), "grep".to_string()]),
            )),
        }
    }

    pub fn build(&self) -> Box<dyn ReferenceSearch> {
        match self {
            SearchBackend::Scan => Box::new(ScanSearch),
            SearchBackend::Grep => Box::new(GrepSearch::default()),
        }
    }
}

// ============================================================================
// In-process scan
// ============================================================================

/// Recursive directory walk with a per-file regex test.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanSearch;

impl ReferenceSearch for ScanSearch {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn search(&self, query: &SearchQuery) -> Result<Vec<PathBuf>> {
        let pattern = format!(r"\buse\s+[^\n;]*\\{}\b", regex::escape(&query.symbol));
        let re = Regex::new(&pattern)
            .map_err(|e| Error::search_failed(self.name(), None, e.to_string()))?;

        let mut files = Vec::new();
        for root in &query.roots {
            walk_recursive(root, query, &mut files)?;
        }

        let mut matches = Vec::new();
        for file in files {
            let content = fs::read(&file).map_err(|e| {
                Error::search_failed(
                    self.name(),
                    None,
                    format!("read {}: {}", file.display(), e),
                )
            })?;
            if re.is_match(&content) {
                matches.push(file);
            }
        }

        Ok(matches)
    }
}

fn walk_recursive(dir: &Path, query: &SearchQuery, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| walk_error(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| walk_error(dir, e))?;
        let path = entry.path();
        // Symlinks are not followed, matching `grep -r`.
        let file_type = entry.file_type().map_err(|e| walk_error(&path, e))?;

        if file_type.is_dir() {
            let name = entry.file_name().to_string_lossy().to_string();
            if query.exclude_dirs.iter().any(|d| *d == name) {
                continue;
            }
            walk_recursive(&path, query, files)?;
        } else if file_type.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(query.extension.as_str())
        {
            files.push(path);
        }
    }

    Ok(())
}

fn walk_error(path: &Path, e: std::io::Error) -> Error {
    Error::search_failed("scan", None, format!("read {}: {}", path.display(), e))
}

// ============================================================================
// External grep
// ============================================================================

/// `grep -r -l` over the roots. Exit status 1 means "no matches".
#[derive(Debug, Clone)]
pub struct GrepSearch {
    pub program: String,
}

impl Default for GrepSearch {
    fn default() -> Self {
        Self {
            program: "grep".to_string(),
        }
    }
}

impl GrepSearch {
    fn args(query: &SearchQuery) -> Vec<String> {
        let mut args = vec![
            "-r".to_string(),
            "-l".to_string(),
            "-E".to_string(),
            format!("--include=*.{}", query.extension),
        ];
        args.extend(
            query
                .exclude_dirs
                .iter()
                .map(|d| format!("--exclude-dir={}", d)),
        );
        args.push("-e".to_string());
        args.push(format!(
            r"use[[:space:]][^;]*\\{}([^[:alnum:]_]|$)",
            regex::escape(&query.symbol)
        ));
        args.push("--".to_string());
        args.extend(query.roots.iter().map(|r| r.to_string_lossy().to_string()));
        args
    }
}

impl ReferenceSearch for GrepSearch {
    fn name(&self) -> &'static str {
        "grep"
    }

    fn search(&self, query: &SearchQuery) -> Result<Vec<PathBuf>> {
        if query.roots.is_empty() {
            return Ok(Vec::new());
        }

        let args = Self::args(query);
        let output = command::run_captured(&self.program, &args, "grep references")
            .map_err(|e| Error::search_failed(self.name(), None, e.summary()))?;

        match output.exit_code {
            Some(0) => Ok(output
                .stdout
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(PathBuf::from)
                .collect()),
            Some(1) => Ok(Vec::new()),
            code => Err(Error::search_failed(self.name(), code, output.stderr)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn query(root: &Path, symbol: &str) -> SearchQuery {
        SearchQuery {
            roots: vec![root.to_path_buf()],
            exclude_dirs: vec!["vendor".to_string(), "node_modules".to_string()],
            extension: "php".to_string(),
            symbol: symbol.to_string(),
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn backend_from_str() {
        assert_eq!(SearchBackend::from_str("scan").unwrap(), SearchBackend::Scan);
        assert_eq!(SearchBackend::from_str("grep").unwrap(), SearchBackend::Grep);
        let err = SearchBackend::from_str("ripgrep").unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn scan_finds_import_lines() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/A.php", "<?php\nuse Give\\Wrong\\Foo;\n");
        write(dir.path(), "src/B.php", "<?php\nuse Give\\Wrong\\FooBar;\n");
        write(dir.path(), "src/C.php", "<?php\n$x = new Foo();\n");
        write(dir.path(), "src/D.txt", "use Give\\Wrong\\Foo;\n");

        let mut found = ScanSearch.search(&query(dir.path(), "Foo")).unwrap();
        found.sort();
        assert_eq!(found, vec![dir.path().join("src/A.php")]);
    }

    #[test]
    fn scan_skips_excluded_dirs_at_any_depth() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "vendor/lib/A.php", "use Give\\Wrong\\Foo;\n");
        write(dir.path(), "src/deep/node_modules/B.php", "use Give\\Wrong\\Foo;\n");
        write(dir.path(), "src/deep/C.php", "use Give\\Wrong\\Foo;\n");

        let found = ScanSearch.search(&query(dir.path(), "Foo")).unwrap();
        assert_eq!(found, vec![dir.path().join("src/deep/C.php")]);
    }

    #[test]
    fn scan_with_no_matches_is_empty() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/A.php", "<?php\nclass A {}\n");

        let found = ScanSearch.search(&query(dir.path(), "Foo")).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn scan_missing_root_is_a_failure() {
        let dir = TempDir::new().unwrap();
        let err = ScanSearch
            .search(&query(&dir.path().join("missing"), "Foo"))
            .unwrap_err();
        assert_eq!(err.code.as_str(), "search.failed");
    }

    #[test]
    fn walk_errors_name_the_path() {
        let err = walk_error(
            Path::new("/site/plugins/give/locked"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.code.as_str(), "search.failed");
        assert_eq!(err.details["backend"], "scan");
        assert!(err.summary().contains("/site/plugins/give/locked"));
    }

    #[test]
    fn grep_finds_imports_and_skips_excluded_dirs() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/A.php", "<?php\nuse Give\\Wrong\\Foo;\n");
        write(dir.path(), "src/B.php", "<?php\nuse Give\\Wrong\\FooBar;\n");
        write(dir.path(), "vendor/lib/C.php", "<?php\nuse Give\\Wrong\\Foo;\n");

        let found = GrepSearch::default()
            .search(&query(dir.path(), "Foo"))
            .unwrap();
        assert_eq!(found, vec![dir.path().join("src/A.php")]);
    }

    #[test]
    fn grep_without_matches_is_empty() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/A.php", "<?php\nclass A {}\n");

        let found = GrepSearch::default()
            .search(&query(dir.path(), "Foo"))
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn grep_missing_root_is_a_failure() {
        let dir = TempDir::new().unwrap();
        let err = GrepSearch::default()
            .search(&query(&dir.path().join("missing"), "Foo"))
            .unwrap_err();
        assert_eq!(err.code.as_str(), "search.failed");
        assert_eq!(err.details["backend"], "grep");
    }

    #[test]
    fn grep_args_carry_filters() {
        let q = query(Path::new("/site/wp-content/plugins/give"), "Foo");
        let args = GrepSearch::args(&q);
        assert!(args.contains(&"--include=*.php".to_string()));
        assert!(args.contains(&"--exclude-dir=vendor".to_string()));
        assert!(args.contains(&"--exclude-dir=node_modules".to_string()));
        assert_eq!(args.last().unwrap(), "/site/wp-content/plugins/give");
    }

    #[test]
    fn grep_spawn_failure_is_a_search_failure() {
        let dir = TempDir::new().unwrap();
        let grep = GrepSearch {
            program: "nonexistent_grep_xyz".to_string(),
        };
        let err = grep.search(&query(dir.path(), "Foo")).unwrap_err();
        assert_eq!(err.code.as_str(), "search.failed");
    }

    #[test]
    fn grep_without_roots_is_empty() {
        let q = SearchQuery {
            roots: Vec::new(),
            exclude_dirs: Vec::new(),
            extension: "php".to_string(),
            symbol: "Foo".to_string(),
        };
        assert!(GrepSearch::default().search(&q).unwrap().is_empty());
    }
}
