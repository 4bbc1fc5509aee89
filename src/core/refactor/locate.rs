//! Candidate discovery for reference propagation.
//!
//! Only plugin roots whose directory name matches the convention alias are
//! searched, and dependency/build/test/asset directories are skipped at any
//! depth. The actual text search is delegated to a [`ReferenceSearch`].

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::search::{ReferenceSearch, SearchQuery};
use crate::convention::Convention;
use crate::error::{Error, Result};

/// Why no search was run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// `<module_root>/<plugins_dir>` does not exist.
    NoPluginsDir { path: String },
    /// No plugin directory name matches the alias.
    NoMatchingRoots { path: String },
    /// Matching roots exist but none has a configured source subdirectory.
    NoSourceDirs,
}

/// Outcome of locating candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    Candidates {
        roots: Vec<PathBuf>,
        files: Vec<PathBuf>,
    },
    Skipped(SkipReason),
}

/// Pick the module root for a run.
///
/// An explicit root always wins. Otherwise, when the target path runs
/// through `<plugins_dir>/` (or just its last component, as in a bare
/// `plugins/` tree), everything before it is the module root. Failing all,
/// the current directory is used.
pub fn resolve_module_root(
    target: &Path,
    explicit: Option<&Path>,
    convention: &Convention,
) -> PathBuf {
    if let Some(root) = explicit {
        return root.to_path_buf();
    }

    let normalized = target.to_string_lossy().replace('\\', "/");

    prefix_before(&normalized, convention.plugins_dir.trim_matches('/'))
        .or_else(|| prefix_before(&normalized, convention.plugins_leaf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Directory in front of the first whole-segment occurrence of `dir/`.
fn prefix_before(path: &str, dir: &str) -> Option<PathBuf> {
    if dir.is_empty() {
        return None;
    }

    let needle = format!("{}/", dir);
    if path.starts_with(&needle) {
        return Some(PathBuf::from("."));
    }

    match path.find(&format!("/{}", needle))? {
        0 => Some(PathBuf::from("/")),
        pos => Some(PathBuf::from(&path[..pos])),
    }
}

/// The directory holding plugin roots: `<module_root>/<plugins_dir>`, or
/// `<module_root>/<last component>` when only that exists.
fn plugins_directory(module_root: &Path, convention: &Convention) -> Option<PathBuf> {
    let full = module_root.join(&convention.plugins_dir);
    if full.is_dir() {
        return Some(full);
    }

    let leaf = module_root.join(convention.plugins_leaf());
    if leaf != full && leaf.is_dir() {
        return Some(leaf);
    }

    None
}

/// Directories to search: alias-matching plugin roots, narrowed to the
/// configured source subdirectories when there are any.
pub fn search_roots(
    module_root: &Path,
    convention: &Convention,
) -> Result<std::result::Result<Vec<PathBuf>, SkipReason>> {
    let Some(plugins_dir) = plugins_directory(module_root, convention) else {
        return Ok(Err(SkipReason::NoPluginsDir {
            path: module_root.join(&convention.plugins_dir).display().to_string(),
        }));
    };

    let entries = fs::read_dir(&plugins_dir).map_err(|e| {
        Error::search_failed(
            "locate",
            None,
            format!("read {}: {}", plugins_dir.display(), e),
        )
    })?;

    let mut plugin_roots: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            convention.matches_alias(&name) && !convention.is_excluded(&name)
        })
        .map(|entry| entry.path())
        .collect();
    plugin_roots.sort();

    if plugin_roots.is_empty() {
        return Ok(Err(SkipReason::NoMatchingRoots {
            path: plugins_dir.display().to_string(),
        }));
    }

    if convention.source_dirs.is_empty() {
        return Ok(Ok(plugin_roots));
    }

    let narrowed: Vec<PathBuf> = plugin_roots
        .iter()
        .flat_map(|root| convention.source_dirs.iter().map(move |dir| root.join(dir)))
        .filter(|dir| dir.is_dir())
        .collect();

    if narrowed.is_empty() {
        return Ok(Err(SkipReason::NoSourceDirs));
    }

    Ok(Ok(narrowed))
}

/// Find files that import `symbol` under the module's plugin roots.
///
/// Returns sorted, deduplicated paths. A failing search backend is an error;
/// a missing or empty search scope is not.
pub fn locate_references(
    symbol: &str,
    module_root: &Path,
    convention: &Convention,
    search: &dyn ReferenceSearch,
) -> Result<Located> {
    let roots = match search_roots(module_root, convention)? {
        Ok(roots) => roots,
        Err(reason) => return Ok(Located::Skipped(reason)),
    };

    log_status!(
        "locate",
        "Searching {} root(s) with {}: {}",
        roots.len(),
        search.name(),
        roots
            .iter()
            .map(|r| r.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let query = SearchQuery {
        roots: roots.clone(),
        exclude_dirs: convention.exclude_dirs.clone(),
        extension: convention.extension.clone(),
        symbol: symbol.to_string(),
    };

    let mut files = search.search(&query)?;
    files.sort();
    files.dedup();

    log_status!("locate", "{} candidate file(s)", files.len());

    Ok(Located::Candidates { roots, files })
}
