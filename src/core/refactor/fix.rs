//! End-to-end namespace fix for one file.
//!
//! 1. Derive the expected namespace from the file's directory
//! 2. Compare with the declared one and rewrite the declaration if needed
//! 3. Locate files importing the file's class-like symbol
//! 4. Rewrite stale `use` lines in each candidate, one file at a time
//!
//! Files are written independently: a failure part-way leaves earlier writes
//! in place.

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::declaration::{extract_declaration, rewrite_declaration, DeclarationChange};
use super::locate::{locate_references, resolve_module_root, Located, SkipReason};
use super::namespace::{derive_namespace, NamespacePath};
use super::references::{rewrite_references, ReferenceEdit};
use super::search::ReferenceSearch;
use crate::convention::Convention;
use crate::error::{Error, Result};
use crate::output::BatchResult;
use crate::utils::io;

/// Run configuration.
#[derive(Debug, Clone, Default)]
pub struct FixOptions {
    pub convention: Convention,
    /// Explicit module root; inferred from the target path when absent.
    pub root: Option<PathBuf>,
    /// Compute everything, write nothing.
    pub dry_run: bool,
}

/// The rename carried out by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOperation {
    pub symbol: String,
    pub old_namespace: String,
    pub new_namespace: NamespacePath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeclarationStatus {
    Correct,
    Updated { change: DeclarationChange },
    /// Needed a change but the file has neither a declaration nor an open tag.
    Unanchored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchStatus {
    /// No class-like symbol, so nothing to propagate.
    NotRun,
    Skipped { reason: SkipReason },
    Completed { roots: Vec<String>, candidates: usize },
    Failed { error: String },
}

/// A candidate file whose imports were rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceSite {
    pub file: String,
    pub edits: Vec<ReferenceEdit>,
}

/// Summary of one run.
#[derive(Debug, Clone, Serialize)]
pub struct FixReport {
    pub file: String,
    pub symbol: Option<String>,
    pub current_namespace: String,
    pub expected_namespace: NamespacePath,
    pub declaration: DeclarationStatus,
    pub search: SearchStatus,
    pub references: BatchResult,
    pub sites: Vec<ReferenceSite>,
    pub dry_run: bool,
}

impl FixReport {
    /// Number of reference files modified (or that would be, in a dry run).
    pub fn updated_files(&self) -> usize {
        self.sites.len()
    }
}

/// Progress notifications, emitted in execution order.
#[derive(Debug, Clone)]
pub enum FixEvent {
    Analyzing {
        file: String,
    },
    Derived {
        directory: String,
        current: String,
        expected: String,
    },
    DeclarationCorrect,
    DeclarationUpdated {
        change: DeclarationChange,
    },
    DeclarationUnanchored,
    NoSymbol,
    SearchSkipped {
        reason: SkipReason,
    },
    Searching {
        symbol: String,
        roots: Vec<String>,
    },
    SearchFailed {
        error: Error,
    },
    ReferenceUpdated {
        file: String,
        edits: Vec<ReferenceEdit>,
    },
    ReferenceUnchanged {
        file: String,
    },
    ReferenceFailed {
        file: String,
        error: Error,
    },
    Completed {
        updated_files: usize,
    },
}

/// Fix the namespace of `target` and propagate the change to importers.
///
/// Errors only when the target itself cannot be read or written; search and
/// per-candidate failures are reported and do not abort the run.
pub fn fix_file(
    target: &Path,
    options: &FixOptions,
    search: &dyn ReferenceSearch,
    on_event: &mut dyn FnMut(&FixEvent),
) -> Result<FixReport> {
    let file = target.display().to_string();

    if !target.exists() {
        return Err(Error::file_not_found(file));
    }

    on_event(&FixEvent::Analyzing { file: file.clone() });

    let content = io::read_file(target, &format!("read {}", file))?;
    let directory = target.parent().unwrap_or_else(|| Path::new(""));
    let expected = derive_namespace(directory, &options.convention);
    let current = extract_declaration(&content);

    on_event(&FixEvent::Derived {
        directory: directory.display().to_string(),
        current: current.namespace.clone(),
        expected: expected.to_string(),
    });

    let declaration = if current.namespace == expected.to_string() {
        on_event(&FixEvent::DeclarationCorrect);
        DeclarationStatus::Correct
    } else {
        let edit = rewrite_declaration(&content, &expected);
        match edit.change {
            DeclarationChange::NoAnchor => {
                on_event(&FixEvent::DeclarationUnanchored);
                DeclarationStatus::Unanchored
            }
            change => {
                if !options.dry_run {
                    io::write_file(target, &edit.content, &format!("write {}", file))?;
                }
                on_event(&FixEvent::DeclarationUpdated { change });
                DeclarationStatus::Updated { change }
            }
        }
    };

    let mut report = FixReport {
        file,
        symbol: current.symbol_name.clone(),
        current_namespace: current.namespace.clone(),
        expected_namespace: expected.clone(),
        declaration,
        search: SearchStatus::NotRun,
        references: BatchResult::new(),
        sites: Vec::new(),
        dry_run: options.dry_run,
    };

    let Some(symbol) = current.symbol_name else {
        on_event(&FixEvent::NoSymbol);
        on_event(&FixEvent::Completed { updated_files: 0 });
        return Ok(report);
    };

    let operation = RenameOperation {
        symbol,
        old_namespace: current.namespace,
        new_namespace: expected,
    };

    let module_root = resolve_module_root(target, options.root.as_deref(), &options.convention);
    propagate(&operation, &module_root, options, search, &mut report, on_event);

    on_event(&FixEvent::Completed {
        updated_files: report.updated_files(),
    });
    Ok(report)
}

/// Locate importers and rewrite each one independently.
fn propagate(
    operation: &RenameOperation,
    module_root: &Path,
    options: &FixOptions,
    search: &dyn ReferenceSearch,
    report: &mut FixReport,
    on_event: &mut dyn FnMut(&FixEvent),
) {
    let located = match locate_references(
        &operation.symbol,
        module_root,
        &options.convention,
        search,
    ) {
        Ok(located) => located,
        Err(error) => {
            report.search = SearchStatus::Failed {
                error: error.summary(),
            };
            on_event(&FixEvent::SearchFailed { error });
            return;
        }
    };

    let (roots, files) = match located {
        Located::Candidates { roots, files } => (roots, files),
        Located::Skipped(reason) => {
            report.search = SearchStatus::Skipped {
                reason: reason.clone(),
            };
            on_event(&FixEvent::SearchSkipped { reason });
            return;
        }
    };

    let roots: Vec<String> = roots.iter().map(|r| r.display().to_string()).collect();
    on_event(&FixEvent::Searching {
        symbol: operation.symbol.clone(),
        roots: roots.clone(),
    });
    report.search = SearchStatus::Completed {
        roots,
        candidates: files.len(),
    };

    for path in &files {
        let file = path.display().to_string();
        match rewrite_candidate(path, operation, options.dry_run) {
            Ok(Some(edits)) => {
                report.references.record_updated(file.clone());
                report.sites.push(ReferenceSite {
                    file: file.clone(),
                    edits: edits.clone(),
                });
                on_event(&FixEvent::ReferenceUpdated { file, edits });
            }
            Ok(None) => {
                report.references.record_unchanged(file.clone());
                on_event(&FixEvent::ReferenceUnchanged { file });
            }
            Err(error) => {
                report.references.record_error(file.clone(), error.summary());
                on_event(&FixEvent::ReferenceFailed { file, error });
            }
        }
    }
}

/// Read, rewrite, and (unless dry-run) write one candidate.
/// Returns the edits when the content changed.
fn rewrite_candidate(
    path: &Path,
    operation: &RenameOperation,
    dry_run: bool,
) -> Result<Option<Vec<ReferenceEdit>>> {
    let content = io::read_file(path, &format!("read {}", path.display()))?;
    let rewrite = rewrite_references(
        &content,
        &operation.symbol,
        &operation.old_namespace,
        &operation.new_namespace,
    );

    if !rewrite.changed() {
        return Ok(None);
    }

    if !dry_run {
        io::write_file(path, &rewrite.content, &format!("write {}", path.display()))?;
    }

    Ok(Some(rewrite.edits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refactor::search::{ScanSearch, SearchQuery};
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn options(root: &Path) -> FixOptions {
        FixOptions {
            root: Some(root.to_path_buf()),
            ..FixOptions::default()
        }
    }

    fn run(target: &Path, options: &FixOptions) -> (FixReport, Vec<FixEvent>) {
        let mut events = Vec::new();
        let report = fix_file(target, options, &ScanSearch, &mut |e| events.push(e.clone()))
            .unwrap();
        (report, events)
    }

    struct FailingSearch;

    impl ReferenceSearch for FailingSearch {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn search(&self, _query: &SearchQuery) -> Result<Vec<PathBuf>> {
            Err(Error::search_failed("failing", Some(2), "disk on fire"))
        }
    }

    #[test]
    fn corrects_declaration_and_references() {
        let dir = TempDir::new().unwrap();
        let target = write(
            dir.path(),
            "wp-content/plugins/give/src/Api/Foo.php",
            "<?php\n\nnamespace Give\\Wrong;\n\nclass Foo {}\n",
        );
        let user = write(
            dir.path(),
            "wp-content/plugins/give/src/Forms/Bar.php",
            "<?php\n\nnamespace Give\\Forms;\n\nuse Give\\Wrong\\Foo;\n\nclass Bar {}\n",
        );

        let (report, events) = run(&target, &options(dir.path()));

        assert_eq!(report.expected_namespace.to_string(), "Give\\Api");
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "<?php\n\nnamespace Give\\Api;\n\nclass Foo {}\n"
        );
        assert_eq!(
            fs::read_to_string(&user).unwrap(),
            "<?php\n\nnamespace Give\\Forms;\n\nuse Give\\Api\\Foo;\n\nclass Bar {}\n"
        );
        assert_eq!(report.updated_files(), 1);
        assert!(matches!(events.first(), Some(FixEvent::Analyzing { .. })));
        assert!(matches!(
            events.last(),
            Some(FixEvent::Completed { updated_files: 1 })
        ));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let original = "<?php\nnamespace Give\\Wrong;\nclass Foo {}\n";
        let target = write(dir.path(), "wp-content/plugins/give/src/Api/Foo.php", original);
        let user_content = "<?php\nuse Give\\Wrong\\Foo;\n";
        let user = write(dir.path(), "wp-content/plugins/give/src/Bar.php", user_content);

        let opts = FixOptions {
            dry_run: true,
            ..options(dir.path())
        };
        let (report, _) = run(&target, &opts);

        assert!(report.dry_run);
        assert!(matches!(report.declaration, DeclarationStatus::Updated { .. }));
        assert_eq!(report.updated_files(), 1);
        assert_eq!(fs::read_to_string(&target).unwrap(), original);
        assert_eq!(fs::read_to_string(&user).unwrap(), user_content);
    }

    #[test]
    fn search_failure_keeps_target_fix() {
        let dir = TempDir::new().unwrap();
        let target = write(
            dir.path(),
            "wp-content/plugins/give/src/Api/Foo.php",
            "<?php\nnamespace Give\\Wrong;\nclass Foo {}\n",
        );

        let mut events = Vec::new();
        let report = fix_file(&target, &options(dir.path()), &FailingSearch, &mut |e| {
            events.push(e.clone())
        })
        .unwrap();

        assert!(matches!(report.search, SearchStatus::Failed { .. }));
        assert!(events
            .iter()
            .any(|e| matches!(e, FixEvent::SearchFailed { .. })));
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "<?php\nnamespace Give\\Api;\nclass Foo {}\n"
        );
    }

    #[test]
    fn unanchored_file_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let target = write(
            dir.path(),
            "wp-content/plugins/give/src/Api/Foo.php",
            "class Foo {}\n",
        );

        let (report, _) = run(&target, &options(dir.path()));
        assert_eq!(report.declaration, DeclarationStatus::Unanchored);
        assert_eq!(fs::read_to_string(&target).unwrap(), "class Foo {}\n");
    }

    #[test]
    fn unreadable_candidate_does_not_stop_others() {
        let dir = TempDir::new().unwrap();
        let target = write(
            dir.path(),
            "wp-content/plugins/give/src/Api/Foo.php",
            "<?php\nnamespace Give\\Api;\nclass Foo {}\n",
        );
        let good = write(
            dir.path(),
            "wp-content/plugins/give/src/B.php",
            "<?php\nuse Give\\Old\\Foo;\n",
        );

        struct ListedSearch(Vec<PathBuf>);
        impl ReferenceSearch for ListedSearch {
            fn name(&self) -> &'static str {
                "listed"
            }
            fn search(&self, _query: &SearchQuery) -> Result<Vec<PathBuf>> {
                Ok(self.0.clone())
            }
        }

        let missing = dir.path().join("wp-content/plugins/give/src/A.php");
        let search = ListedSearch(vec![missing, good.clone()]);
        let report = fix_file(&target, &options(dir.path()), &search, &mut |_| {}).unwrap();

        assert_eq!(report.references.errors, 1);
        assert_eq!(report.references.updated, 1);
        assert_eq!(
            fs::read_to_string(&good).unwrap(),
            "<?php\nuse Give\\Api\\Foo;\n"
        );
    }
}
