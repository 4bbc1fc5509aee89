//! Rewriting of `use` statements that import a moved symbol.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use super::declaration::with_line_ending;
use super::namespace::NamespacePath;

/// Why a `use` line was rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceEditKind {
    /// The import pointed at the namespace the target declared before the run.
    Renamed,
    /// The import pointed at some other stale namespace.
    Healed,
}

/// A single rewritten `use` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceEdit {
    /// Line number (1-indexed).
    pub line: usize,
    /// Namespace the import pointed at before the rewrite.
    pub from: String,
    pub kind: ReferenceEditKind,
}

/// Result of rewriting one file's imports.
#[derive(Debug, Clone)]
pub struct ReferenceRewrite {
    pub content: String,
    pub edits: Vec<ReferenceEdit>,
}

impl ReferenceRewrite {
    pub fn changed(&self) -> bool {
        !self.edits.is_empty()
    }
}

/// Whole-line `use <Namespace>\<Name>;`. The namespace may carry a leading
/// `\` and never contains whitespace, so `use function ...` and aliased
/// imports (`... as X;`) do not match.
fn use_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*use\s+\\?([^;\s]+)\\(\w+)\s*;\s*$").unwrap())
}

/// Render the canonical import line.
pub fn use_line(namespace: &NamespacePath, symbol: &str) -> String {
    format!("use {}\\{};", namespace, symbol)
}

/// Point every whole-line import of `symbol` at `new_namespace`.
///
/// Imports from `old_namespace` are renamed; imports from any other namespace
/// that is not already `new_namespace` are healed. Lines that merely mention
/// the symbol are left alone.
pub fn rewrite_references(
    content: &str,
    symbol: &str,
    old_namespace: &str,
    new_namespace: &NamespacePath,
) -> ReferenceRewrite {
    let new_ns = new_namespace.to_string();
    let old_ns = old_namespace.trim_start_matches('\\');
    let canonical = use_line(new_namespace, symbol);

    let mut edits = Vec::new();
    let lines: Vec<String> = content
        .split('\n')
        .enumerate()
        .map(|(idx, line)| {
            let Some(caps) = use_line_re().captures(line) else {
                return line.to_string();
            };
            if &caps[2] != symbol {
                return line.to_string();
            }

            let found = &caps[1];
            let kind = if !old_ns.is_empty() && old_ns != new_ns && found == old_ns {
                ReferenceEditKind::Renamed
            } else if found != new_ns {
                ReferenceEditKind::Healed
            } else {
                return line.to_string();
            };

            edits.push(ReferenceEdit {
                line: idx + 1,
                from: found.to_string(),
                kind,
            });
            with_line_ending(&canonical, line)
        })
        .collect();

    if edits.is_empty() {
        return ReferenceRewrite {
            content: content.to_string(),
            edits,
        };
    }

    ReferenceRewrite {
        content: lines.join("\n"),
        edits,
    }
}
