//! Namespace declaration extraction and rewriting.
//!
//! Line-oriented: a declaration is only recognized when it fills a whole
//! line, so inline mentions of `namespace` are never touched.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use super::namespace::NamespacePath;

/// Language open tag after which a missing declaration is inserted.
const OPEN_TAG: &str = "<?php";

/// Words that can follow `class` without naming a class (`new class extends X`).
const NON_NAME_WORDS: &[&str] = &["extends", "implements"];

/// What a file currently declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// Primary class-like symbol, if any.
    pub symbol_name: Option<String>,
    /// Declared namespace, empty when the file has none.
    pub namespace: String,
}

/// How [`rewrite_declaration`] changed the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclarationChange {
    /// An existing declaration line was replaced (1-indexed line).
    Replaced { line: usize },
    /// A declaration was inserted after the open tag (1-indexed line).
    Inserted { line: usize },
    /// No declaration and no open tag: text returned as-is.
    NoAnchor,
}

/// Result of rewriting a file's declaration.
#[derive(Debug, Clone)]
pub struct DeclarationEdit {
    pub content: String,
    pub change: DeclarationChange,
}

fn class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^\s*(?:(?:abstract|final|readonly)\s+)*(?:class|interface|trait|enum)\s+(\w+)",
        )
        .unwrap()
    })
}

fn namespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bnamespace\s+([^;]+);").unwrap())
}

fn declaration_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*namespace\s+[^;]+;\s*$").unwrap())
}

/// Extract the first class-like symbol and the first namespace declaration.
///
/// A class-like declaration must start its line, optionally after
/// `abstract`/`final`/`readonly`, so prose in comments is not picked up.
pub fn extract_declaration(content: &str) -> Declaration {
    let symbol_name = class_re()
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .find(|name| !NON_NAME_WORDS.contains(&name.as_str()));

    let namespace = namespace_re()
        .captures(content)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();

    Declaration {
        symbol_name,
        namespace,
    }
}

/// Render the canonical declaration line.
pub fn declaration_line(target: &NamespacePath) -> String {
    format!("namespace {};", target)
}

/// Replace the first whole-line namespace declaration with the canonical one,
/// or insert it after the open tag when there is none.
///
/// Only the first matching line is ever replaced. Applying the same target
/// twice yields the same text as applying it once.
pub fn rewrite_declaration(content: &str, target: &NamespacePath) -> DeclarationEdit {
    let canonical = declaration_line(target);
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();

    if let Some(idx) = lines.iter().position(|l| declaration_line_re().is_match(l)) {
        lines[idx] = with_line_ending(&canonical, &lines[idx]);
        return DeclarationEdit {
            content: lines.join("\n"),
            change: DeclarationChange::Replaced { line: idx + 1 },
        };
    }

    if let Some(idx) = lines.iter().position(|l| l.trim() == OPEN_TAG) {
        let blank = with_line_ending("", &lines[idx]);
        let declaration = with_line_ending(&canonical, &lines[idx]);
        lines.splice(idx + 1..idx + 1, [blank, declaration]);
        return DeclarationEdit {
            content: lines.join("\n"),
            change: DeclarationChange::Inserted { line: idx + 3 },
        };
    }

    DeclarationEdit {
        content: content.to_string(),
        change: DeclarationChange::NoAnchor,
    }
}

/// Keep a CRLF file's `\r` on lines we regenerate.
pub(crate) fn with_line_ending(new_line: &str, original: &str) -> String {
    if original.ends_with('\r') {
        format!("{}\r", new_line)
    } else {
        new_line.to_string()
    }
}
