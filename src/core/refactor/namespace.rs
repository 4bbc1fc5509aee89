//! Path → namespace derivation following the PSR-4 layout of plugin trees.
//!
//! `wp-content/plugins/give/src/API/REST` maps to `Give\API\REST`;
//! `wp-content/plugins/give-recurring/includes/Admin` maps to
//! `Give\Includes\Admin`; `wp-content/plugins/acme/Http` maps to `Acme\Http`.

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;

use crate::convention::Convention;

/// Separator between namespace segments.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// A namespace as an ordered list of non-empty, capitalized segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespacePath {
    segments: Vec<String>,
}

impl NamespacePath {
    /// Build from raw segments, capitalizing each and dropping empty ones.
    ///
    /// Only a leading letter is uppercased. Segments starting with a digit or
    /// `_` (`3rd`, `_legacy`) are kept as they are.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(|s| capitalize(s.as_ref()))
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for NamespacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", NAMESPACE_SEPARATOR)?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl Serialize for NamespacePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Uppercase the first character, leaving the rest untouched (`API` stays `API`).
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().to_string() + chars.as_str(),
    }
}

/// Derive the namespace a file in `dir` should declare.
///
/// Total over any input: paths that match nothing in the convention degrade
/// to best-effort naming, and an empty path yields the bare root token.
pub fn derive_namespace(dir: &Path, convention: &Convention) -> NamespacePath {
    let normalized = dir.to_string_lossy().replace('\\', "/");
    let marker = convention.root_marker.replace('\\', "/");

    let (relative, marked) = match normalized.find(marker.as_str()) {
        Some(pos) if !marker.is_empty() => (&normalized[pos + marker.len()..], true),
        _ => (normalized.as_str(), false),
    };

    let segments: Vec<&str> = relative
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    let plugin_index = if marked {
        Some(0).filter(|_| !segments.is_empty())
    } else {
        plugin_segment_index(&segments, convention)
    };

    let (root_name, rest): (Option<&str>, &[&str]) = match plugin_index {
        Some(idx) => (Some(segments[idx]), &segments[idx + 1..]),
        None if is_source_segment(segments.first(), convention) => (None, &segments[..]),
        None => match segments.split_first() {
            Some((first, rest)) => (Some(*first), rest),
            None => (None, &segments[..]),
        },
    };

    // `<plugin>/src/<rest>` maps `<rest>` straight under the plugin's root.
    let body = if is_source_segment(rest.first(), convention) {
        &rest[1..]
    } else {
        rest
    };

    let root = match root_name {
        Some(name) => root_token_for(name, convention),
        None => convention.root_token.clone(),
    };

    NamespacePath::from_segments(std::iter::once(root.as_str()).chain(body.iter().copied()))
}

/// Without the root marker, the plugin is the segment after the plugins
/// directory, or failing that the first alias-matching segment.
fn plugin_segment_index(segments: &[&str], convention: &Convention) -> Option<usize> {
    let leaf = convention.plugins_leaf();
    let after_leaf = segments
        .iter()
        .position(|s| !leaf.is_empty() && *s == leaf)
        .map(|idx| idx + 1)
        .filter(|idx| *idx < segments.len());

    after_leaf.or_else(|| segments.iter().position(|s| convention.matches_alias(s)))
}

fn is_source_segment(segment: Option<&&str>, convention: &Convention) -> bool {
    !convention.source_segment.is_empty()
        && segment.is_some_and(|s| *s == convention.source_segment)
}

fn root_token_for(plugin_name: &str, convention: &Convention) -> String {
    if convention.matches_alias(plugin_name) {
        convention.root_token.clone()
    } else {
        capitalize(plugin_name)
    }
}
