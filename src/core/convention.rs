//! Naming convention constants, overridable from a JSON file.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::io;

/// Constants that bind path layout to namespace layout.
///
/// Every field has a built-in default; a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Convention {
    /// Path fragment marking the start of the namespace-bearing part of a path.
    #[serde(default = "default_root_marker")]
    pub root_marker: String,

    /// Top-level namespace segment used for plugins matching `root_alias`.
    #[serde(default = "default_root_token")]
    pub root_token: String,

    /// Case-insensitive substring identifying plugins that use `root_token`.
    #[serde(default = "default_root_alias")]
    pub root_alias: String,

    /// Directory segment whose contents map directly onto the root namespace.
    #[serde(default = "default_source_segment")]
    pub source_segment: String,

    /// Directory, relative to the module root, that holds the plugin roots.
    #[serde(default = "default_plugins_dir")]
    pub plugins_dir: String,

    /// Subdirectories of each plugin root to search. Empty means the whole root.
    #[serde(default)]
    pub source_dirs: Vec<String>,

    /// Directory names skipped at any depth during the reference search.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// Extension of files that can hold references.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for Convention {
    fn default() -> Self {
        Self {
            root_marker: default_root_marker(),
            root_token: default_root_token(),
            root_alias: default_root_alias(),
            source_segment: default_source_segment(),
            plugins_dir: default_plugins_dir(),
            source_dirs: Vec::new(),
            exclude_dirs: default_exclude_dirs(),
            extension: default_extension(),
        }
    }
}

impl Convention {
    /// Reject values that would make derivation or search meaningless.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("root_token", &self.root_token),
            ("root_alias", &self.root_alias),
            ("plugins_dir", &self.plugins_dir),
            ("extension", &self.extension),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::config_invalid_value(
                    key,
                    Some(value.clone()),
                    "must not be empty",
                ));
            }
        }

        if self.extension.starts_with('.') {
            return Err(Error::config_invalid_value(
                "extension",
                Some(self.extension.clone()),
                "must not start with '.'",
            ));
        }

        Ok(())
    }

    /// Whether a directory name is excluded from the reference search.
    pub fn is_excluded(&self, dir_name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == dir_name)
    }

    /// Last component of `plugins_dir` (`plugins` for `wp-content/plugins`).
    pub fn plugins_leaf(&self) -> &str {
        self.plugins_dir
            .trim_matches(|c: char| c == '/' || c == '\\')
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or("")
    }

    /// Whether a plugin directory name matches the root alias.
    pub fn matches_alias(&self, name: &str) -> bool {
        name.to_lowercase().contains(&self.root_alias.to_lowercase())
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_root_marker() -> String {
    "wp-content/plugins/".to_string()
}

fn default_root_token() -> String {
    "Give".to_string()
}

fn default_root_alias() -> String {
    "give".to_string()
}

fn default_source_segment() -> String {
    "src".to_string()
}

fn default_plugins_dir() -> String {
    "wp-content/plugins".to_string()
}

fn default_exclude_dirs() -> Vec<String> {
    [
        "vendor",
        "node_modules",
        ".git",
        "build",
        "dist",
        "tests",
        "assets",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_extension() -> String {
    "php".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load the convention from an optional JSON file, falling back to built-in
/// defaults when no file is given. Unlike a missing file, an unreadable or
/// invalid file is an error.
pub fn load_convention(path: Option<&Path>) -> Result<Convention> {
    let Some(path) = path else {
        return Ok(Convention::default());
    };

    let content = io::read_file(path, &format!("read {}", path.display()))?;
    let convention: Convention = serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))?;

    convention.validate()?;
    Ok(convention)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_without_file() {
        let convention = load_convention(None).unwrap();
        assert_eq!(convention, Convention::default());
        assert_eq!(convention.root_token, "Give");
        assert!(convention.is_excluded("vendor"));
        assert!(!convention.is_excluded("src"));
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, r#"{{"root_token": "Acme", "root_alias": "acme"}}"#).unwrap();

        let convention = load_convention(Some(temp.path())).unwrap();
        assert_eq!(convention.root_token, "Acme");
        assert_eq!(convention.root_alias, "acme");
        assert_eq!(convention.extension, "php");
        assert_eq!(convention.plugins_dir, "wp-content/plugins");
    }

    #[test]
    fn invalid_json_is_config_error() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, "{{not json").unwrap();

        let err = load_convention(Some(temp.path())).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_json");
    }

    #[test]
    fn empty_root_token_rejected() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, r#"{{"root_token": "  "}}"#).unwrap();

        let err = load_convention(Some(temp.path())).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
        assert_eq!(err.details["key"], "root_token");
    }

    #[test]
    fn alias_match_is_case_insensitive_substring() {
        let convention = Convention::default();
        assert!(convention.matches_alias("give"));
        assert!(convention.matches_alias("Give-Recurring"));
        assert!(convention.matches_alias("my-GIVEWP-addon"));
        assert!(!convention.matches_alias("woocommerce"));
    }

    #[test]
    fn plugins_leaf_is_last_component() {
        assert_eq!(Convention::default().plugins_leaf(), "plugins");

        let convention = Convention {
            plugins_dir: "/modules/".to_string(),
            ..Convention::default()
        };
        assert_eq!(convention.plugins_leaf(), "modules");
    }
}
