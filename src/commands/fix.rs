use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

use nsfix::convention::load_convention;
use nsfix::refactor::{
    self, DeclarationChange, FixEvent, FixOptions, FixReport, ReferenceEditKind, SearchBackend,
    SkipReason,
};
use nsfix::Error;

use crate::commands::{CmdResult, GlobalArgs};

#[derive(Args, Debug)]
pub struct FixArgs {
    /// PHP file whose namespace should follow its directory
    pub file: Option<String>,

    /// Directory containing wp-content/plugins (inferred from FILE when omitted)
    #[arg(long, value_name = "DIR")]
    pub root: Option<String>,

    /// JSON file overriding the naming convention
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,

    /// Reference search backend: scan, grep
    #[arg(long, default_value = "scan")]
    pub search: String,

    /// Report what would change without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum FixOutput {
    #[serde(rename = "fix")]
    Fix {
        #[serde(flatten)]
        report: FixReport,
    },
}

pub(crate) fn run(args: FixArgs, global: &GlobalArgs) -> CmdResult<FixOutput> {
    let file = args.file.ok_or_else(|| {
        Error::validation_missing_argument(vec!["FILE".to_string()])
            .with_hint("Usage: nsfix [OPTIONS] <FILE>")
    })?;

    let backend = SearchBackend::from_str(&args.search)?;
    let convention = load_convention(args.config.as_deref().map(Path::new))?;

    let options = FixOptions {
        convention,
        root: args.root.map(PathBuf::from),
        dry_run: args.dry_run,
    };

    let search = backend.build();
    let quiet = global.json;
    let dry_run = options.dry_run;
    let mut on_event = |event: &FixEvent| {
        if quiet {
            return;
        }
        for line in render_event(event, dry_run) {
            println!("{}", line);
        }
    };

    let report = refactor::fix_file(Path::new(&file), &options, search.as_ref(), &mut on_event)?;

    Ok((FixOutput::Fix { report }, 0))
}

/// Human-readable status lines for one event.
fn render_event(event: &FixEvent, dry_run: bool) -> Vec<String> {
    let verb = if dry_run { "Would update" } else { "Updated" };

    match event {
        FixEvent::Analyzing { file } => vec![format!("Analyzing {}", file)],
        FixEvent::Derived {
            current, expected, ..
        } => {
            let current = if current.is_empty() {
                "(none)"
            } else {
                current.as_str()
            };
            vec![
                format!("Current namespace:  {}", current),
                format!("Expected namespace: {}", expected),
            ]
        }
        FixEvent::DeclarationCorrect => vec!["Namespace declaration is already correct".to_string()],
        FixEvent::DeclarationUpdated { change } => match change {
            DeclarationChange::Replaced { line } => {
                vec![format!("{} namespace declaration (line {})", verb, line)]
            }
            DeclarationChange::Inserted { line } => {
                let verb = if dry_run { "Would insert" } else { "Inserted" };
                vec![format!("{} namespace declaration (line {})", verb, line)]
            }
            DeclarationChange::NoAnchor => Vec::new(),
        },
        FixEvent::DeclarationUnanchored => vec![
            "Skipped declaration: no namespace line or <?php tag to anchor it".to_string(),
        ],
        FixEvent::NoSymbol => {
            vec!["No class, interface, trait, or enum declared; skipping references".to_string()]
        }
        FixEvent::SearchSkipped { reason } => {
            let why = match reason {
                SkipReason::NoPluginsDir { path } => format!("{} does not exist", path),
                SkipReason::NoMatchingRoots { path } => {
                    format!("no matching plugin directories in {}", path)
                }
                SkipReason::NoSourceDirs => "no configured source directories exist".to_string(),
            };
            vec![format!("Skipped reference search: {}", why)]
        }
        FixEvent::Searching { symbol, roots } => vec![format!(
            "Searching for imports of {} in {} director{}",
            symbol,
            roots.len(),
            if roots.len() == 1 { "y" } else { "ies" }
        )],
        FixEvent::SearchFailed { error } => {
            vec![format!("Warning: reference search failed: {}", error.summary())]
        }
        FixEvent::ReferenceUpdated { file, edits } => {
            let mut lines = vec![format!("{} {}", verb, file)];
            lines.extend(edits.iter().map(|edit| {
                let kind = match edit.kind {
                    ReferenceEditKind::Renamed => "renamed",
                    ReferenceEditKind::Healed => "healed",
                };
                format!("  line {}: {} ({})", edit.line, edit.from, kind)
            }));
            lines
        }
        FixEvent::ReferenceUnchanged { file } => vec![format!("Unchanged {}", file)],
        FixEvent::ReferenceFailed { file, error } => {
            vec![format!("Failed {}: {}", file, error.summary())]
        }
        FixEvent::Completed { updated_files } => {
            let tail = if dry_run { "would be updated" } else { "updated" };
            vec![format!("Done: {} reference file(s) {}", updated_files, tail)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsfix::refactor::ReferenceEdit;

    #[test]
    fn missing_file_argument_is_a_usage_error() {
        let args = FixArgs {
            file: None,
            root: None,
            config: None,
            search: "scan".to_string(),
            dry_run: false,
        };
        let err = match run(args, &GlobalArgs { json: true }) {
            Err(err) => err,
            Ok(_) => panic!("expected a usage error"),
        };
        assert_eq!(err.code.as_str(), "validation.missing_argument");
        assert!(!err.hints.is_empty());
    }

    #[test]
    fn dry_run_wording() {
        let event = FixEvent::DeclarationUpdated {
            change: DeclarationChange::Replaced { line: 3 },
        };
        assert_eq!(
            render_event(&event, true),
            vec!["Would update namespace declaration (line 3)"]
        );
        assert_eq!(
            render_event(&event, false),
            vec!["Updated namespace declaration (line 3)"]
        );
    }

    #[test]
    fn reference_update_lists_edits() {
        let event = FixEvent::ReferenceUpdated {
            file: "Bar.php".to_string(),
            edits: vec![ReferenceEdit {
                line: 5,
                from: "Give\\Wrong".to_string(),
                kind: ReferenceEditKind::Renamed,
            }],
        };
        assert_eq!(
            render_event(&event, false),
            vec!["Updated Bar.php", "  line 5: Give\\Wrong (renamed)"]
        );
    }

    #[test]
    fn missing_namespace_renders_as_none() {
        let event = FixEvent::Derived {
            directory: "src".to_string(),
            current: String::new(),
            expected: "Give".to_string(),
        };
        assert_eq!(render_event(&event, false)[0], "Current namespace:  (none)");
    }
}
