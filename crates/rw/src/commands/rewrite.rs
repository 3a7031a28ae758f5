//! `rw rewrite` command implementation.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use rw_config::{CliSettings, Config};
use rw_markup::{MarkupEngine, MarkupOptions, ParserOptions};
use rw_xref::XrefMap;

use crate::error::CliError;
use crate::output::Output;

/// Context path reported to the resolver for standard input.
const STDIN_PATH: &str = "<stdin>";

/// Arguments for the rewrite command.
#[derive(Args)]
pub(crate) struct RewriteArgs {
    /// Markdown files to rewrite (default: read stdin, write stdout).
    files: Vec<PathBuf>,

    /// Write the canonical form back to each file.
    #[arg(short, long, conflicts_with = "check")]
    in_place: bool,

    /// Report files that are not in canonical form and fail if there are any.
    #[arg(long)]
    check: bool,

    /// Enable legacy rendering (overrides config).
    #[arg(long)]
    legacy: bool,

    /// Disable legacy rendering (overrides config).
    #[arg(long, conflicts_with = "legacy")]
    no_legacy: bool,

    /// Cross-reference map file, in addition to the configured ones.
    #[arg(short = 'x', long = "xref-map", value_name = "PATH")]
    xref_maps: Vec<PathBuf>,

    /// Path to configuration file (default: auto-discover rw.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// What to do with each file's canonical form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Print,
    InPlace,
    Check,
}

/// Result of processing one file.
#[derive(Debug, PartialEq, Eq)]
enum FileOutcome {
    Unchanged,
    Changed,
}

impl RewriteArgs {
    /// Execute the rewrite command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or xref maps fail to load, a file
    /// cannot be read or written, or `--check` finds non-canonical files.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let mode = self.mode();

        let cli_settings = CliSettings {
            legacy_mode: self.resolve_legacy_mode(),
            xref_maps: self.xref_maps,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let xref = XrefMap::load_all(&config.xref_maps)?;
        tracing::info!(
            maps = config.xref_maps.len(),
            targets = xref.len(),
            "Loaded xref maps"
        );

        let engine = MarkupEngine::new(markup_options(&config)).with_resolver(xref);

        if self.files.is_empty() {
            return rewrite_stdin(&engine, mode);
        }

        let mut changed = 0usize;
        for path in &self.files {
            if process_file(&engine, path, mode)? == FileOutcome::Changed {
                changed += 1;
                if mode != Mode::Print {
                    output.file_changed(path, mode == Mode::InPlace);
                }
            }
        }

        if mode != Mode::Print {
            output.info(&format!(
                "{} file(s) checked, {changed} not in canonical form",
                self.files.len()
            ));
        }

        if mode == Mode::Check && changed > 0 {
            return Err(CliError::NotCanonical(changed));
        }
        Ok(())
    }

    fn mode(&self) -> Mode {
        if self.check {
            Mode::Check
        } else if self.in_place {
            Mode::InPlace
        } else {
            Mode::Print
        }
    }

    /// Resolve `legacy_mode` from --legacy/--no-legacy flags.
    fn resolve_legacy_mode(&self) -> Option<bool> {
        self.no_legacy
            .then_some(false)
            .or(self.legacy.then_some(true))
    }
}

/// Engine options from the loaded configuration.
fn markup_options(config: &Config) -> MarkupOptions {
    let parser = ParserOptions {
        tables: config.parser.tables,
        strikethrough: config.parser.strikethrough,
        tasklists: config.parser.tasklists,
        footnotes: config.parser.footnotes,
        front_matter: config.parser.front_matter,
    };
    MarkupOptions::new()
        .with_legacy_mode(config.markup.legacy_mode)
        .with_lenient_link_destinations(config.markup.lenient_link_destinations)
        .with_parser(parser)
}

/// Rewrite one file according to `mode`.
fn process_file(engine: &MarkupEngine, path: &Path, mode: Mode) -> Result<FileOutcome, CliError> {
    let source = std::fs::read_to_string(path)?;
    let rewritten = engine.markup(&source, path);
    let outcome = if rewritten == source {
        FileOutcome::Unchanged
    } else {
        FileOutcome::Changed
    };

    match mode {
        Mode::Print => std::io::stdout().write_all(rewritten.as_bytes())?,
        Mode::InPlace if outcome == FileOutcome::Changed => std::fs::write(path, &rewritten)?,
        Mode::InPlace | Mode::Check => {}
    }
    Ok(outcome)
}

fn rewrite_stdin(engine: &MarkupEngine, mode: Mode) -> Result<(), CliError> {
    let mut source = String::new();
    std::io::stdin().read_to_string(&mut source)?;
    let rewritten = engine.markup(&source, STDIN_PATH);

    match mode {
        Mode::Check if rewritten != source => Err(CliError::NotCanonical(1)),
        Mode::Check => Ok(()),
        Mode::Print | Mode::InPlace => {
            std::io::stdout().write_all(rewritten.as_bytes())?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn legacy_engine() -> MarkupEngine {
        MarkupEngine::new(MarkupOptions::new().with_legacy_mode(true))
    }

    #[test]
    fn test_markup_options_from_config() {
        let config: Config =
            toml::from_str("[markup]\nlegacy_mode = true\n\n[parser]\ntables = false\n").unwrap();
        let options = markup_options(&config);

        assert!(options.legacy_mode);
        assert!(options.lenient_link_destinations);
        assert!(!options.parser.tables);
        assert!(options.parser.strikethrough);
    }

    #[test]
    fn test_in_place_rewrites_changed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.md");
        std::fs::write(&path, "<Mailto:docs@microsoft.com>\n").unwrap();

        let outcome = process_file(&legacy_engine(), &path, Mode::InPlace).unwrap();

        assert_eq!(outcome, FileOutcome::Changed);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "<docs@microsoft.com>\n\n"
        );
    }

    #[test]
    fn test_check_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.md");
        std::fs::write(&path, "[a](b c)\n").unwrap();

        let outcome = process_file(&legacy_engine(), &path, Mode::Check).unwrap();

        assert_eq!(outcome, FileOutcome::Changed);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[a](b c)\n");
    }

    #[test]
    fn test_canonical_file_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.md");
        std::fs::write(&path, "# Title\nText\n\n").unwrap();

        let outcome = process_file(&legacy_engine(), &path, Mode::Check).unwrap();
        assert_eq!(outcome, FileOutcome::Unchanged);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = process_file(&legacy_engine(), &dir.path().join("nope.md"), Mode::Check);
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
