//! Configuration management for RW.
//!
//! Parses `rw.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [markup]
//! legacy_mode = true
//!
//! [parser]
//! footnotes = true
//!
//! [xref]
//! maps = ["xrefmap.yml", "${XREF_ROOT}/dotnet.yml"]
//! ```
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `xref.maps` entries support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override legacy rendering.
    pub legacy_mode: Option<bool>,
    /// Extra xref maps, loaded after the configured ones.
    pub xref_maps: Vec<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "rw.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rewrite behavior.
    pub markup: MarkupConfig,
    /// Parser extensions.
    pub parser: ParserConfig,
    /// Cross-reference maps (paths are relative strings from TOML).
    xref: XrefConfigRaw,

    /// Resolved xref map paths (set after loading).
    #[serde(skip)]
    pub xref_maps: Vec<PathBuf>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Rewrite behavior.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Render headings with a single trailing newline.
    pub legacy_mode: bool,
    /// Accept link destinations containing whitespace.
    pub lenient_link_destinations: bool,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            legacy_mode: false,
            lenient_link_destinations: true,
        }
    }
}

/// Parser extension toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ParserConfig {
    /// GFM tables.
    pub tables: bool,
    /// `~~strikethrough~~`.
    pub strikethrough: bool,
    /// Task list items.
    pub tasklists: bool,
    /// Footnotes.
    pub footnotes: bool,
    /// YAML front matter.
    pub front_matter: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            tasklists: true,
            footnotes: false,
            front_matter: true,
        }
    }
}

/// Raw xref configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct XrefConfigRaw {
    maps: Vec<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`xref.maps`").
        field: String,
        /// Error message (e.g., "${`XREF_ROOT`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `rw.toml` in current directory and parents.
    /// Without a config file, defaults are used.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_config(&cwd)),
        };

        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(legacy_mode) = settings.legacy_mode {
            self.markup.legacy_mode = legacy_mode;
        }
        self.xref_maps.extend(settings.xref_maps.iter().cloned());
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.validate()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if an xref map entry is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.xref.maps.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "xref.maps entries cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        for map in &mut self.xref.maps {
            *map = expand::expand_env(map, "xref.maps")?;
        }
        Ok(())
    }

    /// Resolve xref map paths relative to the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.xref_maps = self
            .xref
            .maps
            .iter()
            .map(|map| config_dir.join(map))
            .collect();
    }
}
