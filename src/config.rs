//! Filter rules deciding which loose files an organize run may move.
//!
//! Rules come from a TOML file. Without one nothing is excluded and every
//! regular file in the target directory is organized.
//!
//! ```toml
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["desktop.ini", "Thumbs.db"]
//! patterns = ["*.part"]
//! extensions = ["crdownload"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".typesortrc.toml";

/// Errors raised while loading or compiling filter rules.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Invalid glob pattern '{0}'")]
    InvalidGlobPattern(String),

    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    #[error("IO error reading configuration: {0}")]
    IoError(String),
}

/// Contents of a configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub filters: FilterRules,

    /// File the rules were read from; never organized itself.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// The `[filters]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Organize files whose name starts with a dot.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Matches here win over every exclude rule.
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_enable_hidden_files() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// The `[filters.exclude]` table. Files matching any rule stay in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names, e.g. `desktop.ini`.
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Globs, tried against the full path and the file name.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions without the dot; compared case-insensitively.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regular expressions over the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// The `[filters.include]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Locations searched when no file is given explicitly, in order.
fn default_config_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(home) = std::env::var_os("HOME") {
        locations.push(
            PathBuf::from(home)
                .join(".config")
                .join("typesort")
                .join("config.toml"),
        );
    }
    locations
}

impl FilterConfig {
    /// Loads filter rules.
    ///
    /// An explicit `config_path` must exist. Otherwise `.typesortrc.toml` in
    /// the working directory, then `~/.config/typesort/config.toml`, is used
    /// if present, and the defaults if neither is.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        match default_config_locations().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from_file(&path),
            None => {
                log::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        log::debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let mut config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        config.source = Some(fs::canonicalize(path).map_err(|e| ConfigError::IoError(e.to_string()))?);
        Ok(config)
    }

    /// Validates every pattern and builds the matcher used during planning.
    pub fn compile(self) -> Result<CompiledFilters, ConfigError> {
        let mut compiled = CompiledFilters::new(self.filters)?;
        compiled.config_file = self.source;
        Ok(compiled)
    }
}

/// Filter rules with every glob and regex parsed up front.
#[derive(Debug)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
    config_file: Option<PathBuf>,
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).map_err(|_| ConfigError::InvalidGlobPattern(p.clone())))
        .collect()
}

fn compile_regexes(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| ConfigError::InvalidRegexPattern {
                pattern: p.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

impl CompiledFilters {
    /// Filters that let every file through.
    pub fn accept_all() -> Self {
        Self {
            enable_hidden_files: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
            config_file: None,
        }
    }

    fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let FilterRules {
            enable_hidden_files,
            exclude,
            include,
        } = rules;

        Ok(Self {
            enable_hidden_files,
            exclude_patterns: compile_globs(&exclude.patterns)?,
            exclude_regexes: compile_regexes(&exclude.regex)?,
            include_patterns: compile_globs(&include.patterns)?,
            exclude_extensions: exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_filenames: exclude.filenames.into_iter().collect(),
            config_file: None,
        })
    }

    /// Whether `file_path` is the configuration file these filters came from.
    pub fn is_config_file(&self, file_path: &Path) -> bool {
        let Some(config_file) = &self.config_file else {
            return false;
        };
        file_path.file_name() == config_file.file_name()
            && fs::canonicalize(file_path).is_ok_and(|p| &p == config_file)
    }

    /// Whether `file_path` may be organized.
    ///
    /// An include pattern match always wins. Otherwise the file is left out
    /// if it is hidden while hidden files are disabled, or if any exclude
    /// rule matches.
    pub fn should_include(&self, file_path: &Path) -> bool {
        if Self::matches_any(&self.include_patterns, file_path) {
            return true;
        }

        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        let hidden = file_name.starts_with('.');
        let excluded_extension = file_path
            .extension()
            .is_some_and(|ext| {
                self.exclude_extensions
                    .contains(&ext.to_string_lossy().to_lowercase())
            });

        !((hidden && !self.enable_hidden_files)
            || self.exclude_filenames.contains(file_name.as_ref())
            || excluded_extension
            || Self::matches_any(&self.exclude_patterns, file_path)
            || self.exclude_regexes.iter().any(|re| re.is_match(&file_name)))
    }

    /// A glob matches either the whole path or just the file name.
    fn matches_any(patterns: &[Pattern], file_path: &Path) -> bool {
        let file_name = file_path.file_name().map(Path::new);
        patterns.iter().any(|pattern| {
            pattern.matches_path(file_path) || file_name.is_some_and(|n| pattern.matches_path(n))
        })
    }
}
