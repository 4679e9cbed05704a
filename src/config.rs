//! Scan configuration.
//!
//! Controls which files the scanner hands to the planner. Category rules are
//! built in and cannot be changed here; this file only decides what gets
//! looked at:
//! - hidden files (leading `.`) and temporary files (`~` suffix, `.tmp`)
//! - excluded file names, extensions, glob patterns and regexes
//! - include patterns that override every exclusion
//!
//! # Configuration File Format
//!
//! ```toml
//! [scan]
//! recursive = false
//!
//! [filters]
//! include_hidden = false
//! include_temporary = false
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["**/node_modules/**"]
//! extensions = ["bak"]
//! regex = ["^draft_"]
//!
//! [filters.include]
//! patterns = []
//! ```

use glob::Pattern;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_NAME: &str = ".dircleanerrc.toml";

/// Errors that can occur while loading or compiling the configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern.
    InvalidGlobPattern { pattern: String, reason: String },
    /// Invalid regex pattern.
    InvalidRegexPattern { pattern: String, reason: String },
    /// The file exists but could not be read.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern { pattern, reason } => {
                write!(f, "Invalid glob pattern '{}': {}", pattern, reason)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub scan: ScanSettings,
    #[serde(default)]
    pub filters: FilterRules,
}

/// Defaults for how the directory is walked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanSettings {
    /// Descend into subdirectories. The `--recursive` flag also turns this on.
    #[serde(default)]
    pub recursive: bool,
}

/// Which files are handed to the planner.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterRules {
    /// Keep files whose name starts with `.`.
    #[serde(default)]
    pub include_hidden: bool,

    /// Keep files ending in `~` or with a `.tmp` extension.
    #[serde(default)]
    pub include_temporary: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    #[serde(default)]
    pub include: IncludeRules,
}

/// Files to leave out of the scan.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names, e.g. `"Thumbs.db"`.
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the path relative to the scan root.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions without the dot, matched case-insensitively.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regexes matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Glob patterns that win over every exclusion, including hidden and temporary files.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl ScanConfig {
    /// Loads the configuration.
    ///
    /// Lookup order:
    /// 1. `config_path`, when given (it must exist)
    /// 2. `.dircleanerrc.toml` in the current directory
    /// 3. `~/.config/dircleaner/config.toml`
    /// 4. built-in defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_NAME);
        if local_config.is_file() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("dircleaner")
                .join("config.toml");
            if home_config.is_file() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compiles the filter rules for matching.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Filter rules with every pattern parsed up front.
///
/// The default skips hidden and temporary files and nothing else.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilters {
    include_hidden: bool,
    include_temporary: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                pattern: pattern.clone(),
                reason: e.msg.to_string(),
            })
        })
        .collect()
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            include_hidden: rules.include_hidden,
            include_temporary: rules.include_temporary,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns: compile_globs(&rules.exclude.patterns)?,
            exclude_regexes,
            include_patterns: compile_globs(&rules.include.patterns)?,
        })
    }

    /// Decides whether a file should be scanned.
    ///
    /// `relative_path` is the path below the scan root. Checks run in order
    /// and stop at the first decision:
    /// 1. include patterns keep the file
    /// 2. hidden files are dropped unless enabled
    /// 3. temporary files are dropped unless enabled
    /// 4. excluded names, extensions, globs and regexes drop the file
    pub fn should_include(&self, relative_path: &Path) -> bool {
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
        {
            return true;
        }

        if !self.include_hidden && is_hidden(&file_name) {
            return false;
        }

        if !self.include_temporary && is_temporary(&file_name) {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = relative_path.extension()
            && self
                .exclude_extensions
                .contains(&ext.to_string_lossy().to_lowercase())
        {
            return false;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }

    /// Decides whether a recursive scan enters the directory `dir_name`.
    pub fn should_descend(&self, dir_name: &str) -> bool {
        self.include_hidden || !is_hidden(dir_name)
    }
}

/// Names starting with `.`.
pub fn is_hidden(file_name: &str) -> bool {
    file_name.starts_with('.')
}

/// Editor backups (`name~`) and `.tmp` files.
pub fn is_temporary(file_name: &str) -> bool {
    file_name.ends_with('~') || file_name.to_lowercase().ends_with(".tmp")
}
