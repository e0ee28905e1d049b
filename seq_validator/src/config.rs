//! Configuration loading and resolution for the sequencing validator.
//!
//! Resolution order (first source found wins):
//! 1. An explicit config file (`--config`), TOML or YAML by extension
//! 2. `seq-validator.toml` in the data directory (`[validate]` section)
//! 3. `seq-validator.yaml` / `seq-validator.yml` in the data directory
//!    (`validate:` mapping)
//! 4. Built-in defaults

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

/// File name of the TOML config looked up in the data directory.
pub const TOML_CONFIG_FILE: &str = "seq-validator.toml";

/// File names of the YAML config looked up in the data directory.
pub const YAML_CONFIG_FILES: [&str; 2] = ["seq-validator.yaml", "seq-validator.yml"];

// ---------------------------------------------------------------------------
// Main config
// ---------------------------------------------------------------------------

/// Complete validator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Whether an overall `WARNING` should cause a non-zero exit code.
    pub fail_on_warnings: bool,

    /// Glob patterns of checker names to run. `None` runs every checker.
    pub select: Option<Vec<String>>,

    /// Glob patterns of checker names never to run.
    pub skip: Vec<String>,

    /// `samtools` executable, a name on `PATH` or a full path.
    pub samtools: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            fail_on_warnings: false,
            select: None,
            skip: Vec::new(),
            samtools: "samtools".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// File deserialization helpers
// ---------------------------------------------------------------------------

/// Raw structure of a config file; TOML and YAML share it.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    validate: Option<ValidateSection>,
}

/// The `[validate]` section.
#[derive(Debug, Deserialize)]
struct ValidateSection {
    fail_on_warnings: Option<bool>,
    select: Option<Vec<String>>,
    skip: Option<Vec<String>>,
    samtools: Option<String>,
}

/// Apply a [`ValidateSection`] onto a [`ValidationConfig`], overriding any set values.
fn apply_section(config: &mut ValidationConfig, section: ValidateSection) {
    if let Some(v) = section.fail_on_warnings {
        config.fail_on_warnings = v;
    }
    if let Some(v) = section.select {
        config.select = Some(v);
    }
    if let Some(v) = section.skip {
        config.skip = v;
    }
    if let Some(v) = section.samtools {
        config.samtools = v;
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ReadError(path.display().to_string(), e.to_string()))?;
    if is_yaml(path) {
        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.display().to_string(), e.to_string()))
    } else {
        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.display().to_string(), e.to_string()))
    }
}

impl ValidationConfig {
    /// Load configuration from one file. A file without a `validate`
    /// section yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(section) = read_config_file(path)?.validate {
            apply_section(&mut config, section);
        }
        Ok(config)
    }

    /// Load configuration from the data directory, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a found config file cannot be read or parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let toml_path = dir.join(TOML_CONFIG_FILE);
        if toml_path.is_file() {
            return Self::load_from_file(&toml_path);
        }

        for name in YAML_CONFIG_FILES {
            let yaml_path = dir.join(name);
            if yaml_path.is_file() {
                return Self::load_from_file(&yaml_path);
            }
        }

        Ok(Self::default())
    }

    /// Resolve the configuration for one run.
    ///
    /// An explicit file always wins; otherwise the data directory is searched.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen config file cannot be read or parsed.
    pub fn resolve(explicit: Option<&Path>, data_dir: Option<&Path>) -> Result<Self, ConfigError> {
        match (explicit, data_dir) {
            (Some(path), _) => Self::load_from_file(path),
            (None, Some(dir)) => Self::load_from_dir(dir),
            (None, None) => Ok(Self::default()),
        }
    }

    /// Compile `select` and `skip` into a [`CheckerFilter`].
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid glob.
    pub fn checker_filter(&self) -> Result<CheckerFilter, ConfigError> {
        let select = self.select.as_deref().map(build_glob_set).transpose()?;
        let skip = if self.skip.is_empty() {
            None
        } else {
            Some(build_glob_set(&self.skip)?)
        };
        Ok(CheckerFilter { select, skip })
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(pattern.clone(), e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| ConfigError::InvalidPattern(patterns.join(", "), e.to_string()))
}

// ---------------------------------------------------------------------------
// Checker selection
// ---------------------------------------------------------------------------

/// Compiled checker selection. The default allows every checker.
#[derive(Debug, Clone, Default)]
pub struct CheckerFilter {
    select: Option<GlobSet>,
    skip: Option<GlobSet>,
}

impl CheckerFilter {
    /// Whether the named checker should run.
    #[must_use]
    pub fn allows(&self, checker: &str) -> bool {
        if let Some(ref select) = self.select {
            if !select.is_match(checker) {
                return false;
            }
        }
        if let Some(ref skip) = self.skip {
            if skip.is_match(checker) {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("Failed to read config file '{0}': {1}")]
    ReadError(String, String),

    /// Failed to parse a configuration file.
    #[error("Failed to parse config file '{0}': {1}")]
    ParseError(String, String),

    /// A `select`/`skip` entry is not a valid glob.
    #[error("Invalid checker pattern '{0}': {1}")]
    InvalidPattern(String, String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
