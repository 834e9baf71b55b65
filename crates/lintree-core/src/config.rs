//! Scan and lint configuration types.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Directory names that are never scanned nor linted.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["mocks", "vendor"];

/// Configuration for building the directory tree.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root path to scan.
    pub root: PathBuf,

    /// Directory names to prune, in addition to [`DEFAULT_EXCLUDED_DIRS`].
    #[builder(default)]
    #[serde(default)]
    pub exclude_dirs: Vec<String>,

    /// Extension identifying source files.
    #[builder(default = "default_source_extension()")]
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    /// Prefix of single-line comments, ignored when counting code lines.
    #[builder(default = "default_comment_prefix()")]
    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: String,

    /// Number of threads for scanning (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,
}

fn default_source_extension() -> String {
    "go".to_string()
}

fn default_comment_prefix() -> String {
    "//".to_string()
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        if let Some(ref extension) = self.source_extension {
            if extension.is_empty() {
                return Err("Source extension cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude_dirs: Vec::new(),
            source_extension: default_source_extension(),
            comment_prefix: default_comment_prefix(),
            threads: 0,
        }
    }

    /// Check whether a directory with this name must be pruned.
    pub fn should_exclude(&self, name: &str) -> bool {
        DEFAULT_EXCLUDED_DIRS.contains(&name) || self.exclude_dirs.iter().any(|d| d == name)
    }

    /// Check whether a file with this name is a source file.
    pub fn is_source(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .is_some_and(|ext| ext == self.source_extension.as_str())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Options forwarded to the external lint tool.
///
/// Several option sets are combined with [`LintOptions::aggregate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), default)]
pub struct LintOptions {
    /// Linters to enable. Empty means the tool's defaults.
    #[serde(default)]
    pub linters: Vec<String>,

    /// Tool configuration file.
    #[builder(setter(into, strip_option))]
    #[serde(default)]
    pub config_path: Option<PathBuf>,

    /// Directory names to skip.
    #[serde(default)]
    pub exclude_dirs: Vec<String>,
}

impl LintOptions {
    /// Create a new options builder.
    pub fn builder() -> LintOptionsBuilder {
        LintOptionsBuilder::default()
    }

    /// Options that only select linters.
    pub fn with_linters<I, S>(linters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            linters: linters.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Options that only name a configuration file.
    pub fn with_config(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Options that only exclude directories.
    pub fn with_exclude_dirs<I, S>(dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclude_dirs: dirs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Merge option sets into one.
    ///
    /// Linters and excluded directories are unioned, sorted and deduplicated.
    /// At most one distinct configuration file may be named; its `run.skip-dirs`
    /// entries are added to the excluded directories.
    pub fn aggregate<I>(sources: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = LintOptions>,
    {
        let mut linters = BTreeSet::new();
        let mut exclude_dirs = BTreeSet::new();
        let mut config_paths: Vec<PathBuf> = Vec::new();

        for source in sources {
            linters.extend(source.linters.into_iter().filter(|l| !l.is_empty()));
            exclude_dirs.extend(source.exclude_dirs.into_iter().filter(|d| !d.is_empty()));
            if let Some(path) = source.config_path.filter(|p| !p.as_os_str().is_empty()) {
                if !config_paths.contains(&path) {
                    config_paths.push(path);
                }
            }
        }

        if config_paths.len() > 1 {
            return Err(ConfigError::ConflictingConfigs(config_paths));
        }
        let config_path = config_paths.pop();
        if let Some(ref path) = config_path {
            exclude_dirs.extend(read_skip_dirs(path)?);
        }

        Ok(Self {
            linters: linters.into_iter().collect(),
            config_path,
            exclude_dirs: exclude_dirs.into_iter().collect(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ToolConfig {
    #[serde(default)]
    run: RunSection,
}

#[derive(Debug, Default, Deserialize)]
struct RunSection {
    #[serde(default, rename = "skip-dirs")]
    skip_dirs: Vec<String>,
}

/// Read the `run.skip-dirs` list from a tool configuration file.
pub fn read_skip_dirs(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |message: String| ConfigError::ParseConfig {
        path: path.to_path_buf(),
        message,
    };

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    let config: ToolConfig = match extension.as_deref() {
        Some("yml" | "yaml") => {
            serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))?
        }
        Some("toml") => toml::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
        Some("json") => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };
    Ok(config.run.skip_dirs)
}
