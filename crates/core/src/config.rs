//! Configuration for the detector and the batch scanner.
//!
//! Dialect groups and skip-zone directives are plain records that can be
//! loaded from TOML or JSON; [`DetectorConfig::default`] carries the built-in
//! Swift and Objective-C/C dialects.

use crate::models::{ImportCategoriesGroup, ImportCategory, SortOrder};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported config file extension: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("Invalid pattern for category '{title}': {source}")]
    InvalidPattern {
        title: String,
        #[source]
        source: regex::Error,
    },
    #[error("Config defines no dialect groups")]
    NoGroups,
    #[error("Dialect group '{0}' has no categories")]
    EmptyGroup(String),
    #[error("Dialect group '{group}' lists category '{title}' more than once")]
    DuplicateCategory { group: String, title: String },
    #[error("Failed to build glob pattern: {0}")]
    GlobError(#[from] globset::Error),
    #[error("Failed to parse gitignore: {0}")]
    GitignoreError(#[from] ignore::Error),
}

/// One category as written in a config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub title: String,
    pub pattern: String,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl CategoryConfig {
    pub fn new(title: &str, pattern: &str) -> Self {
        Self {
            title: title.to_string(),
            pattern: pattern.to_string(),
            sort_order: SortOrder::Ascending,
        }
    }
}

/// One dialect group as written in a config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    pub categories: Vec<CategoryConfig>,
}

impl GroupConfig {
    /// Compile every category of the group
    pub fn build(&self) -> Result<ImportCategoriesGroup, ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::EmptyGroup(self.name.clone()));
        }

        let categories = self
            .categories
            .iter()
            .cloned()
            .map(ImportCategory::try_from)
            .collect::<Result<Vec<ImportCategory>, _>>()?;

        // A repeated category would push every matching line into its bucket twice
        for (i, category) in categories.iter().enumerate() {
            if categories[..i].contains(category) {
                return Err(ConfigError::DuplicateCategory {
                    group: self.name.clone(),
                    title: category.title().to_string(),
                });
            }
        }

        Ok(ImportCategoriesGroup::new(self.name.clone(), categories))
    }
}

/// Patterns of the lines that open and close skip zones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectiveConfig {
    pub if_define_begin: String,
    pub if_macro_begin: String,
    pub if_end: String,
    pub diagnostic_push: String,
    pub diagnostic_pop: String,
}

impl Default for DirectiveConfig {
    fn default() -> Self {
        Self {
            if_define_begin: r"^#ifdef \s*.*\n*".to_string(),
            if_macro_begin: r"^#if \s*.*\n*".to_string(),
            if_end: r"^#endif\s*\n*".to_string(),
            diagnostic_push: r"^#pragma clang diagnostic push*".to_string(),
            diagnostic_pop: r"^#pragma clang diagnostic pop*".to_string(),
        }
    }
}

/// Dialect groups plus skip-zone directives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Candidate groups in precedence order
    pub groups: Vec<GroupConfig>,
    #[serde(default)]
    pub directives: DirectiveConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            groups: vec![swift_group(), objc_group()],
            directives: DirectiveConfig::default(),
        }
    }
}

impl DetectorConfig {
    /// Load a config file, choosing the parser from the extension
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Compile all groups, keeping their order
    pub fn build_groups(&self) -> Result<Vec<ImportCategoriesGroup>, ConfigError> {
        if self.groups.is_empty() {
            return Err(ConfigError::NoGroups);
        }
        self.groups.iter().map(GroupConfig::build).collect()
    }
}

fn swift_group() -> GroupConfig {
    GroupConfig {
        name: "swift".to_string(),
        categories: vec![
            CategoryConfig::new("Framework import", r"^\s*(import) +.*."),
            CategoryConfig::new("Testable import", r"^\s*(@testable \s*import) +.*."),
        ],
    }
}

fn objc_group() -> GroupConfig {
    GroupConfig {
        name: "objc".to_string(),
        categories: vec![
            CategoryConfig::new("Module import", r"^\s*(@import) +.*."),
            CategoryConfig::new("Global import", r"^\s*(#import) \s*<.*>.*"),
            CategoryConfig::new("Global include", r"^\s*(#include) \s*<.*>.*"),
            CategoryConfig::new("Local import", r#"^\s*(#import) \s*".*".*"#),
            CategoryConfig::new("Local include", r#"^\s*(#include) \s*".*".*"#),
        ],
    }
}

/// Extensions scanned when no filter is given
pub const DEFAULT_EXTENSIONS: &[&str] = &["swift", "h", "m", "mm", "c", "cc", "cpp", "hpp"];

/// Configuration for scanning
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Files or directories to scan
    pub roots: Vec<PathBuf>,
    /// File extensions to consider (without the dot)
    pub extensions: Vec<String>,
    /// Additional ignore patterns (glob style)
    pub ignore_patterns: Vec<String>,
    /// Custom ignore file path
    pub ignore_file: Option<PathBuf>,
    /// Detector config file; built-in dialects when absent
    pub detector_config: Option<PathBuf>,
    /// Number of threads (0 = auto)
    pub threads: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from(".")],
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            ignore_patterns: vec![],
            ignore_file: None,
            detector_config: None,
            threads: 0,
        }
    }
}

impl ScanConfig {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            ..Default::default()
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn with_ignore_file(mut self, path: PathBuf) -> Self {
        self.ignore_file = Some(path);
        self
    }

    pub fn with_detector_config(mut self, path: PathBuf) -> Self {
        self.detector_config = Some(path);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Load the detector config, falling back to the built-in dialects
    pub fn load_detector_config(&self) -> Result<DetectorConfig, ConfigError> {
        match &self.detector_config {
            Some(path) => DetectorConfig::from_file(path),
            None => Ok(DetectorConfig::default()),
        }
    }
}

/// Filter for ignoring files and directories.
///
/// Glob patterns match paths relative to the scanned root, so folders above
/// the root never count.
pub struct IgnoreFilter {
    root: PathBuf,
    gitignore: Option<Gitignore>,
    custom_globs: GlobSet,
    default_ignores: GlobSet,
    extensions: Vec<String>,
}

impl IgnoreFilter {
    /// Build the filter; `root` anchors the `.gitignore` lookup
    pub fn new(config: &ScanConfig, root: &Path) -> Result<Self, ConfigError> {
        let gitignore = if let Some(ref ignore_file) = config.ignore_file {
            let mut builder = GitignoreBuilder::new(root);
            if let Some(err) = builder.add(ignore_file) {
                return Err(err.into());
            }
            Some(builder.build()?)
        } else {
            let gitignore_path = root.join(".gitignore");
            if gitignore_path.is_file() {
                let mut builder = GitignoreBuilder::new(root);
                if let Some(err) = builder.add(&gitignore_path) {
                    return Err(err.into());
                }
                Some(builder.build()?)
            } else {
                None
            }
        };

        let mut custom_builder = GlobSetBuilder::new();
        for pattern in &config.ignore_patterns {
            custom_builder.add(Glob::new(pattern)?);
        }
        let custom_globs = custom_builder.build()?;

        // Build products and dependency checkouts
        let mut default_builder = GlobSetBuilder::new();
        for pattern in [
            "**/.git/**",
            "**/.build/**",
            "**/build/**",
            "**/DerivedData/**",
            "**/Pods/**",
            "**/Carthage/**",
            "**/target/**",
        ] {
            default_builder.add(Glob::new(pattern)?);
        }
        let default_ignores = default_builder.build()?;

        Ok(Self {
            root: root.to_path_buf(),
            gitignore,
            custom_globs,
            default_ignores,
            extensions: config.extensions.clone(),
        })
    }

    /// Check if a path should be ignored
    pub fn should_ignore(&self, path: &Path, is_dir: bool) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let path_str = relative.to_string_lossy();

        if self.default_ignores.is_match(&*path_str) {
            return true;
        }

        if self.custom_globs.is_match(&*path_str) {
            return true;
        }

        if let Some(ref gi) = self.gitignore {
            if gi.matched(path, is_dir).is_ignore() {
                return true;
            }
        }

        false
    }

    /// Check if a file extension is one we scan
    pub fn matches_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension() else {
            return false;
        };
        let ext = ext.to_string_lossy().to_lowercase();
        self.extensions.iter().any(|e| *e == ext)
    }
}
