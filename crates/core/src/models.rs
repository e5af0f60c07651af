use crate::config::{CategoryConfig, ConfigError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

/// Ordering hint handed to the sorter that rewrites a category's block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// A named pattern used both to detect and to classify a declaration line.
///
/// Two categories are equal when their titles and pattern sources are equal;
/// the compiled regex is derived data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CategoryConfig", into = "CategoryConfig")]
pub struct ImportCategory {
    title: String,
    declaration_pattern: Regex,
    sort_order: SortOrder,
}

impl ImportCategory {
    /// Compile a category from its pattern source
    pub fn new(
        title: impl Into<String>,
        pattern: &str,
        sort_order: SortOrder,
    ) -> Result<Self, ConfigError> {
        let title = title.into();
        let declaration_pattern = Regex::new(pattern).map_err(|source| {
            ConfigError::InvalidPattern {
                title: title.clone(),
                source,
            }
        })?;

        Ok(Self {
            title,
            declaration_pattern,
            sort_order,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn pattern(&self) -> &str {
        self.declaration_pattern.as_str()
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Does this line look like a declaration of this category?
    pub fn matches(&self, line: &str) -> bool {
        self.declaration_pattern.is_match(line)
    }
}

impl PartialEq for ImportCategory {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.pattern() == other.pattern()
    }
}

impl Eq for ImportCategory {}

impl Hash for ImportCategory {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
        self.pattern().hash(state);
    }
}

impl fmt::Display for ImportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

impl TryFrom<CategoryConfig> for ImportCategory {
    type Error = ConfigError;

    fn try_from(config: CategoryConfig) -> Result<Self, Self::Error> {
        Self::new(config.title, &config.pattern, config.sort_order)
    }
}

impl From<ImportCategory> for CategoryConfig {
    fn from(category: ImportCategory) -> Self {
        CategoryConfig {
            pattern: category.pattern().to_string(),
            title: category.title,
            sort_order: category.sort_order,
        }
    }
}

/// Ordered categories of one source-language family.
///
/// Order matters: group selection and categorization both walk the
/// categories in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCategoriesGroup {
    /// Dialect name (e.g. `swift`, `objc`)
    pub name: String,
    pub categories: Vec<ImportCategory>,
}

impl ImportCategoriesGroup {
    pub fn new(name: impl Into<String>, categories: Vec<ImportCategory>) -> Self {
        Self {
            name: name.into(),
            categories,
        }
    }

    /// True if any category in this group matches the line
    pub fn matches(&self, line: &str) -> bool {
        self.categories.iter().any(|category| category.matches(line))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImportCategory> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl<'a> IntoIterator for &'a ImportCategoriesGroup {
    type Item = &'a ImportCategory;
    type IntoIter = std::slice::Iter<'a, ImportCategory>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}

/// Raw declaration lines in source order
pub type ImportDeclarations = Vec<String>;

/// Lines matched by a single category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub category: ImportCategory,
    pub lines: Vec<String>,
}

/// Declarations grouped by category.
///
/// Buckets follow the group's declared category order and each bucket keeps
/// source order. Categories without matches have no bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorizedImportDeclarations {
    buckets: Vec<CategoryBucket>,
}

impl CategorizedImportDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line to the category's bucket, creating the bucket on first use
    pub fn push(&mut self, category: &ImportCategory, line: String) {
        match self.buckets.iter_mut().find(|b| &b.category == category) {
            Some(bucket) => bucket.lines.push(line),
            None => self.buckets.push(CategoryBucket {
                category: category.clone(),
                lines: vec![line],
            }),
        }
    }

    pub fn get(&self, category: &ImportCategory) -> Option<&[String]> {
        self.buckets
            .iter()
            .find(|b| &b.category == category)
            .map(|b| b.lines.as_slice())
    }

    pub fn get_by_title(&self, title: &str) -> Option<&[String]> {
        self.buckets
            .iter()
            .find(|b| b.category.title() == title)
            .map(|b| b.lines.as_slice())
    }

    /// Number of non-empty buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ImportCategory, &[String])> {
        self.buckets
            .iter()
            .map(|b| (&b.category, b.lines.as_slice()))
    }

    /// Sum of all bucket sizes; exceeds the flat count when patterns overlap
    pub fn total_lines(&self) -> usize {
        self.buckets.iter().map(|b| b.lines.len()).sum()
    }
}

/// Detection result for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBlock {
    pub group: ImportCategoriesGroup,
    pub declarations: ImportDeclarations,
    pub categorized_declarations: CategorizedImportDeclarations,
}

impl ImportBlock {
    /// Name of the selected dialect
    pub fn dialect(&self) -> &str {
        &self.group.name
    }

    pub fn total_categorized(&self) -> usize {
        self.categorized_declarations.total_lines()
    }
}

/// Per-file entry of a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// Path relative to the scanned root
    pub path: PathBuf,
    /// Selected dialect, absent when the file has no import block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<ImportBlock>,
}

impl FileReport {
    pub fn has_block(&self) -> bool {
        self.block.is_some()
    }
}

/// Aggregated scan results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub roots: Vec<PathBuf>,
    pub files: Vec<FileReport>,
    pub stats: ScanStats,
    pub metadata: ScanMetadata,
}

impl ScanReport {
    /// Drop files without an import block
    pub fn filter_to_blocks(&self) -> Self {
        ScanReport {
            roots: self.roots.clone(),
            files: self
                .files
                .iter()
                .filter(|f| f.has_block())
                .cloned()
                .collect(),
            stats: self.stats.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// Statistics about a scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub total_files: usize,
    pub files_with_block: usize,
    pub files_without_block: usize,
    pub total_declarations: usize,
    /// Files per selected dialect
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dialects: BTreeMap<String, usize>,
}

impl ScanStats {
    pub fn from_files(files: &[FileReport]) -> Self {
        let mut stats = ScanStats {
            total_files: files.len(),
            ..Default::default()
        };

        for file in files {
            match &file.block {
                Some(block) => {
                    stats.files_with_block += 1;
                    stats.total_declarations += block.declarations.len();
                    *stats
                        .dialects
                        .entry(block.dialect().to_string())
                        .or_insert(0) += 1;
                }
                None => stats.files_without_block += 1,
            }
        }

        stats
    }
}

/// Scan metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub scan_duration_ms: u64,
    pub timestamp: String,
    pub tool_version: String,
}

impl Default for ScanMetadata {
    fn default() -> Self {
        Self {
            scan_duration_ms: 0,
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
