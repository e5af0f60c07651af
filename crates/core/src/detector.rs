//! Import block detection.
//!
//! Detection runs in three steps over the lines of one file:
//!
//! 1. pick the dialect group: the first line matching any category of any
//!    group decides, groups and categories tried in declared order;
//! 2. extract declaration lines of that group, skipping lines inside
//!    `#if`/`#ifdef` blocks and `#pragma clang diagnostic push`/`pop` regions;
//! 3. bucket the extracted lines by every category they match.

use crate::config::{ConfigError, DetectorConfig, DirectiveConfig};
use crate::models::{
    CategorizedImportDeclarations, ImportBlock, ImportCategoriesGroup, ImportCategory,
    ImportDeclarations, SortOrder,
};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    /// No line matched any category of any group
    #[error("No import declarations found")]
    NotFound,
}

/// Line that opens or closes a skip zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    ConditionalBegin,
    ConditionalEnd,
    SuppressionBegin,
    SuppressionEnd,
}

/// Compiled skip-zone directive patterns
#[derive(Debug, Clone)]
struct SkipDirectives {
    if_define_begin: ImportCategory,
    if_macro_begin: ImportCategory,
    if_end: ImportCategory,
    diagnostic_push: ImportCategory,
    diagnostic_pop: ImportCategory,
}

impl SkipDirectives {
    fn new(config: &DirectiveConfig) -> Result<Self, ConfigError> {
        let compile = |title: &str, pattern: &str| {
            ImportCategory::new(title, pattern, SortOrder::Ascending)
        };

        Ok(Self {
            if_define_begin: compile("#ifdef begin", &config.if_define_begin)?,
            if_macro_begin: compile("#if begin", &config.if_macro_begin)?,
            if_end: compile("#endif", &config.if_end)?,
            diagnostic_push: compile("diagnostic push", &config.diagnostic_push)?,
            diagnostic_pop: compile("diagnostic pop", &config.diagnostic_pop)?,
        })
    }

    fn classify(&self, line: &str) -> Option<Directive> {
        if self.if_define_begin.matches(line) || self.if_macro_begin.matches(line) {
            Some(Directive::ConditionalBegin)
        } else if self.if_end.matches(line) {
            Some(Directive::ConditionalEnd)
        } else if self.diagnostic_push.matches(line) {
            Some(Directive::SuppressionBegin)
        } else if self.diagnostic_pop.matches(line) {
            Some(Directive::SuppressionEnd)
        } else {
            None
        }
    }
}

/// Skip-zone state of the extraction scan.
///
/// Conditional depth and diagnostic suppression are tracked independently;
/// either one being active hides declarations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ScanState {
    conditional_depth: usize,
    suppressed: bool,
}

impl ScanState {
    fn apply(self, directive: Directive) -> Self {
        match directive {
            Directive::ConditionalBegin => Self {
                conditional_depth: self.conditional_depth + 1,
                ..self
            },
            // A stray #endif at depth zero is a no-op
            Directive::ConditionalEnd => Self {
                conditional_depth: self.conditional_depth.saturating_sub(1),
                ..self
            },
            Directive::SuppressionBegin => Self {
                suppressed: true,
                ..self
            },
            Directive::SuppressionEnd => Self {
                suppressed: false,
                ..self
            },
        }
    }

    fn is_skipping(&self) -> bool {
        self.conditional_depth > 0 || self.suppressed
    }
}

/// Detects and categorizes the import block of a file.
///
/// Holds only the compiled configuration, so one detector can serve any
/// number of files, from any number of threads.
#[derive(Debug, Clone)]
pub struct ImportBlockDetector {
    groups: Vec<ImportCategoriesGroup>,
    directives: SkipDirectives,
}

impl ImportBlockDetector {
    /// Compile a detector from config
    pub fn new(config: &DetectorConfig) -> Result<Self, ConfigError> {
        let groups = config.build_groups()?;
        let directives = SkipDirectives::new(&config.directives)?;

        Ok(Self { groups, directives })
    }

    /// Detector with the built-in Swift and Objective-C/C dialects
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(&DetectorConfig::default())
    }

    /// Candidate groups in precedence order
    pub fn groups(&self) -> &[ImportCategoriesGroup] {
        &self.groups
    }

    /// Detect the import block of `lines`.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::NotFound`] when no line matches any category;
    /// callers should read that as "nothing to format".
    pub fn import_block<S: AsRef<str>>(&self, lines: &[S]) -> Result<ImportBlock, DetectError> {
        let group = self.group_for(lines).ok_or(DetectError::NotFound)?;
        debug!(dialect = %group.name, lines = lines.len(), "selected dialect group");

        let declarations = self.declarations(lines, group);
        let categorized_declarations =
            self.categorized_declarations(declarations.as_slice(), group);

        Ok(ImportBlock {
            group: group.clone(),
            declarations,
            categorized_declarations,
        })
    }

    /// First group owning a category that matches a line, scanning lines
    /// top to bottom
    pub fn group_for<S: AsRef<str>>(&self, lines: &[S]) -> Option<&ImportCategoriesGroup> {
        lines.iter().find_map(|line| {
            self.groups
                .iter()
                .find(|group| group.matches(line.as_ref()))
        })
    }

    /// Lines matching `group` outside of skip zones, in source order.
    ///
    /// Directive lines are never declarations themselves.
    pub fn declarations<S: AsRef<str>>(
        &self,
        lines: &[S],
        group: &ImportCategoriesGroup,
    ) -> ImportDeclarations {
        let (_, declarations) = lines.iter().map(|line| line.as_ref()).fold(
            (ScanState::default(), ImportDeclarations::new()),
            |(state, mut declarations), line| {
                if let Some(directive) = self.directives.classify(line) {
                    return (state.apply(directive), declarations);
                }
                if !state.is_skipping() && group.matches(line) {
                    declarations.push(line.to_string());
                }
                (state, declarations)
            },
        );

        declarations
    }

    /// Bucket `lines` by category; a line lands in every category it matches
    pub fn categorized_declarations<S: AsRef<str>>(
        &self,
        lines: &[S],
        group: &ImportCategoriesGroup,
    ) -> CategorizedImportDeclarations {
        let mut categorized = CategorizedImportDeclarations::new();

        // Category-major so buckets come out in declared order
        for category in group {
            for line in lines.iter().map(|line| line.as_ref()) {
                if category.matches(line) {
                    categorized.push(category, line.to_string());
                }
            }
        }

        categorized
    }
}
