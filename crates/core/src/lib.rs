//! MTA Rust ImportBlock Core Library
//!
//! This library detects the import block of a source file and classifies
//! each declaration into a category of one language dialect, so a formatter
//! can rewrite the block grouped and sorted.
//!
//! # Features
//!
//! - Built-in Swift (`import`, `@testable import`) and Objective-C/C
//!   (`@import`, `#import`, `#include`) dialects
//! - Dialect groups loaded from TOML or JSON config files
//! - Skips declarations inside `#if`/`#ifdef` blocks and
//!   `#pragma clang diagnostic push`/`pop` regions
//! - Parallel scanning of files and directories
//! - Output results in JSON, YAML or a text summary
//!
//! # Example
//!
//! ```
//! use mta_rust_importblock_core::ImportBlockDetector;
//!
//! let detector = ImportBlockDetector::builtin().unwrap();
//! let block = detector
//!     .import_block(&["#import <Foo/Foo.h>", "#import \"Bar.h\""])
//!     .unwrap();
//!
//! assert_eq!(block.dialect(), "objc");
//! assert_eq!(block.declarations.len(), 2);
//! ```

pub mod config;
pub mod detector;
pub mod models;
pub mod output;
pub mod scanner;

// Re-exports for convenience
pub use config::{
    CategoryConfig, ConfigError, DetectorConfig, DirectiveConfig, GroupConfig, ScanConfig,
};
pub use detector::{DetectError, ImportBlockDetector};
pub use models::*;
pub use output::{format_output, format_summary, FormatError, OutputFormat};
pub use scanner::{detect_in_text, split_lines, ImportBlockScanner, ScanError};
