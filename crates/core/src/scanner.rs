use crate::config::{ConfigError, IgnoreFilter, ScanConfig};
use crate::detector::{DetectError, ImportBlockDetector};
use crate::models::{FileReport, ImportBlock, ScanMetadata, ScanReport, ScanStats};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Split file content into lines, keeping line terminators so extracted
/// declarations can be written back unchanged
pub fn split_lines(content: &str) -> Vec<&str> {
    content.split_inclusive('\n').collect()
}

/// Detect the import block of a whole file's text
pub fn detect_in_text(
    detector: &ImportBlockDetector,
    content: &str,
) -> Result<ImportBlock, DetectError> {
    detector.import_block(split_lines(content).as_slice())
}

/// A file selected for scanning, with the root it was found under
struct SourceFile {
    root: PathBuf,
    path: PathBuf,
}

/// Scanner detecting import blocks across files and directories
pub struct ImportBlockScanner {
    config: ScanConfig,
    detector: ImportBlockDetector,
}

impl ImportBlockScanner {
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        let detector = ImportBlockDetector::new(&config.load_detector_config()?)?;
        Ok(Self { config, detector })
    }

    /// Use an already compiled detector
    pub fn with_detector(config: ScanConfig, detector: ImportBlockDetector) -> Self {
        Self { config, detector }
    }

    pub fn detector(&self) -> &ImportBlockDetector {
        &self.detector
    }

    /// Scan all roots and return the report
    pub fn scan(&self) -> Result<ScanReport, ScanError> {
        let start = Instant::now();

        let source_files = self.find_source_files()?;
        debug!(count = source_files.len(), "collected source files");

        let files: Vec<FileReport> = match self.config.threads {
            1 => source_files
                .iter()
                .filter_map(|file| self.scan_file(file))
                .collect(),
            0 => source_files
                .par_iter()
                .filter_map(|file| self.scan_file(file))
                .collect(),
            threads => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?;
                pool.install(|| {
                    source_files
                        .par_iter()
                        .filter_map(|file| self.scan_file(file))
                        .collect()
                })
            }
        };

        let stats = ScanStats::from_files(&files);
        let metadata = ScanMetadata {
            scan_duration_ms: start.elapsed().as_millis() as u64,
            ..Default::default()
        };

        info!(
            files = stats.total_files,
            with_block = stats.files_with_block,
            declarations = stats.total_declarations,
            "scan finished"
        );

        Ok(ScanReport {
            roots: self.config.roots.clone(),
            files,
            stats,
            metadata,
        })
    }

    /// Find all files under the roots that pass the ignore and extension filters
    fn find_source_files(&self) -> Result<Vec<SourceFile>, ScanError> {
        let mut files = Vec::new();

        for root in &self.config.roots {
            let ignore_filter = IgnoreFilter::new(&self.config, root)?;

            for entry in WalkDir::new(root)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| {
                    e.depth() == 0
                        || !ignore_filter.should_ignore(e.path(), e.file_type().is_dir())
                })
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_dir() {
                    continue;
                }

                let path = entry.path();

                // A root given as a file is scanned whatever its extension
                if entry.depth() > 0 && !ignore_filter.matches_extension(path) {
                    continue;
                }

                files.push(SourceFile {
                    root: root.clone(),
                    path: path.to_path_buf(),
                });
            }
        }

        Ok(files)
    }

    /// Read and detect a single file; unreadable files are skipped
    fn scan_file(&self, file: &SourceFile) -> Option<FileReport> {
        let content = match fs::read_to_string(&file.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "skipping unreadable file");
                return None;
            }
        };

        let block = match detect_in_text(&self.detector, &content) {
            Ok(block) => Some(block),
            Err(DetectError::NotFound) => {
                debug!(path = %file.path.display(), "no import block");
                None
            }
        };

        Some(FileReport {
            path: relative_path(&file.root, &file.path),
            dialect: block.as_ref().map(|b| b.dialect().to_string()),
            block,
        })
    }
}

fn relative_path(root: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
        _ => path.to_path_buf(),
    }
}
