use mta_rust_importblock_core::{
    DetectorConfig, ImportBlockDetector, ImportBlockScanner, ScanConfig, ScanError,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "App/ViewController.swift",
        "import UIKit\n@testable import Core\n\nfinal class ViewController {}\n",
    );
    write(
        dir.path(),
        "App/Legacy/View.m",
        "#import \"View.h\"\n\
         #import <UIKit/UIKit.h>\n\
         #ifdef DEBUG\n\
         #import \"DebugMenu.h\"\n\
         #endif\n\
         \n\
         @implementation View\n\
         @end\n",
    );
    write(dir.path(), "App/Model.swift", "struct Model {}\n");
    write(dir.path(), "README.md", "import Nothing\n");
    write(dir.path(), "Pods/AFNetworking/AF.h", "#import <Foundation/Foundation.h>\n");
    dir
}

#[test]
fn scan_project_detects_each_dialect() {
    let dir = project();
    let config = ScanConfig::new(vec![dir.path().to_path_buf()]).with_threads(1);
    let report = ImportBlockScanner::new(config).unwrap().scan().unwrap();

    let paths: Vec<PathBuf> = report.files.iter().map(|f| f.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("App/Legacy/View.m"),
            PathBuf::from("App/Model.swift"),
            PathBuf::from("App/ViewController.swift"),
        ]
    );

    let view = &report.files[0];
    assert_eq!(view.dialect.as_deref(), Some("objc"));
    let block = view.block.as_ref().unwrap();
    assert_eq!(
        block.declarations,
        vec!["#import \"View.h\"\n", "#import <UIKit/UIKit.h>\n"]
    );

    assert!(!report.files[1].has_block());

    let controller = report.files[2].block.as_ref().unwrap();
    assert_eq!(controller.dialect(), "swift");
    assert_eq!(
        controller
            .categorized_declarations
            .get_by_title("Testable import"),
        Some(&["@testable import Core\n".to_string()][..])
    );

    assert_eq!(report.stats.total_files, 3);
    assert_eq!(report.stats.files_with_block, 2);
    assert_eq!(report.stats.files_without_block, 1);
    assert_eq!(report.stats.total_declarations, 4);
    assert_eq!(report.stats.dialects.get("objc"), Some(&1));
    assert_eq!(report.stats.dialects.get("swift"), Some(&1));
}

#[test]
fn parallel_scan_matches_sequential_scan() {
    let dir = project();
    let sequential = ImportBlockScanner::new(
        ScanConfig::new(vec![dir.path().to_path_buf()]).with_threads(1),
    )
    .unwrap()
    .scan()
    .unwrap();
    let parallel = ImportBlockScanner::new(
        ScanConfig::new(vec![dir.path().to_path_buf()]).with_threads(2),
    )
    .unwrap()
    .scan()
    .unwrap();

    assert_eq!(sequential.stats, parallel.stats);
    assert_eq!(sequential.files.len(), parallel.files.len());
}

#[test]
fn scan_respects_extension_and_ignore_filters() {
    let dir = project();
    let config = ScanConfig::new(vec![dir.path().to_path_buf()])
        .with_extensions(vec!["m".to_string()])
        .with_ignore_patterns(vec!["**/Legacy/**".to_string()]);
    let report = ImportBlockScanner::new(config).unwrap().scan().unwrap();

    assert!(report.files.is_empty());
}

#[test]
fn root_under_build_directory_is_scanned() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("build/MyApp");
    write(&root, "Sources/View.swift", "import UIKit\n");
    write(&root, "Pods/Alamofire/AF.swift", "import Foundation\n");

    let report = ImportBlockScanner::new(ScanConfig::new(vec![root]))
        .unwrap()
        .scan()
        .unwrap();

    let paths: Vec<PathBuf> = report.files.iter().map(|f| f.path.clone()).collect();
    assert_eq!(paths, vec![PathBuf::from("Sources/View.swift")]);
    assert_eq!(report.stats.files_with_block, 1);
}

#[test]
fn ignore_glob_is_relative_to_root() {
    let dir = project();
    write(dir.path(), "Generated/Strings.swift", "import Foundation\n");

    let config = ScanConfig::new(vec![dir.path().to_path_buf()])
        .with_ignore_patterns(vec!["Generated/**".to_string()]);
    let report = ImportBlockScanner::new(config).unwrap().scan().unwrap();

    assert!(report
        .files
        .iter()
        .all(|f| !f.path.starts_with("Generated")));
    assert_eq!(report.stats.total_files, 3);
}

#[test]
fn scan_respects_gitignore() {
    let dir = project();
    write(dir.path(), ".gitignore", "Legacy/\n");
    let config = ScanConfig::new(vec![dir.path().to_path_buf()]);
    let report = ImportBlockScanner::new(config).unwrap().scan().unwrap();

    assert!(report
        .files
        .iter()
        .all(|f| !f.path.starts_with("App/Legacy")));
    assert_eq!(report.stats.total_files, 2);
}

#[test]
fn file_root_is_scanned_directly() {
    let dir = project();
    let file = dir.path().join("App/ViewController.swift");
    let report = ImportBlockScanner::new(ScanConfig::new(vec![file.clone()]))
        .unwrap()
        .scan()
        .unwrap();

    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].path, file);
    assert_eq!(report.files[0].dialect.as_deref(), Some("swift"));
}

#[test]
fn scan_with_custom_dialects_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "dialects.toml",
        r#"
        [[groups]]
        name = "python"

        [[groups.categories]]
        title = "Plain import"
        pattern = '^import \S+'

        [[groups.categories]]
        title = "From import"
        pattern = '^from \S+ import '
        "#,
    );
    write(
        dir.path(),
        "src/app.py",
        "import os\nfrom typing import List\n\ndef main():\n    pass\n",
    );

    let config = ScanConfig::new(vec![dir.path().join("src")])
        .with_extensions(vec!["py".to_string()])
        .with_detector_config(dir.path().join("dialects.toml"));
    let report = ImportBlockScanner::new(config).unwrap().scan().unwrap();

    let block = report.files[0].block.as_ref().unwrap();
    assert_eq!(block.dialect(), "python");
    assert_eq!(block.categorized_declarations.len(), 2);
}

#[test]
fn invalid_detector_config_fails_scanner_creation() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "broken.json",
        r#"{"groups": [{"name": "x", "categories": [{"title": "Bad", "pattern": "("}]}]}"#,
    );

    let config = ScanConfig::default().with_detector_config(dir.path().join("broken.json"));
    assert!(matches!(
        ImportBlockScanner::new(config),
        Err(ScanError::ConfigError(_))
    ));
}

#[test]
fn scanner_accepts_precompiled_detector() {
    let dir = project();
    let detector = ImportBlockDetector::new(&DetectorConfig::default()).unwrap();
    let scanner = ImportBlockScanner::with_detector(
        ScanConfig::new(vec![dir.path().join("App/Legacy")]),
        detector,
    );

    let report = scanner.scan().unwrap();
    assert_eq!(report.stats.files_with_block, 1);
    assert_eq!(scanner.detector().groups().len(), 2);
}
