mod json;
mod yaml;

pub use json::to_json;
pub use yaml::to_yaml;

use crate::models::ScanReport;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Summary,
}

/// Format a ScanReport according to the specified format
pub fn format_output(report: &ScanReport, format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Yaml => to_yaml(report),
        OutputFormat::Summary => Ok(format_summary(report)),
    }
}

/// Generate a human-readable summary
pub fn format_summary(report: &ScanReport) -> String {
    let mut output = String::new();

    output.push_str(
        "Import Block Summary\n\
         ====================\n",
    );
    for root in &report.roots {
        output.push_str(&format!("Root: {}\n", root.display()));
    }
    output.push('\n');

    for file in &report.files {
        let Some(block) = &file.block else {
            output.push_str(&format!("{} (no import block)\n", file.path.display()));
            continue;
        };

        output.push_str(&format!(
            "{} [{}] {} declaration(s)\n",
            file.path.display(),
            block.dialect(),
            block.declarations.len()
        ));
        for (category, lines) in block.categorized_declarations.iter() {
            output.push_str(&format!("  {}:\n", category.title()));
            for line in lines {
                output.push_str(&format!("    {}\n", line.trim_end()));
            }
        }
    }
    if !report.files.is_empty() {
        output.push('\n');
    }

    output.push_str(&format!(
        "Files Scanned: {}\n\
         - With import block: {}\n\
         - Without import block: {}\n\
         Total Declarations: {}\n",
        report.stats.total_files,
        report.stats.files_with_block,
        report.stats.files_without_block,
        report.stats.total_declarations,
    ));

    if !report.stats.dialects.is_empty() {
        output.push_str("Dialects:\n");
        for (dialect, count) in &report.stats.dialects {
            output.push_str(&format!("  {}: {}\n", dialect, count));
        }
    }
    output.push('\n');

    output.push_str(&format!(
        "Scan Duration: {}ms\n\
         Timestamp: {}\n\
         Tool Version: {}\n",
        report.metadata.scan_duration_ms, report.metadata.timestamp, report.metadata.tool_version
    ));

    output
}

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}
