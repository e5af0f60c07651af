use super::FormatError;
use crate::models::ScanReport;

/// Serialize a ScanReport to pretty-printed JSON
pub fn to_json(report: &ScanReport) -> Result<String, FormatError> {
    serde_json::to_string_pretty(report).map_err(FormatError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScanMetadata, ScanStats};
    use std::path::PathBuf;

    #[test]
    fn test_to_json() {
        let report = ScanReport {
            roots: vec![PathBuf::from("/test")],
            files: vec![],
            stats: ScanStats::default(),
            metadata: ScanMetadata::default(),
        };

        let json = to_json(&report).unwrap();
        assert!(json.contains("\"roots\""));
        assert!(json.contains("\"files\""));
        assert!(json.contains("\"tool_version\""));
    }
}
