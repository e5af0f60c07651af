use super::FormatError;
use crate::models::ScanReport;

/// Serialize a ScanReport to YAML
pub fn to_yaml(report: &ScanReport) -> Result<String, FormatError> {
    serde_yaml::to_string(report).map_err(FormatError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScanMetadata, ScanStats};
    use std::path::PathBuf;

    #[test]
    fn test_to_yaml() {
        let report = ScanReport {
            roots: vec![PathBuf::from("/test")],
            files: vec![],
            stats: ScanStats::default(),
            metadata: ScanMetadata::default(),
        };

        let yaml = to_yaml(&report).unwrap();
        assert!(yaml.contains("roots:"));
        assert!(yaml.contains("files:"));
    }
}
