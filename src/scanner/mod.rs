//! Scan unit - one analyzer plus the rule registry
//!
//! A [`FileScanner`] binds a single analyzer to the shared rule registry
//! and turns one file path into a [`ScanResult`]. Either the whole file
//! scan succeeds or the caller receives an error; no partial results.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::analyzers::Analyzer;
use crate::error::FileScanError;
use crate::models::ScanResult;
use crate::rules::RuleRegistry;

pub struct FileScanner {
    analyzer: Arc<dyn Analyzer>,
    rules: Arc<RuleRegistry>,
}

impl FileScanner {
    pub fn new(analyzer: Arc<dyn Analyzer>, rules: Arc<RuleRegistry>) -> Self {
        Self { analyzer, rules }
    }

    /// Analyze the file and evaluate rules over the extracted resources
    pub async fn scan_file(&self, path: &Path) -> Result<ScanResult, FileScanError> {
        let resources =
            self.analyzer
                .analyze(path)
                .await
                .map_err(|source| FileScanError::Analysis {
                    path: path.display().to_string(),
                    source,
                })?;

        let findings = self.rules.evaluate(&resources);

        debug!(
            file = %path.display(),
            resources = resources.len(),
            findings = findings.len(),
            "scanned file"
        );

        Ok(ScanResult {
            source_file: path.display().to_string(),
            provider: self.analyzer.provider(),
            resources,
            findings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::DockerAnalyzer;
    use crate::models::Severity;
    use crate::rules::{builtin, RuleRegistry};
    use std::fs;
    use tempfile::TempDir;

    fn scanner() -> FileScanner {
        let mut registry = RuleRegistry::new();
        registry.register_all(builtin::docker::rules());
        FileScanner::new(Arc::new(DockerAnalyzer), Arc::new(registry))
    }

    #[tokio::test]
    async fn test_scan_file_combines_resources_and_findings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Dockerfile");
        fs::write(&path, "FROM ubuntu:latest\nUSER root\n").unwrap();

        let result = scanner().scan_file(&path).await.unwrap();

        assert_eq!(result.provider, crate::models::Provider::Docker);
        assert_eq!(result.resources.len(), 2);
        assert_eq!(result.findings.len(), 2);
        assert!(result.findings.iter().any(|f| f.rule_id == "DOCKER001"));
        assert!(result.findings.iter().any(|f| f.rule_id == "DOCKER002"));
    }

    #[tokio::test]
    async fn test_findings_reference_resources_from_the_same_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Dockerfile");
        fs::write(&path, "FROM node:latest\n").unwrap();

        let result = scanner().scan_file(&path).await.unwrap();

        for finding in &result.findings {
            assert!(result.resources.contains(&finding.resource));
            assert_eq!(finding.severity, Severity::Critical);
        }
    }

    #[tokio::test]
    async fn test_analyzer_failure_yields_no_partial_result() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Dockerfile");
        fs::write(&path, "FROM\n").unwrap();

        let result = scanner().scan_file(&path).await;
        assert!(matches!(result, Err(FileScanError::Analysis { .. })));
    }

    #[tokio::test]
    async fn test_missing_file_maps_to_analysis_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = scanner()
            .scan_file(&temp_dir.path().join("missing"))
            .await;
        assert!(matches!(result, Err(FileScanError::Analysis { .. })));
    }
}
