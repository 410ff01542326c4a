//! JSON report exporter
//!
//! Writes a single document with a `summary` object and a `findings` list
//! pairing each finding with its source file. INFO findings appear in the
//! list but are not counted in the summary; that asymmetry is part of the
//! report contract.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use super::Exporter;
use crate::error::ExportError;
use crate::models::{Finding, ScanResult, Severity};

pub struct JsonExporter {
    output_file: PathBuf,
}

impl JsonExporter {
    pub fn new(output_file: impl Into<PathBuf>) -> Self {
        Self {
            output_file: output_file.into(),
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    summary: Summary,
    findings: Vec<FindingEntry<'a>>,
}

#[derive(Serialize)]
struct Summary {
    #[serde(rename = "Total Findings")]
    total_findings: usize,
    #[serde(rename = "Critical")]
    critical: usize,
    #[serde(rename = "High")]
    high: usize,
    #[serde(rename = "Medium")]
    medium: usize,
    #[serde(rename = "Low")]
    low: usize,
}

#[derive(Serialize)]
struct FindingEntry<'a> {
    finding: &'a Finding,
    file: &'a str,
}

impl Exporter for JsonExporter {
    fn export(&self, results: &[ScanResult]) -> Result<(), ExportError> {
        let mut findings = Vec::new();
        let mut summary = Summary {
            total_findings: 0,
            critical: 0,
            high: 0,
            medium: 0,
            low: 0,
        };

        for result in results {
            for finding in &result.findings {
                match finding.severity {
                    Severity::Critical => summary.critical += 1,
                    Severity::High => summary.high += 1,
                    Severity::Medium => summary.medium += 1,
                    Severity::Low => summary.low += 1,
                    Severity::Info => {}
                }
                findings.push(FindingEntry {
                    finding,
                    file: &result.source_file,
                });
            }
        }
        summary.total_findings = findings.len();

        let report = Report { summary, findings };
        let rendered = serde_json::to_string_pretty(&report)?;

        fs::write(&self.output_file, rendered).map_err(|source| ExportError::Io {
            path: self.output_file.display().to_string(),
            source,
        })?;

        info!(path = %self.output_file.display(), "findings exported");
        Ok(())
    }
}
