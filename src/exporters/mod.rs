//! Exporters - report writers for scan results

pub mod json;

pub use json::JsonExporter;

use crate::error::ExportError;
use crate::models::ScanResult;

/// Writes the complete scan result aggregate to its configured output.
/// Invoked exactly once per scan, after aggregation and filtering.
pub trait Exporter: Send + Sync {
    fn export(&self, results: &[ScanResult]) -> Result<(), ExportError>;
}
