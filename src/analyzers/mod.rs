//! Analyzers - provider-specific resource extraction
//!
//! An [`Analyzer`] turns one IaC file into a list of normalized
//! [`Resource`]s. One analyzer is registered per provider before scanning
//! starts; analyzers are shared read-only across concurrent scans.

pub mod docker;
pub mod helm;
pub mod kubernetes;
pub mod terraform;

pub use docker::DockerAnalyzer;
pub use helm::HelmAnalyzer;
pub use kubernetes::KubernetesAnalyzer;
pub use terraform::TerraformAnalyzer;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::models::{Provider, Resource};

/// Parses IaC files and extracts resources for one provider
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// The provider this analyzer handles
    fn provider(&self) -> Provider;

    /// Parse a file and return the resources defined in it
    async fn analyze(&self, path: &Path) -> Result<Vec<Resource>, AnalysisError>;
}

/// All built-in analyzers
pub fn builtin() -> Vec<Arc<dyn Analyzer>> {
    vec![
        Arc::new(DockerAnalyzer),
        Arc::new(TerraformAnalyzer),
        Arc::new(KubernetesAnalyzer),
        Arc::new(HelmAnalyzer),
    ]
}

/// Read a file into a string, mapping I/O failures to [`AnalysisError`]
pub(crate) async fn read_file(path: &Path) -> Result<String, AnalysisError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AnalysisError::FileRead {
            path: path.display().to_string(),
            source,
        })
}

/// Convert a YAML value into a JSON value for resource attributes
pub(crate) fn yaml_to_json(value: &serde_yaml::Value) -> serde_json::Value {
    match value {
        serde_yaml::Value::Null => serde_json::Value::Null,
        serde_yaml::Value::Bool(b) => serde_json::Value::Bool(*b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::Value::from(i)
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null)
            } else {
                serde_json::Value::Null
            }
        }
        serde_yaml::Value::String(s) => serde_json::Value::String(s.clone()),
        serde_yaml::Value::Sequence(seq) => {
            serde_json::Value::Array(seq.iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                if let serde_yaml::Value::String(key) = k {
                    out.insert(key.clone(), yaml_to_json(v));
                }
            }
            serde_json::Value::Object(out)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}
