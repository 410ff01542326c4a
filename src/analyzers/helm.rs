//! Helm chart analyzer
//!
//! `Chart.yaml` yields a `chart` resource with chart metadata; `values*.yaml`
//! files yield a `values` resource whose attributes are the top-level keys.

use std::path::Path;

use async_trait::async_trait;
use serde_yaml::Value;

use super::{read_file, yaml_to_json, Analyzer};
use crate::error::AnalysisError;
use crate::models::{Location, Provider, Resource};

pub struct HelmAnalyzer;

#[async_trait]
impl Analyzer for HelmAnalyzer {
    fn provider(&self) -> Provider {
        Provider::Helm
    }

    async fn analyze(&self, path: &Path) -> Result<Vec<Resource>, AnalysisError> {
        let content = read_file(path).await?;
        let file = path.display().to_string();
        let line_count = content.lines().count().max(1);

        let value: Value = serde_yaml::from_str(&content).map_err(|e| AnalysisError::Parse {
            path: file.clone(),
            message: e.to_string(),
        })?;

        let location = Location::new(&file, 1, line_count);
        let base_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if base_name.starts_with("Chart.") {
            Ok(vec![chart_resource(&value, &base_name, location)])
        } else {
            Ok(vec![values_resource(&value, path, location)])
        }
    }
}

fn chart_resource(value: &Value, base_name: &str, location: Location) -> Resource {
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(base_name);

    let mut resource = Resource::new("chart", name, Provider::Helm, location);
    for key in ["version", "appVersion", "apiVersion"] {
        if let Some(v) = value.get(key).and_then(Value::as_str) {
            resource = resource.with_attribute(snake_case(key), v);
        }
    }
    resource
}

fn values_resource(value: &Value, path: &Path, location: Location) -> Resource {
    let name = path
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "values".to_string());

    let mut resource = Resource::new("values", name, Provider::Helm, location);
    if let Value::Mapping(map) = value {
        for (key, val) in map {
            if let Value::String(key) = key {
                resource = resource.with_attribute(key.clone(), yaml_to_json(val));
            }
        }
    }
    resource
}

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 2);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
