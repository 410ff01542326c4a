//! Kubernetes manifest analyzer
//!
//! Parses multi-document YAML manifests. Each document with a `kind`
//! yields one resource (type = lowercased kind), plus one `container`
//! resource per entry in `spec.containers` or
//! `spec.template.spec.containers`.
//!
//! Discovery assigns no files to this provider by name alone (manifests
//! are generic YAML); the analyzer serves callers that route files here
//! through their own detection.

use std::path::Path;

use async_trait::async_trait;
use serde_yaml::Value;

use super::{read_file, yaml_to_json, Analyzer};
use crate::error::AnalysisError;
use crate::models::{Location, Provider, Resource};

pub struct KubernetesAnalyzer;

#[async_trait]
impl Analyzer for KubernetesAnalyzer {
    fn provider(&self) -> Provider {
        Provider::Kubernetes
    }

    async fn analyze(&self, path: &Path) -> Result<Vec<Resource>, AnalysisError> {
        let content = read_file(path).await?;
        let file = path.display().to_string();
        let mut resources = Vec::new();

        for document in split_documents(&content) {
            let value: Value =
                serde_yaml::from_str(&document.text).map_err(|e| AnalysisError::Parse {
                    path: file.clone(),
                    message: e.to_string(),
                })?;

            let Some(kind) = value.get("kind").and_then(Value::as_str) else {
                continue;
            };

            let location = Location::new(&file, document.start_line, document.end_line);
            let name = value
                .get("metadata")
                .and_then(|m| m.get("name"))
                .and_then(Value::as_str)
                .unwrap_or("unnamed");

            let mut workload = Resource::new(
                kind.to_lowercase(),
                name,
                Provider::Kubernetes,
                location.clone(),
            )
            .with_attribute("kind", kind);

            if let Some(api_version) = value.get("apiVersion").and_then(Value::as_str) {
                workload = workload.with_attribute("api_version", api_version);
            }

            let pod_spec = pod_spec(&value);
            if let Some(host_network) = pod_spec
                .and_then(|s| s.get("hostNetwork"))
                .and_then(Value::as_bool)
            {
                workload = workload.with_attribute("host_network", host_network);
            }

            resources.push(workload);

            if let Some(containers) = pod_spec
                .and_then(|s| s.get("containers"))
                .and_then(Value::as_sequence)
            {
                for container in containers {
                    resources.push(container_resource(container, &location));
                }
            }
        }

        Ok(resources)
    }
}

/// Locate the pod spec: `spec` for bare pods, `spec.template.spec` for
/// workload controllers.
fn pod_spec(value: &Value) -> Option<&Value> {
    let spec = value.get("spec")?;
    match spec.get("template").and_then(|t| t.get("spec")) {
        Some(template_spec) => Some(template_spec),
        None => Some(spec),
    }
}

fn container_resource(container: &Value, location: &Location) -> Resource {
    let name = container
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("unnamed");

    let mut resource = Resource::new("container", name, Provider::Kubernetes, location.clone());

    if let Some(image) = container.get("image").and_then(Value::as_str) {
        resource = resource.with_attribute("image", image);
    }
    if let Some(privileged) = container
        .get("securityContext")
        .and_then(|s| s.get("privileged"))
        .and_then(Value::as_bool)
    {
        resource = resource.with_attribute("privileged", privileged);
    }
    if let Some(ports) = container.get("ports") {
        resource = resource.with_attribute("ports", yaml_to_json(ports));
    }

    resource
}

struct Document {
    text: String,
    start_line: usize,
    end_line: usize,
}

/// Split multi-document YAML on `---` separators, keeping 1-based line
/// ranges for each document.
fn split_documents(content: &str) -> Vec<Document> {
    let mut documents = Vec::new();
    let mut buffer = String::new();
    let mut start_line = 1;

    let flush = |documents: &mut Vec<Document>, buffer: &mut String, start: usize, end: usize| {
        if buffer.trim().is_empty() {
            buffer.clear();
            return;
        }
        documents.push(Document {
            text: std::mem::take(buffer),
            start_line: start,
            end_line: end,
        });
    };

    let mut last_line = 0;
    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        if line.trim_end() == "---" {
            flush(&mut documents, &mut buffer, start_line, line_no - 1);
            start_line = line_no + 1;
        } else {
            buffer.push_str(line);
            buffer.push('\n');
        }
    }
    flush(&mut documents, &mut buffer, start_line, last_line);

    documents
}
