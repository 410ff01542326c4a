//! Terraform analyzer
//!
//! A line-based block extractor for `.tf` files. It recognizes
//! `resource "type" "name"`, `module "name"`, and `provider "name"` blocks,
//! tracks braces to find block ends, and flattens simple `key = value`
//! assignments (including those in nested blocks) onto the enclosing
//! top-level block. No expression evaluation or reference resolution is
//! attempted.

use std::path::Path;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use super::{read_file, Analyzer};
use crate::error::AnalysisError;
use crate::models::{Location, Provider, Resource};

lazy_static! {
    static ref RESOURCE_BLOCK: Regex =
        Regex::new(r#"^resource\s+"([^"]+)"\s+"([^"]+)"\s*\{"#).unwrap();
    static ref NAMED_BLOCK: Regex =
        Regex::new(r#"^(module|provider)\s+"([^"]+)"\s*\{"#).unwrap();
    static ref ATTRIBUTE: Regex =
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_-]*)\s*=\s*(.+)$").unwrap();
}

pub struct TerraformAnalyzer;

#[async_trait]
impl Analyzer for TerraformAnalyzer {
    fn provider(&self) -> Provider {
        Provider::Terraform
    }

    async fn analyze(&self, path: &Path) -> Result<Vec<Resource>, AnalysisError> {
        let content = read_file(path).await?;
        let file = path.display().to_string();

        let mut resources = Vec::new();
        let mut current: Option<OpenBlock> = None;

        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
                continue;
            }

            if let Some(mut block) = current.take() {
                if let Some(caps) = ATTRIBUTE.captures(trimmed) {
                    let key = caps[1].to_string();
                    let value = parse_value(caps[2].trim());
                    // First assignment wins when nested blocks reuse a key
                    block.attributes.entry(key).or_insert(value);
                }

                block.depth += brace_delta(trimmed);
                if block.depth <= 0 {
                    resources.push(block.into_resource(&file, line_no));
                } else {
                    current = Some(block);
                }
                continue;
            }

            let opened = if let Some(caps) = RESOURCE_BLOCK.captures(trimmed) {
                Some(OpenBlock::new(&caps[1], &caps[2], line_no, trimmed))
            } else if let Some(caps) = NAMED_BLOCK.captures(trimmed) {
                Some(OpenBlock::new(&caps[1], &caps[2], line_no, trimmed))
            } else {
                None
            };

            if let Some(block) = opened {
                // Single-line blocks close on their own header line
                if block.depth <= 0 {
                    resources.push(block.into_resource(&file, line_no));
                } else {
                    current = Some(block);
                }
            }
        }

        if let Some(block) = current {
            return Err(AnalysisError::Parse {
                path: file,
                message: format!(
                    "unterminated block '{}' starting on line {}",
                    block.name, block.start_line
                ),
            });
        }

        Ok(resources)
    }
}

struct OpenBlock {
    resource_type: String,
    name: String,
    start_line: usize,
    depth: i32,
    attributes: std::collections::HashMap<String, serde_json::Value>,
}

impl OpenBlock {
    fn new(resource_type: &str, name: &str, start_line: usize, header_line: &str) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            name: name.to_string(),
            start_line,
            depth: brace_delta(header_line),
            attributes: std::collections::HashMap::new(),
        }
    }

    fn into_resource(self, file: &str, end_line: usize) -> Resource {
        let mut resource = Resource::new(
            self.resource_type,
            self.name,
            Provider::Terraform,
            Location::new(file, self.start_line, end_line),
        );
        resource.attributes = self.attributes;
        resource
    }
}

/// Net brace depth change for a line. Braces inside string literals are
/// not tracked; IaC configs rarely contain them and a miscount surfaces as
/// a parse error rather than silent corruption.
fn brace_delta(line: &str) -> i32 {
    let opens = line.matches('{').count() as i32;
    let closes = line.matches('}').count() as i32;
    opens - closes
}

/// Interpret a raw attribute value: quoted strings are unwrapped, booleans
/// and numbers are typed, everything else (lists, references,
/// interpolations) stays as its raw text.
fn parse_value(raw: &str) -> serde_json::Value {
    let raw = raw.trim();

    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return serde_json::Value::String(raw[1..raw.len() - 1].to_string());
    }
    if raw == "true" {
        return serde_json::Value::Bool(true);
    }
    if raw == "false" {
        return serde_json::Value::Bool(false);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return serde_json::Value::from(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return serde_json::Value::from(f);
    }

    serde_json::Value::String(raw.to_string())
}
