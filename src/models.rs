//! # Scan Data Model
//!
//! This module defines the data structures flowing through a scan:
//!
//! - [`Provider`] - Supported IaC tooling categories
//! - [`Severity`] - Finding severity levels with a total order
//! - [`DiscoveredFile`] - A file matched to a provider during discovery
//! - [`Resource`] - A normalized infrastructure component extracted from a file
//! - [`Finding`] - A rule violation on a specific resource
//! - [`ScanResult`] - Per-file resources and findings
//!
//! ## Examples
//!
//! ```rust
//! use infrascan::models::{Location, Provider, Resource, Severity};
//!
//! let resource = Resource::new(
//!     "base_image",
//!     "nginx:latest",
//!     Provider::Docker,
//!     Location::new("Dockerfile", 1, 1),
//! )
//! .with_attribute("tag", "latest");
//!
//! assert!(Severity::Critical > Severity::High);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A category of infrastructure tooling whose files follow a recognizable
/// convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Docker,
    Terraform,
    Kubernetes,
    CloudFormation,
    Helm,
    Ansible,
}

impl Provider {
    /// All supported providers, in the order they are matched during
    /// discovery.
    pub fn all() -> &'static [Provider] {
        &[
            Provider::Docker,
            Provider::Terraform,
            Provider::Kubernetes,
            Provider::CloudFormation,
            Provider::Helm,
            Provider::Ansible,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Docker => "docker",
            Provider::Terraform => "terraform",
            Provider::Kubernetes => "kubernetes",
            Provider::CloudFormation => "cloudformation",
            Provider::Helm => "helm",
            Provider::Ansible => "ansible",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "docker" => Ok(Provider::Docker),
            "terraform" => Ok(Provider::Terraform),
            "kubernetes" | "k8s" => Ok(Provider::Kubernetes),
            "cloudformation" => Ok(Provider::CloudFormation),
            "helm" => Ok(Provider::Helm),
            "ansible" => Ok(Provider::Ansible),
            other => Err(format!(
                "unknown provider '{}'. Valid options: docker, terraform, kubernetes, \
                 cloudformation, helm, ansible",
                other
            )),
        }
    }
}

/// Severity levels for findings.
///
/// Variants are declared in ascending order so the derived `Ord` matches
/// the severity ranking: `Critical > High > Medium > Low > Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Canonical numeric rank used for threshold comparison (INFO=1 up to
    /// CRITICAL=5).
    pub fn rank(self) -> u8 {
        match self {
            Severity::Info => 1,
            Severity::Low => 2,
            Severity::Medium => 3,
            Severity::High => 4,
            Severity::Critical => 5,
        }
    }

    /// Parse a severity from a string, case-insensitively.
    ///
    /// Returns `None` for empty or unrecognized input; callers treating the
    /// result as a filter threshold get "no filtering" in that case.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CRITICAL" => Some(Self::Critical),
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            "INFO" => Some(Self::Info),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
            Severity::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a resource is defined in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, start_line: usize, end_line: usize) -> Self {
        Self {
            file: file.into(),
            start_line,
            end_line,
        }
    }
}

/// A file matched to a provider during discovery. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub provider: Provider,
}

/// A normalized infrastructure component extracted from one file
/// (e.g., a base image, an S3 bucket, a container spec).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource type within the provider (e.g., "base_image",
    /// "aws_s3_bucket", "container").
    #[serde(rename = "type")]
    pub resource_type: String,

    pub name: String,

    pub provider: Provider,

    /// Arbitrary key/value attributes extracted by the analyzer
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,

    pub location: Location,
}

impl Resource {
    /// Create a new resource with no attributes
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        provider: Provider,
        location: Location,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            provider,
            attributes: HashMap::new(),
            location,
        }
    }

    /// Set an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Get an attribute value
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    /// Get an attribute as a string slice, if present and a string
    pub fn string_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_str())
    }

    /// Get an attribute as a bool, if present and a bool
    pub fn bool_attribute(&self, key: &str) -> Option<bool> {
        self.attributes.get(key).and_then(|v| v.as_bool())
    }
}

/// A security misconfiguration found by a rule firing on a resource.
///
/// Carries its own copy of the resource so the report is self-contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule identifier, e.g. "DOCKER001", "TF002"
    pub rule_id: String,
    pub severity: Severity,
    pub resource: Resource,
    pub title: String,
    pub description: String,
    pub remediation: String,
    #[serde(default)]
    pub references: Vec<String>,
}

/// Resources and findings for one successfully analyzed file.
/// Files that fail analysis produce no `ScanResult` at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub source_file: String,
    pub provider: Provider,
    pub resources: Vec<Resource>,
    pub findings: Vec<Finding>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_total_order() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Info);
    }

    #[test]
    fn test_severity_rank() {
        assert_eq!(Severity::Info.rank(), 1);
        assert_eq!(Severity::Low.rank(), 2);
        assert_eq!(Severity::Medium.rank(), 3);
        assert_eq!(Severity::High.rank(), 4);
        assert_eq!(Severity::Critical.rank(), 5);
    }

    #[test]
    fn test_severity_from_string() {
        assert_eq!(Severity::from_string("critical"), Some(Severity::Critical));
        assert_eq!(Severity::from_string("CRITICAL"), Some(Severity::Critical));
        assert_eq!(Severity::from_string("High"), Some(Severity::High));
        assert_eq!(Severity::from_string("medium"), Some(Severity::Medium));
        assert_eq!(Severity::from_string("low"), Some(Severity::Low));
        assert_eq!(Severity::from_string("info"), Some(Severity::Info));

        assert_eq!(Severity::from_string(""), None);
        assert_eq!(Severity::from_string("unknown"), None);
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("docker".parse::<Provider>(), Ok(Provider::Docker));
        assert_eq!("Terraform".parse::<Provider>(), Ok(Provider::Terraform));
        assert_eq!("k8s".parse::<Provider>(), Ok(Provider::Kubernetes));
        assert!("chef".parse::<Provider>().is_err());
    }

    #[test]
    fn test_provider_round_trip() {
        for provider in Provider::all() {
            assert_eq!(provider.as_str().parse::<Provider>(), Ok(*provider));
        }
    }

    #[test]
    fn test_resource_attributes() {
        let resource = Resource::new(
            "base_image",
            "nginx:latest",
            Provider::Docker,
            Location::new("Dockerfile", 1, 1),
        )
        .with_attribute("image", "nginx")
        .with_attribute("tag", "latest");

        assert_eq!(resource.string_attribute("tag"), Some("latest"));
        assert_eq!(resource.string_attribute("digest"), None);
        assert!(resource.attribute("image").is_some());
    }

    #[test]
    fn test_severity_serializes_uppercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }

    #[test]
    fn test_resource_type_serializes_as_type() {
        let resource = Resource::new(
            "user",
            "root",
            Provider::Docker,
            Location::new("Dockerfile", 3, 3),
        );
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["type"], "user");
        assert_eq!(json["provider"], "docker");
    }
}
