//! Rules module - security rules and the evaluation registry
//!
//! A [`Rule`] is a provider/resource-type-scoped predicate over a
//! [`Resource`]. Rules are registered once at startup into a
//! [`RuleRegistry`] and shared read-only across all concurrent evaluations,
//! so check predicates must be pure.

pub mod builtin;
mod registry;

pub use registry::RuleRegistry;

use std::fmt;
use std::sync::Arc;

use crate::models::{Provider, Resource, Severity};

/// Check predicate evaluated against a single resource. Returns `true` on
/// a violation.
pub type CheckFn = Arc<dyn Fn(&Resource) -> bool + Send + Sync>;

/// Which providers a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderScope {
    /// Applies to resources of every provider
    Any,
    /// Applies only to resources of this provider
    Only(Provider),
}

/// Which resource types a rule applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeScope {
    /// Applies to every resource type within the matched providers
    Any,
    /// Applies only to resources of this type
    Only(String),
}

/// A security check scoped to a provider and resource type.
///
/// Built with the builder pattern:
///
/// ```rust
/// use infrascan::models::{Provider, Severity};
/// use infrascan::rules::Rule;
///
/// let rule = Rule::new("DOCKER001", Severity::Critical, "Unpinned base image", |r| {
///     r.string_attribute("tag").is_none()
/// })
/// .for_provider(Provider::Docker)
/// .for_resource_type("base_image")
/// .with_remediation("Pin the base image to a specific version tag");
/// ```
#[derive(Clone)]
pub struct Rule {
    pub id: String,
    pub provider: ProviderScope,
    pub resource_type: TypeScope,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub remediation: String,
    pub references: Vec<String>,
    check: CheckFn,
}

impl Rule {
    /// Create a rule applying to every provider and resource type
    pub fn new(
        id: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        check: impl Fn(&Resource) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            provider: ProviderScope::Any,
            resource_type: TypeScope::Any,
            severity,
            title: title.into(),
            description: String::new(),
            remediation: String::new(),
            references: Vec::new(),
            check: Arc::new(check),
        }
    }

    /// Restrict the rule to one provider
    pub fn for_provider(mut self, provider: Provider) -> Self {
        self.provider = ProviderScope::Only(provider);
        self
    }

    /// Restrict the rule to one resource type
    pub fn for_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = TypeScope::Only(resource_type.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the remediation
    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = remediation.into();
        self
    }

    /// Add a reference URL
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.references.push(reference.into());
        self
    }

    /// Whether this rule's provider scope covers the given provider
    pub fn matches_provider(&self, provider: Provider) -> bool {
        match self.provider {
            ProviderScope::Any => true,
            ProviderScope::Only(p) => p == provider,
        }
    }

    /// Whether this rule applies to the given resource. Provider and
    /// resource-type scopes are tested independently; the match is their
    /// conjunction.
    pub fn applies_to(&self, resource: &Resource) -> bool {
        let type_matches = match &self.resource_type {
            TypeScope::Any => true,
            TypeScope::Only(t) => t == &resource.resource_type,
        };

        self.matches_provider(resource.provider) && type_matches
    }

    /// Run the check predicate
    pub fn check(&self, resource: &Resource) -> bool {
        (self.check)(resource)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("provider", &self.provider)
            .field("resource_type", &self.resource_type)
            .field("severity", &self.severity)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    fn resource(provider: Provider, resource_type: &str) -> Resource {
        Resource::new(resource_type, "r", provider, Location::new("f", 1, 1))
    }

    #[test]
    fn test_rule_scopes_default_to_wildcards() {
        let rule = Rule::new("X001", Severity::Low, "anything", |_| true);

        assert!(rule.applies_to(&resource(Provider::Docker, "base_image")));
        assert!(rule.applies_to(&resource(Provider::Terraform, "aws_s3_bucket")));
    }

    #[test]
    fn test_rule_provider_scope() {
        let rule = Rule::new("X001", Severity::Low, "docker only", |_| true)
            .for_provider(Provider::Docker);

        assert!(rule.applies_to(&resource(Provider::Docker, "env_var")));
        assert!(!rule.applies_to(&resource(Provider::Terraform, "env_var")));
    }

    #[test]
    fn test_rule_type_scope() {
        let rule = Rule::new("X001", Severity::Low, "images only", |_| true)
            .for_resource_type("base_image");

        assert!(rule.applies_to(&resource(Provider::Docker, "base_image")));
        assert!(rule.applies_to(&resource(Provider::Kubernetes, "base_image")));
        assert!(!rule.applies_to(&resource(Provider::Docker, "env_var")));
    }

    #[test]
    fn test_rule_scopes_combine_as_conjunction() {
        let rule = Rule::new("X001", Severity::Low, "scoped", |_| true)
            .for_provider(Provider::Docker)
            .for_resource_type("base_image");

        assert!(rule.applies_to(&resource(Provider::Docker, "base_image")));
        assert!(!rule.applies_to(&resource(Provider::Docker, "env_var")));
        assert!(!rule.applies_to(&resource(Provider::Terraform, "base_image")));
    }

    #[test]
    fn test_rule_builder_fields() {
        let rule = Rule::new("X001", Severity::High, "title", |_| false)
            .with_description("desc")
            .with_remediation("fix it")
            .with_reference("https://example.com/docs");

        assert_eq!(rule.description, "desc");
        assert_eq!(rule.remediation, "fix it");
        assert_eq!(rule.references.len(), 1);
    }
}
