//! Rule registry and evaluation

use tracing::trace;

use super::{Rule, TypeScope};
use crate::models::{Finding, Provider, Resource};

/// Stores rules in registration order and evaluates them against resources.
///
/// Registration happens once before scanning; evaluation performs no
/// writes, so a shared registry is safe across concurrent scans.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Register a rule. Duplicate IDs are permitted and both are kept;
    /// callers needing unique identity must enforce it themselves.
    pub fn register(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Register a batch of rules, preserving their order
    pub fn register_all(&mut self, rules: impl IntoIterator<Item = Rule>) {
        self.rules.extend(rules);
    }

    /// All registered rules, in registration order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules whose provider scope covers the given provider, in
    /// registration order
    pub fn rules_for(&self, provider: Provider) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|r| r.matches_provider(provider))
            .collect()
    }

    /// Evaluate every resource against the applicable rules.
    ///
    /// One finding is emitted per (rule, resource) pair whose check returns
    /// true. No deduplication; findings for a resource keep registration
    /// order.
    pub fn evaluate(&self, resources: &[Resource]) -> Vec<Finding> {
        let mut findings = Vec::new();

        for resource in resources {
            for rule in self.rules_for(resource.provider) {
                let type_matches = match &rule.resource_type {
                    TypeScope::Any => true,
                    TypeScope::Only(t) => t == &resource.resource_type,
                };
                if !type_matches {
                    continue;
                }

                if rule.check(resource) {
                    trace!(rule = %rule.id, resource = %resource.name, "rule fired");
                    findings.push(Finding {
                        rule_id: rule.id.clone(),
                        severity: rule.severity,
                        resource: resource.clone(),
                        title: rule.title.clone(),
                        description: rule.description.clone(),
                        remediation: rule.remediation.clone(),
                        references: rule.references.clone(),
                    });
                }
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, Severity};

    fn resource(provider: Provider, resource_type: &str, name: &str) -> Resource {
        Resource::new(resource_type, name, provider, Location::new("f", 1, 1))
    }

    #[test]
    fn test_rules_for_includes_wildcard() {
        let mut registry = RuleRegistry::new();
        registry.register(
            Rule::new("D001", Severity::High, "docker", |_| true).for_provider(Provider::Docker),
        );
        registry.register(Rule::new("ANY001", Severity::Low, "any", |_| true));
        registry.register(
            Rule::new("TF001", Severity::High, "terraform", |_| true)
                .for_provider(Provider::Terraform),
        );

        let docker_rules = registry.rules_for(Provider::Docker);
        let ids: Vec<&str> = docker_rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["D001", "ANY001"]);
    }

    #[test]
    fn test_wildcard_rule_fires_once_per_resource() {
        let mut registry = RuleRegistry::new();
        registry.register(Rule::new("ANY001", Severity::Info, "flag everything", |_| true));

        let resources = vec![
            resource(Provider::Docker, "base_image", "alpine"),
            resource(Provider::Terraform, "aws_s3_bucket", "logs"),
            resource(Provider::Kubernetes, "container", "api"),
        ];

        let findings = registry.evaluate(&resources);

        assert_eq!(findings.len(), resources.len());
        for (finding, resource) in findings.iter().zip(&resources) {
            assert_eq!(&finding.resource, resource);
        }
    }

    #[test]
    fn test_no_deduplication_across_rules() {
        let mut registry = RuleRegistry::new();
        registry.register(Rule::new("A", Severity::Low, "first", |_| true));
        registry.register(Rule::new("B", Severity::High, "second", |_| true));

        let findings = registry.evaluate(&[resource(Provider::Docker, "user", "root")]);

        // Same resource, two findings, in registration order (not severity)
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].rule_id, "A");
        assert_eq!(findings[1].rule_id, "B");
    }

    #[test]
    fn test_duplicate_ids_are_kept() {
        let mut registry = RuleRegistry::new();
        registry.register(Rule::new("DUP", Severity::Low, "one", |_| true));
        registry.register(Rule::new("DUP", Severity::Low, "two", |_| true));

        assert_eq!(registry.rules().len(), 2);
        let findings = registry.evaluate(&[resource(Provider::Docker, "user", "root")]);
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn test_type_scope_filters_resources() {
        let mut registry = RuleRegistry::new();
        registry.register(
            Rule::new("IMG", Severity::High, "images", |_| true).for_resource_type("base_image"),
        );

        let findings = registry.evaluate(&[
            resource(Provider::Docker, "base_image", "alpine"),
            resource(Provider::Docker, "env_var", "PATH"),
        ]);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].resource.resource_type, "base_image");
    }

    #[test]
    fn test_check_false_emits_nothing() {
        let mut registry = RuleRegistry::new();
        registry.register(Rule::new("NEVER", Severity::Critical, "never fires", |_| false));

        let findings = registry.evaluate(&[resource(Provider::Docker, "user", "root")]);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_finding_carries_rule_metadata() {
        let mut registry = RuleRegistry::new();
        registry.register(
            Rule::new("META", Severity::Medium, "the title", |_| true)
                .with_description("the description")
                .with_remediation("the fix")
                .with_reference("https://example.com"),
        );

        let findings = registry.evaluate(&[resource(Provider::Docker, "user", "root")]);

        assert_eq!(findings[0].title, "the title");
        assert_eq!(findings[0].description, "the description");
        assert_eq!(findings[0].remediation, "the fix");
        assert_eq!(findings[0].references, vec!["https://example.com"]);
        assert_eq!(findings[0].severity, Severity::Medium);
    }
}
