//! File name patterns for IaC providers
//!
//! High-confidence patterns assign a provider from the file name alone,
//! without content inspection. They are checked provider-by-provider in a
//! fixed order; the first match wins.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::Provider;

lazy_static! {
    static ref DOCKERFILE: Regex = Regex::new(r"^Dockerfile(\..+)?$").unwrap();
    static ref DOCKER_COMPOSE: Regex = Regex::new(r"^(docker-)?compose.*\.ya?ml$").unwrap();
    static ref TERRAFORM: Regex = Regex::new(r"\.tf$").unwrap();
    static ref TERRAFORM_VARS: Regex = Regex::new(r"\.tfvars$").unwrap();
    static ref HELM_CHART: Regex = Regex::new(r"^Chart\.ya?ml$").unwrap();
    static ref HELM_VALUES: Regex = Regex::new(r"^values.*\.ya?ml$").unwrap();

    /// High-confidence patterns grouped by provider, in match order.
    /// Kubernetes and CloudFormation manifests are generic YAML/JSON and
    /// would need content-based detection, so they have no entry here.
    static ref HIGH_CONFIDENCE: Vec<(Provider, Vec<&'static Regex>)> = vec![
        (Provider::Docker, vec![&DOCKERFILE, &DOCKER_COMPOSE]),
        (Provider::Terraform, vec![&TERRAFORM, &TERRAFORM_VARS]),
        (Provider::Helm, vec![&HELM_CHART, &HELM_VALUES]),
    ];
}

/// Match a file base name to a provider.
///
/// `requested` restricts which providers participate. High-confidence
/// patterns are tried first in fixed order; as a secondary rule, a name
/// ending in `.tf`/`.tfvars` is accepted as Terraform when Terraform is
/// requested.
pub fn match_provider(name: &str, requested: &[Provider]) -> Option<Provider> {
    for (provider, patterns) in HIGH_CONFIDENCE.iter() {
        if !requested.contains(provider) {
            continue;
        }
        if patterns.iter().any(|p| p.is_match(name)) {
            return Some(*provider);
        }
    }

    if requested.contains(&Provider::Terraform)
        && (name.ends_with(".tf") || name.ends_with(".tfvars"))
    {
        return Some(Provider::Terraform);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> Vec<Provider> {
        Provider::all().to_vec()
    }

    #[test]
    fn test_dockerfile_matches() {
        assert_eq!(match_provider("Dockerfile", &all()), Some(Provider::Docker));
        assert_eq!(
            match_provider("Dockerfile.prod", &all()),
            Some(Provider::Docker)
        );
    }

    #[test]
    fn test_dockerfile_is_case_sensitive() {
        assert_eq!(match_provider("dockerfile", &all()), None);
    }

    #[test]
    fn test_compose_matches_docker() {
        assert_eq!(
            match_provider("docker-compose.yml", &all()),
            Some(Provider::Docker)
        );
        assert_eq!(
            match_provider("compose.override.yaml", &all()),
            Some(Provider::Docker)
        );
    }

    #[test]
    fn test_terraform_matches() {
        assert_eq!(match_provider("main.tf", &all()), Some(Provider::Terraform));
        assert_eq!(
            match_provider("prod.tfvars", &all()),
            Some(Provider::Terraform)
        );
    }

    #[test]
    fn test_helm_values_wins_over_kubernetes() {
        // values.yaml is high-confidence helm; generic YAML never matches
        // kubernetes by name alone.
        let requested = vec![Provider::Helm, Provider::Kubernetes];
        assert_eq!(
            match_provider("values.yaml", &requested),
            Some(Provider::Helm)
        );
        assert_eq!(
            match_provider("values.prod.yaml", &requested),
            Some(Provider::Helm)
        );
    }

    #[test]
    fn test_chart_matches_helm() {
        assert_eq!(match_provider("Chart.yaml", &all()), Some(Provider::Helm));
    }

    #[test]
    fn test_unrequested_provider_is_skipped() {
        let requested = vec![Provider::Terraform];
        assert_eq!(match_provider("Dockerfile", &requested), None);
        assert_eq!(
            match_provider("main.tf", &requested),
            Some(Provider::Terraform)
        );
    }

    #[test]
    fn test_unmatched_names_are_none() {
        assert_eq!(match_provider("README.md", &all()), None);
        assert_eq!(match_provider("main.go", &all()), None);
        assert_eq!(match_provider("app.yaml", &all()), None);
    }
}
