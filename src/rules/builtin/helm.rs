//! Helm rules

use super::looks_like_secret;
use crate::models::{Provider, Severity};
use crate::rules::Rule;

pub fn rules() -> Vec<Rule> {
    vec![secret_in_values()]
}

/// HELM001: secret-looking key in a values file
fn secret_in_values() -> Rule {
    Rule::new(
        "HELM001",
        Severity::Medium,
        "Potential secret in Helm values file",
        |r| {
            r.attributes.iter().any(|(key, value)| {
                looks_like_secret(key) && value.as_str().map_or(true, |v| !v.is_empty())
            })
        },
    )
    .for_provider(Provider::Helm)
    .for_resource_type("values")
    .with_description(
        "Values files are committed alongside the chart; credential values \
         placed there are shared with everyone who can read the repository.",
    )
    .with_remediation(
        "Supply secrets at install time (--set-file, external secret \
         operators) instead of committing them to values files.",
    )
}
