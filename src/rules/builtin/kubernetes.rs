//! Kubernetes rules
//!
//! Checks over resources extracted from cluster manifests: privileged
//! containers, unpinned images, and host networking.

use crate::models::{Provider, Severity};
use crate::rules::Rule;

pub fn rules() -> Vec<Rule> {
    vec![privileged_container(), unpinned_image(), host_network()]
}

/// K8S001: container runs privileged
fn privileged_container() -> Rule {
    Rule::new(
        "K8S001",
        Severity::High,
        "Container runs in privileged mode",
        |r| r.bool_attribute("privileged") == Some(true),
    )
    .for_provider(Provider::Kubernetes)
    .for_resource_type("container")
    .with_description(
        "A privileged container has access to all host devices and \
         capabilities, effectively disabling container isolation.",
    )
    .with_remediation(
        "Remove 'privileged: true' and grant only the specific capabilities \
         the workload needs via securityContext.capabilities.",
    )
    .with_reference("https://kubernetes.io/docs/concepts/security/pod-security-standards/")
}

/// K8S002: container image not pinned
fn unpinned_image() -> Rule {
    Rule::new(
        "K8S002",
        Severity::Medium,
        "Container image is not pinned to a specific tag",
        |r| match r.string_attribute("image") {
            Some(image) => {
                let tag = image.rsplit(':').next().filter(|t| !t.contains('/'));
                match tag {
                    Some("latest") => true,
                    Some(_) if image.contains(':') => false,
                    _ => true,
                }
            }
            None => false,
        },
    )
    .for_provider(Provider::Kubernetes)
    .for_resource_type("container")
    .with_description(
        "Images without a tag (or with ':latest') can change between pod \
         restarts, producing unpredictable rollouts.",
    )
    .with_remediation("Pin the image to a version tag or digest.")
}

/// K8S003: workload shares the host network namespace
fn host_network() -> Rule {
    Rule::new(
        "K8S003",
        Severity::High,
        "Workload uses the host network namespace",
        |r| r.bool_attribute("host_network") == Some(true),
    )
    .for_provider(Provider::Kubernetes)
    .with_description(
        "hostNetwork gives pods direct access to the node's network \
         interfaces and loopback services.",
    )
    .with_remediation("Remove 'hostNetwork: true' unless the workload genuinely requires it.")
}
