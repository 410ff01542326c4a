//! Docker rules
//!
//! Checks over resources extracted from Dockerfiles: pinned base image
//! tags, non-root users, secrets in ENV/ARG, and exposed SSH ports.

use super::looks_like_secret;
use crate::models::{Provider, Severity};
use crate::rules::Rule;

pub fn rules() -> Vec<Rule> {
    vec![
        unpinned_base_image(),
        root_user(),
        secret_in_env(),
        secret_in_build_arg(),
        ssh_port_exposed(),
    ]
}

/// DOCKER001: base image not pinned or pinned to `latest`
fn unpinned_base_image() -> Rule {
    Rule::new(
        "DOCKER001",
        Severity::Critical,
        "Base image is not pinned to a specific tag",
        |r| {
            // scratch and variable references are resolved elsewhere
            if r.name == "scratch" || r.name.starts_with('$') {
                return false;
            }
            match r.string_attribute("tag") {
                None => true,
                Some(tag) => tag == "latest",
            }
        },
    )
    .for_provider(Provider::Docker)
    .for_resource_type("base_image")
    .with_description(
        "Using an unpinned base image (no tag or ':latest') can lead to \
         non-reproducible builds and unexpected behavior when the upstream \
         image changes.",
    )
    .with_remediation(
        "Pin the base image to a specific version tag, e.g. 'node:20-alpine' \
         instead of 'node' or 'node:latest'.",
    )
    .with_reference("https://docs.docker.com/develop/dev-best-practices/")
}

/// DOCKER002: container runs as root
fn root_user() -> Rule {
    Rule::new(
        "DOCKER002",
        Severity::High,
        "Container runs as the root user",
        |r| r.name == "root" || r.name == "0",
    )
    .for_provider(Provider::Docker)
    .for_resource_type("user")
    .with_description(
        "An explicit 'USER root' keeps the container running as root, which \
         increases the attack surface if the container is compromised.",
    )
    .with_remediation("Switch to a non-root user, e.g. 'USER 1001' or 'USER appuser'.")
}

/// DOCKER003: secret-looking ENV variable
fn secret_in_env() -> Rule {
    Rule::new(
        "DOCKER003",
        Severity::High,
        "Potential secret in ENV instruction",
        |r| looks_like_secret(&r.name),
    )
    .for_provider(Provider::Docker)
    .for_resource_type("env_var")
    .with_description(
        "ENV values are baked into the image layers and can be extracted by \
         anyone with access to the image.",
    )
    .with_remediation(
        "Use Docker build secrets (--mount=type=secret) or runtime environment \
         variables instead of embedding secrets in the image.",
    )
}

/// DOCKER004: secret-looking build ARG
fn secret_in_build_arg() -> Rule {
    Rule::new(
        "DOCKER004",
        Severity::High,
        "Potential secret in ARG instruction",
        |r| looks_like_secret(&r.name),
    )
    .for_provider(Provider::Docker)
    .for_resource_type("build_arg")
    .with_description(
        "Build arguments are visible in the image history and can leak \
         credentials passed at build time.",
    )
    .with_remediation("Use Docker build secrets (--mount=type=secret) for build-time credentials.")
}

/// DOCKER005: SSH port exposed
fn ssh_port_exposed() -> Rule {
    Rule::new(
        "DOCKER005",
        Severity::Medium,
        "SSH port exposed by the image",
        |r| r.name == "22",
    )
    .for_provider(Provider::Docker)
    .for_resource_type("exposed_port")
    .with_description(
        "Exposing port 22 suggests an SSH daemon inside the container, which \
         widens the attack surface and bypasses the orchestrator's access controls.",
    )
    .with_remediation("Remove the SSH daemon and use 'docker exec' or 'kubectl exec' for access.")
}
