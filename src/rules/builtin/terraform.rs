//! Terraform rules
//!
//! Checks over resources extracted from Terraform configurations. The
//! analyzer flattens block attributes into raw strings, so checks match on
//! attribute text rather than a resolved expression tree.

use super::looks_like_secret;
use crate::models::{Provider, Resource, Severity};
use crate::rules::Rule;

pub fn rules() -> Vec<Rule> {
    vec![open_ingress(), public_s3_acl(), hardcoded_secret()]
}

fn attribute_contains(resource: &Resource, key: &str, needle: &str) -> bool {
    resource
        .string_attribute(key)
        .is_some_and(|v| v.contains(needle))
}

/// TF001: security group ingress open to the world
fn open_ingress() -> Rule {
    Rule::new(
        "TF001",
        Severity::High,
        "Ingress rule open to 0.0.0.0/0",
        |r| {
            attribute_contains(r, "cidr_blocks", "0.0.0.0/0")
                || attribute_contains(r, "cidr_block", "0.0.0.0/0")
                || attribute_contains(r, "ipv6_cidr_blocks", "::/0")
        },
    )
    .for_provider(Provider::Terraform)
    .with_description(
        "An ingress CIDR of 0.0.0.0/0 (or ::/0) allows traffic from any \
         address on the internet.",
    )
    .with_remediation("Restrict ingress to known CIDR ranges or security group references.")
    .with_reference("https://docs.aws.amazon.com/vpc/latest/userguide/vpc-security-groups.html")
}

/// TF002: publicly readable S3 bucket ACL
fn public_s3_acl() -> Rule {
    Rule::new(
        "TF002",
        Severity::Critical,
        "S3 bucket has a public ACL",
        |r| {
            matches!(
                r.string_attribute("acl"),
                Some("public-read") | Some("public-read-write")
            )
        },
    )
    .for_provider(Provider::Terraform)
    .for_resource_type("aws_s3_bucket")
    .with_description(
        "A public-read or public-read-write ACL makes every object in the \
         bucket readable (or writable) by anyone.",
    )
    .with_remediation(
        "Set the ACL to 'private' and use bucket policies plus \
         aws_s3_bucket_public_access_block to control access.",
    )
    .with_reference(
        "https://docs.aws.amazon.com/AmazonS3/latest/userguide/access-control-block-public-access.html",
    )
}

/// TF003: credential-looking attribute with an inline value
fn hardcoded_secret() -> Rule {
    Rule::new(
        "TF003",
        Severity::High,
        "Hardcoded credential in Terraform configuration",
        |r| {
            r.attributes.iter().any(|(key, value)| {
                if !looks_like_secret(key) {
                    return false;
                }
                match value.as_str() {
                    // Interpolations and references are not literals
                    Some(v) => {
                        !v.is_empty()
                            && !v.starts_with("var.")
                            && !v.starts_with("local.")
                            && !v.starts_with("data.")
                            && !v.starts_with("${")
                    }
                    None => false,
                }
            })
        },
    )
    .for_provider(Provider::Terraform)
    .with_description(
        "Credential values written directly in .tf files end up in version \
         control and state files.",
    )
    .with_remediation(
        "Reference a variable or a secrets manager instead of an inline \
         literal, and mark the variable as sensitive.",
    )
}
