//! Built-in security rules
//!
//! Shipped rules for the providers with built-in analyzers. All are
//! registered through [`all`]; callers wanting a different set can
//! register individual provider batches instead.

pub mod docker;
pub mod helm;
pub mod kubernetes;
pub mod terraform;

use super::Rule;

/// All built-in rules, in a stable registration order
pub fn all() -> Vec<Rule> {
    let mut rules = Vec::new();
    rules.extend(docker::rules());
    rules.extend(terraform::rules());
    rules.extend(kubernetes::rules());
    rules.extend(helm::rules());
    rules
}

/// Attribute/variable names that usually hold credentials
const SECRET_NAME_PATTERNS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "token",
    "api_key",
    "apikey",
    "api-key",
    "private_key",
    "access_key",
    "secret_key",
    "credentials",
];

/// Whether a name looks like it holds a secret
pub(crate) fn looks_like_secret(name: &str) -> bool {
    let lower = name.to_lowercase();
    SECRET_NAME_PATTERNS.iter().any(|p| lower.contains(p))
}
