//! Infrascan Library
//!
//! This crate provides the core functionality for scanning Infrastructure
//! as Code files (Dockerfiles, Terraform configurations, Kubernetes
//! manifests, Helm charts) for security misconfigurations.

pub mod analyzers;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod exporters;
pub mod models;
pub mod rules;
pub mod scanner;

pub use error::InfrascanError;

/// Exit codes for the CLI
pub mod exit_codes {
    /// Success - no findings
    pub const SUCCESS: i32 = 0;
    /// Findings were reported
    pub const FINDINGS: i32 = 1;
    /// Configuration or runtime error
    pub const ERROR: i32 = 2;
}
