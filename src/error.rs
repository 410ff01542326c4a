//! Error types for Infrascan
//!
//! This module defines custom error types using `thiserror`. Discovery and
//! export errors are fatal to a scan; per-file errors (`FileScanError`) are
//! logged and the file is skipped.

use thiserror::Error;

use crate::models::Provider;

/// Main error type for Infrascan
#[derive(Error, Debug)]
pub enum InfrascanError {
    /// Filesystem traversal failed
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Writing the report failed
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration loading or validation failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while walking the directory tree
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The walker hit an entry it could not read (permissions, broken link)
    #[error("failed to traverse '{path}': {source}")]
    Walk {
        /// Path of the entry that failed, or the root when unknown
        path: String,
        /// The underlying walkdir error
        #[source]
        source: walkdir::Error,
    },

    /// The scan root does not exist or is not a directory
    #[error("'{path}' is not a directory")]
    NotADirectory { path: String },
}

/// Per-file scan errors. Never fatal to the whole scan.
#[derive(Error, Debug)]
pub enum FileScanError {
    /// A discovered file's provider has no bound analyzer. This is a
    /// configuration problem, not a data problem.
    #[error("no analyzer registered for provider '{provider}'")]
    UnregisteredProvider { provider: Provider },

    /// The bound analyzer could not process the file
    #[error("failed to analyze '{path}': {source}")]
    Analysis {
        path: String,
        #[source]
        source: AnalysisError,
    },
}

/// Errors produced by analyzers
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Failed to read the file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid for this provider
    #[error("failed to parse '{path}': {message}")]
    Parse { path: String, message: String },
}

/// Errors raised while writing the report
#[derive(Error, Debug)]
pub enum ExportError {
    /// Failed to write the output file
    #[error("failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the report
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A configuration value failed validation
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}
