//! Configuration file support
//!
//! An optional `.infrascan.toml` in the scanned directory (or passed via
//! `--config`) supplies defaults for the scan. Command-line flags always
//! take precedence over file values.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::models::{Provider, Severity};

/// Name of the configuration file looked up in the scan root
pub const CONFIG_FILE_NAME: &str = ".infrascan.toml";

/// Values loadable from a `.infrascan.toml` file.
///
/// ```toml
/// providers = ["docker", "terraform"]
/// exclude = ["fixtures", "testdata"]
/// output = "reports/scan.json"
/// min-severity = "MEDIUM"
/// sequential = false
/// max-concurrent = 8
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    /// Providers to scan; unset or empty means all
    #[serde(default)]
    pub providers: Vec<String>,

    /// Directory names to exclude, on top of the built-in exclusions
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Report output path
    pub output: Option<String>,

    /// Minimum severity included in the report
    pub min_severity: Option<String>,

    /// Disable concurrent scanning
    pub sequential: Option<bool>,

    /// Worker pool size for concurrent scans
    pub max_concurrent: Option<usize>,
}

impl FileConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config: FileConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        config.validate()?;
        debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Load `.infrascan.toml` from `dir` if it exists, otherwise return
    /// defaults. A file that exists but fails to load is an error.
    pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for provider in &self.providers {
            provider
                .parse::<Provider>()
                .map_err(|message| ConfigError::Invalid { message })?;
        }

        if let Some(severity) = &self.min_severity {
            if Severity::from_string(severity).is_none() {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "unknown severity '{}'. Valid options: CRITICAL, HIGH, MEDIUM, LOW, INFO",
                        severity
                    ),
                });
            }
        }

        if self.max_concurrent == Some(0) {
            return Err(ConfigError::Invalid {
                message: "max-concurrent must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Providers parsed into their enum form. `validate` has already
    /// rejected unknown names, so parse failures cannot occur here.
    pub fn parsed_providers(&self) -> Vec<Provider> {
        self.providers
            .iter()
            .filter_map(|p| p.parse().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_full_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            temp_dir.path(),
            r#"
providers = ["docker", "k8s"]
exclude = ["fixtures"]
output = "out.json"
min-severity = "high"
sequential = true
max-concurrent = 4
"#,
        );

        let config = FileConfig::load(&path).unwrap();

        assert_eq!(
            config.parsed_providers(),
            vec![Provider::Docker, Provider::Kubernetes]
        );
        assert_eq!(config.exclude, vec!["fixtures"]);
        assert_eq!(config.output.as_deref(), Some("out.json"));
        assert_eq!(config.min_severity.as_deref(), Some("high"));
        assert_eq!(config.sequential, Some(true));
        assert_eq!(config.max_concurrent, Some(4));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = FileConfig::load_or_default(temp_dir.path()).unwrap();

        assert!(config.providers.is_empty());
        assert!(config.output.is_none());
    }

    #[test]
    fn test_present_file_is_loaded_by_default_lookup() {
        let temp_dir = TempDir::new().unwrap();
        write_config(temp_dir.path(), "exclude = [\"testdata\"]\n");

        let config = FileConfig::load_or_default(temp_dir.path()).unwrap();
        assert_eq!(config.exclude, vec!["testdata"]);
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(temp_dir.path(), "providers = [unquoted\n");

        let result = FileConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(temp_dir.path(), "providers = [\"chef\"]\n");

        let result = FileConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_unknown_severity_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(temp_dir.path(), "min-severity = \"URGENT\"\n");

        let result = FileConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(temp_dir.path(), "max-concurrent = 0\n");

        let result = FileConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(temp_dir.path(), "outputs = \"typo.json\"\n");

        let result = FileConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
