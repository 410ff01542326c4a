//! Orchestration engine
//!
//! Drives the discover → scan → aggregate → filter → export pipeline. Per-file
//! failures are logged and the file is left out of the aggregate; only
//! discovery and export failures abort a scan.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::analyzers::Analyzer;
use crate::discovery::Discovery;
use crate::error::{DiscoveryError, FileScanError, InfrascanError};
use crate::exporters::Exporter;
use crate::models::{DiscoveredFile, Provider, ScanResult, Severity};
use crate::rules::RuleRegistry;
use crate::scanner::FileScanner;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Providers to scan; empty means all known providers
    pub providers: Vec<Provider>,
    /// Directory names to exclude, on top of the built-in exclusions
    pub exclude_dirs: Vec<String>,
    /// Process files one at a time instead of concurrently
    pub sequential: bool,
    /// Worker pool size for concurrent scans
    pub max_concurrent: usize,
    /// Findings below this severity are dropped; `None` disables filtering
    pub min_severity: Option<Severity>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            exclude_dirs: Vec::new(),
            sequential: false,
            max_concurrent: default_concurrency(),
            min_severity: None,
        }
    }
}

/// Default worker pool size: one worker per available core
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Orchestrates the scanning process: owns the configuration, the analyzer
/// registry, and the rule registry, and drives discovery through export.
pub struct Engine {
    config: ScanConfig,
    analyzers: HashMap<Provider, Arc<dyn Analyzer>>,
    rules: Arc<RuleRegistry>,
    exporter: Option<Box<dyn Exporter>>,
}

impl Engine {
    pub fn new(rules: RuleRegistry, config: ScanConfig) -> Self {
        Self {
            config,
            analyzers: HashMap::new(),
            rules: Arc::new(rules),
            exporter: None,
        }
    }

    /// Bind an analyzer for its provider, replacing any previous binding
    pub fn register_analyzer(&mut self, analyzer: Arc<dyn Analyzer>) {
        self.analyzers.insert(analyzer.provider(), analyzer);
    }

    /// Set the exporter invoked after every scan
    pub fn with_exporter(mut self, exporter: Box<dyn Exporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    /// Discover IaC files under `root` and scan them for security issues.
    ///
    /// Returns one [`ScanResult`] per successfully analyzed file. Files
    /// that fail analysis are logged and absent from the result; discovery
    /// and export failures are fatal.
    pub async fn scan(&self, root: &Path) -> Result<Vec<ScanResult>, InfrascanError> {
        let results = if self.config.sequential {
            self.scan_sequential(root).await?
        } else {
            self.scan_concurrent(root).await?
        };

        let results = self.filter_by_severity(results);

        info!(
            files = results.len(),
            findings = results.iter().map(|r| r.findings.len()).sum::<usize>(),
            "scan complete"
        );

        if let Some(exporter) = &self.exporter {
            exporter.export(&results).map_err(InfrascanError::Export)?;
        }

        Ok(results)
    }

    /// Batch discovery, then one file at a time in discovery order
    async fn scan_sequential(&self, root: &Path) -> Result<Vec<ScanResult>, DiscoveryError> {
        let discovery = Discovery::new(&self.config.exclude_dirs, &self.config.providers);
        let files = discovery.discover(root)?;

        let mut results = Vec::new();
        for file in files {
            match self.scan_file(&file).await {
                Ok(result) => results.push(result),
                Err(e) => warn!(file = %file.path.display(), error = %e, "could not scan file"),
            }
        }

        Ok(results)
    }

    /// Channel discovery feeding a bounded worker pool. The aggregate is
    /// shared behind a mutex locked only for each append; a join barrier
    /// guarantees the aggregate is complete before anything is exported.
    async fn scan_concurrent(&self, root: &Path) -> Result<Vec<ScanResult>, DiscoveryError> {
        let discovery = Discovery::new(&self.config.exclude_dirs, &self.config.providers);
        let mut rx = discovery.discover_channel(root);

        let results = Arc::new(Mutex::new(Vec::new()));
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let mut tasks: JoinSet<()> = JoinSet::new();
        let mut discovery_error = None;

        while let Some(item) = rx.recv().await {
            let file = match item {
                Ok(file) => file,
                Err(e) => {
                    discovery_error = Some(e);
                    break;
                }
            };

            let Some(analyzer) = self.analyzers.get(&file.provider) else {
                warn!(
                    file = %file.path.display(),
                    error = %FileScanError::UnregisteredProvider { provider: file.provider },
                    "could not scan file"
                );
                continue;
            };

            let scanner = FileScanner::new(analyzer.clone(), self.rules.clone());
            let results = results.clone();
            let semaphore = semaphore.clone();

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    // Semaphore is never closed while tasks run
                    return;
                };

                match scanner.scan_file(&file.path).await {
                    Ok(result) => results.lock().await.push(result),
                    Err(e) => {
                        warn!(file = %file.path.display(), error = %e, "could not scan file");
                    }
                }
            });
        }

        // Join barrier: every dispatched task finishes before results are read
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "scan task failed to complete");
            }
        }

        let collected = std::mem::take(&mut *results.lock().await);

        if let Some(e) = discovery_error {
            warn!(
                partial_results = collected.len(),
                "discovery aborted; discarding partial results"
            );
            return Err(e);
        }

        debug!(files = collected.len(), "concurrent scan aggregated");
        Ok(collected)
    }

    async fn scan_file(&self, file: &DiscoveredFile) -> Result<ScanResult, FileScanError> {
        let analyzer = self.analyzers.get(&file.provider).ok_or(
            FileScanError::UnregisteredProvider {
                provider: file.provider,
            },
        )?;

        let scanner = FileScanner::new(analyzer.clone(), self.rules.clone());
        scanner.scan_file(&file.path).await
    }

    /// Drop findings below the configured minimum severity. Resources are
    /// untouched; only findings are filtered.
    fn filter_by_severity(&self, results: Vec<ScanResult>) -> Vec<ScanResult> {
        let Some(min) = self.config.min_severity else {
            return results;
        };

        results
            .into_iter()
            .map(|mut result| {
                result
                    .findings
                    .retain(|f| f.severity.rank() >= min.rank());
                result
            })
            .collect()
    }
}
