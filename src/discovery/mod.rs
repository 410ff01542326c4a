//! File discovery - directory traversal and provider matching
//!
//! Walks a root directory, prunes excluded directories, and matches file
//! names to providers. Two variants are offered: a batch walk returning a
//! `Vec`, and a channel-based walk feeding a concurrent pipeline. Both
//! yield the same set of files for the same inputs; on a traversal error
//! both surface a terminal [`DiscoveryError`] (the channel variant sends it
//! as the final item).

pub mod patterns;

use std::path::Path;

use tokio::sync::mpsc;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::DiscoveryError;
use crate::models::{DiscoveredFile, Provider};

/// Directories that are never descended, regardless of configuration
const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    ".terraform",
    "node_modules",
    "vendor",
    ".venv",
    "__pycache__",
];

/// Capacity of the handoff channel used by [`Discovery::discover_channel`]
const CHANNEL_CAPACITY: usize = 64;

/// Walks a directory tree and yields files matched to providers
#[derive(Debug, Clone)]
pub struct Discovery {
    exclude_dirs: Vec<String>,
    providers: Vec<Provider>,
}

impl Discovery {
    /// Create a discovery over the given exclusions and providers.
    /// An empty provider list means all known providers.
    pub fn new(exclude_dirs: &[String], providers: &[Provider]) -> Self {
        let providers = if providers.is_empty() {
            Provider::all().to_vec()
        } else {
            providers.to_vec()
        };

        Self {
            exclude_dirs: exclude_dirs.to_vec(),
            providers,
        }
    }

    /// Walk the tree eagerly and return every matched file.
    ///
    /// A traversal error aborts the walk and is returned as
    /// [`DiscoveryError::Walk`].
    pub fn discover(&self, root: &Path) -> Result<Vec<DiscoveredFile>, DiscoveryError> {
        let mut files = Vec::new();

        for entry in self.walker(root) {
            let entry = entry.map_err(|e| walk_error(root, e))?;
            if let Some(file) = self.match_entry(&entry) {
                files.push(file);
            }
        }

        debug!(count = files.len(), "discovery complete");
        Ok(files)
    }

    /// Walk the tree on a blocking task, sending matched files through a
    /// bounded channel.
    ///
    /// On a traversal error the producer sends one final `Err` item and
    /// stops; files already sent remain valid partial results.
    pub fn discover_channel(
        &self,
        root: &Path,
    ) -> mpsc::Receiver<Result<DiscoveredFile, DiscoveryError>> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let discovery = self.clone();
        let root = root.to_path_buf();

        tokio::task::spawn_blocking(move || {
            for entry in discovery.walker(&root) {
                match entry {
                    Ok(entry) => {
                        if let Some(file) = discovery.match_entry(&entry) {
                            // Receiver dropped: consumer stopped, stop walking
                            if tx.blocking_send(Ok(file)).is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.blocking_send(Err(walk_error(&root, e)));
                        return;
                    }
                }
            }
        });

        rx
    }

    fn walker(&self, root: &Path) -> impl Iterator<Item = walkdir::Result<DirEntry>> + '_ {
        WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| self.keep_entry(entry))
    }

    /// Prune excluded directories. The root itself is always kept so a
    /// scan rooted inside an excluded directory name still works.
    fn keep_entry(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }

        let name = entry.file_name().to_string_lossy();
        !self.is_excluded(&name)
    }

    fn is_excluded(&self, name: &str) -> bool {
        DEFAULT_EXCLUDES.contains(&name) || self.exclude_dirs.iter().any(|d| d == name)
    }

    fn match_entry(&self, entry: &DirEntry) -> Option<DiscoveredFile> {
        if !entry.file_type().is_file() {
            return None;
        }

        let name = entry.file_name().to_string_lossy();
        let provider = patterns::match_provider(&name, &self.providers)?;

        Some(DiscoveredFile {
            path: entry.path().to_path_buf(),
            provider,
        })
    }
}

fn walk_error(root: &Path, source: walkdir::Error) -> DiscoveryError {
    let path = source
        .path()
        .unwrap_or(root)
        .to_string_lossy()
        .into_owned();
    DiscoveryError::Walk { path, source }
}
