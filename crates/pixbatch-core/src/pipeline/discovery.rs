//! File discovery for finding images in the input directory.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::error::PipelineError;

/// Discovers image files in a directory.
pub struct FileDiscovery {
    extensions: Vec<String>,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: &ProcessingConfig) -> Self {
        Self::with_extensions(&config.supported_extensions)
    }

    /// Create a discovery instance for an explicit extension list.
    pub fn with_extensions<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// List the supported image files directly inside `dir`.
    ///
    /// Subdirectories are not descended into. Results are sorted by path so
    /// the load order is deterministic. A missing or unreadable directory is
    /// a startup failure. An entry that cannot be inspected, such as a
    /// dangling symlink, is still listed when its name matches so the loader
    /// reports it as a per-file failure.
    pub fn discover(&self, dir: &Path) -> Result<Vec<DiscoveredFile>, PipelineError> {
        if !dir.is_dir() {
            return Err(PipelineError::FatalStartup {
                message: format!("input directory {} does not exist", dir.display()),
            });
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(PipelineError::FatalStartup {
                        message: format!("cannot list {}: {}", dir.display(), e),
                    });
                }
                Err(e) => {
                    match e.path() {
                        Some(path) if self.is_supported(path) => {
                            tracing::warn!("Cannot inspect {:?}: {}", path, e);
                            files.push(DiscoveredFile {
                                path: path.to_path_buf(),
                                size: 0,
                            });
                        }
                        _ => tracing::warn!("Skipping unreadable entry: {}", e),
                    }
                    continue;
                }
            };
            let entry_path = entry.path();
            if entry.file_type().is_file() && self.is_supported(entry_path) {
                match entry.metadata() {
                    Ok(meta) => files.push(DiscoveredFile {
                        path: entry_path.to_path_buf(),
                        size: meta.len(),
                    }),
                    Err(e) => tracing::warn!("Skipping {:?}: {}", entry_path, e),
                }
            }
        }

        // Sort by path for deterministic ordering
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.extensions.iter().any(|fmt| *fmt == ext_lower)
            })
            .unwrap_or(false)
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}
