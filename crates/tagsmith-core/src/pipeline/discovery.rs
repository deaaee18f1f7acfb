//! File discovery for finding images in directories.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::BatchConfig;

/// Discovers image files in directories.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    config: BatchConfig,
}

impl FileDiscovery {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Discover all supported image files at a path.
    ///
    /// A file is returned as-is if its extension is supported. A directory is
    /// listed one level deep, or fully when `recursive` is set. Results are
    /// sorted by path.
    pub fn discover(&self, path: &Path) -> Vec<PathBuf> {
        if path.is_file() {
            if self.is_supported(path) {
                return vec![path.to_path_buf()];
            }
            return vec![];
        }

        let mut walker = WalkDir::new(path).follow_links(true);
        if !self.config.recursive {
            walker = walker.max_depth(1);
        }

        let mut files: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file() && self.is_supported(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        files.sort();
        files
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}
