//! Library tree indexing
//!
//! Walks the library root and groups file paths by canonical identity (the
//! filename with its extension stripped). Only identities carrying more than
//! one path survive as duplicate groups. Sidecar files (lyrics) are never
//! library members and are skipped before key derivation.

use crate::types::{CanonicalKey, DuplicateGroup};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions that mark a file as a sidecar of a media file
const SIDECAR_EXTENSIONS: &[&str] = &["lrc"];

/// Library indexing errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Library root does not exist
    #[error("Library root not found: {0}")]
    RootNotFound(PathBuf),

    /// Library root exists but is not a directory
    #[error("Library root is not a directory: {0}")]
    RootNotADirectory(PathBuf),
}

/// Library indexer
pub struct LibraryIndexer {
    excluded_dirs: Vec<PathBuf>,
}

impl LibraryIndexer {
    pub fn new() -> Self {
        Self {
            excluded_dirs: Vec::new(),
        }
    }

    /// Exclude a directory subtree from the walk. The quarantine directory is
    /// always excluded this way, which keeps repeated runs stable even when
    /// it lives under the library root.
    pub fn with_excluded_dir(mut self, dir: &Path) -> Self {
        self.excluded_dirs.push(dir.to_path_buf());
        self
    }

    /// Walk `library_root` and return duplicate groups keyed by canonical
    /// identity. Members keep walk order; the walk is sorted by file name so
    /// group ordering (and the primary member) is deterministic per run.
    ///
    /// An unreadable individual entry is logged and skipped; only an
    /// inaccessible root aborts the index. Read-only.
    pub fn index(
        &self,
        library_root: &Path,
    ) -> Result<BTreeMap<CanonicalKey, DuplicateGroup>, ScanError> {
        if !library_root.exists() {
            return Err(ScanError::RootNotFound(library_root.to_path_buf()));
        }
        if !library_root.is_dir() {
            return Err(ScanError::RootNotADirectory(library_root.to_path_buf()));
        }

        let mut paths_by_key: BTreeMap<CanonicalKey, Vec<PathBuf>> = BTreeMap::new();

        let walker = WalkDir::new(library_root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_excluded(e.path()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if is_sidecar(path) {
                continue;
            }

            let Some(key) = CanonicalKey::from_path(path) else {
                tracing::debug!(path = %path.display(), "Skipping file without usable stem");
                continue;
            };

            paths_by_key.entry(key).or_default().push(path.to_path_buf());
        }

        let groups: BTreeMap<CanonicalKey, DuplicateGroup> = paths_by_key
            .into_iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(key, members)| (key.clone(), DuplicateGroup { key, members }))
            .collect();

        tracing::info!(groups = groups.len(), "Library index complete");

        Ok(groups)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excluded_dirs.iter().any(|dir| path.starts_with(dir))
    }
}

impl Default for LibraryIndexer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_sidecar(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SIDECAR_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}
