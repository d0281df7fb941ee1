//! Playlist reference resolution
//!
//! Reads every `.m3u` file directly under the playlists root (the playlist
//! convention is a single flat directory) and collects the referenced entries
//! as normalized track refs. Unlike the library walk, any unreadable playlist
//! aborts the run: an under-counted reference set would let the classifier
//! mark an in-use file as removable.

use crate::types::TrackRef;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Playlist file extension, compared case-insensitively
const PLAYLIST_EXTENSION: &str = "m3u";

/// Playlist resolution errors; all of them are fatal to the run
#[derive(Debug, Error)]
pub enum PlaylistError {
    /// Playlists root could not be listed
    #[error("Playlists root not readable: {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One playlist file could not be read
    #[error("Playlist not readable: {path}: {source}")]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Playlist reader
pub struct PlaylistReader {
    library_root: PathBuf,
    playlists_root: PathBuf,
}

impl PlaylistReader {
    pub fn new(library_root: &Path, playlists_root: &Path) -> Self {
        Self {
            library_root: library_root.to_path_buf(),
            playlists_root: playlists_root.to_path_buf(),
        }
    }

    /// Collect the referenced set from every playlist under the playlists
    /// root. Read-only.
    ///
    /// Every non-empty line is treated as a path entry, including extended-M3U
    /// metadata lines: a metadata line normalizes to a ref that matches no
    /// library path, and an extra reference can only protect more files.
    pub fn resolve(&self) -> Result<HashSet<TrackRef>, PlaylistError> {
        let mut referenced = HashSet::new();

        let entries =
            fs::read_dir(&self.playlists_root).map_err(|e| PlaylistError::RootUnreadable {
                path: self.playlists_root.clone(),
                source: e,
            })?;

        let mut playlists = 0usize;
        for entry in entries {
            let entry = entry.map_err(|e| PlaylistError::RootUnreadable {
                path: self.playlists_root.clone(),
                source: e,
            })?;
            let path = entry.path();
            if !path.is_file() || !is_playlist(&path) {
                continue;
            }

            let before = referenced.len();
            self.read_playlist(&path, &mut referenced)?;
            playlists += 1;
            tracing::debug!(
                playlist = %path.display(),
                new_entries = referenced.len() - before,
                "Read playlist"
            );
        }

        tracing::info!(
            playlists,
            references = referenced.len(),
            "Playlist resolution complete"
        );

        Ok(referenced)
    }

    fn read_playlist(
        &self,
        path: &Path,
        referenced: &mut HashSet<TrackRef>,
    ) -> Result<(), PlaylistError> {
        let content = fs::read_to_string(path).map_err(|e| PlaylistError::FileUnreadable {
            path: path.to_path_buf(),
            source: e,
        })?;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            referenced.insert(TrackRef::from_playlist_entry(
                line,
                &self.library_root,
                &self.playlists_root,
            ));
        }

        Ok(())
    }
}

fn is_playlist(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(PLAYLIST_EXTENSION))
        .unwrap_or(false)
}
