//! Core data model for the duplicate quarantine engine.
//!
//! Everything here is recomputed from the filesystem at the start of a run
//! and discarded at the end; there is no cross-run persisted state.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Canonical identity of a logical track: the filename with its extension
/// stripped. Two files with the same key are considered the same track
/// regardless of directory or extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Derive the key from a path's final segment. Returns `None` when the
    /// path has no usable stem (no filename, or a non-UTF-8 name that could
    /// never be compared against playlist text anyway).
    pub fn from_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        if stem.is_empty() {
            return None;
        }
        Some(Self(stem.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Library-root-relative path in forward-slash form, used for exact equality
/// between playlist entries and on-disk duplicate candidates. Exact equality
/// replaces substring containment, which both over-matches short filenames
/// inside unrelated paths and under-matches across separator boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TrackRef(String);

impl TrackRef {
    /// Normalize an on-disk library path produced by the walk.
    pub fn from_library_path(path: &Path, library_root: &Path) -> Self {
        let relative = path.strip_prefix(library_root).unwrap_or(path);
        Self::normalize(&relative.to_string_lossy())
    }

    /// Normalize a raw playlist entry, which may be absolute, prefixed with
    /// the library or playlists root, or already root-relative.
    pub fn from_playlist_entry(entry: &str, library_root: &Path, playlists_root: &Path) -> Self {
        let entry = entry.trim().replace('\\', "/");
        let stripped = strip_root(&entry, library_root)
            .or_else(|| strip_root(&entry, playlists_root))
            .unwrap_or(entry.as_str());
        Self::normalize(stripped)
    }

    fn normalize(s: &str) -> Self {
        Self(s.replace('\\', "/").trim_start_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip `root` from the front of `entry`, only at a path-segment boundary.
fn strip_root<'a>(entry: &'a str, root: &Path) -> Option<&'a str> {
    let prefix = root.to_string_lossy().replace('\\', "/");
    if prefix.is_empty() {
        return None;
    }
    let rest = entry.strip_prefix(prefix.trim_end_matches('/'))?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

/// All paths observed for one canonical key, in walk order. Groups are only
/// formed for keys with more than one path; `members` always holds at least
/// two entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub key: CanonicalKey,
    pub members: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// The first member observed by the walk; retained as the surviving copy
    /// when no member is referenced by any playlist.
    pub fn primary(&self) -> &Path {
        &self.members[0]
    }
}

/// Per-group classification outcome. `protected` and `removable` partition
/// the group's members; `removable` is always strictly smaller than the
/// member list. A member is protected when a playlist references it, or when
/// it is the primary of a group in which nothing is referenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub protected: Vec<PathBuf>,
    pub removable: Vec<PathBuf>,
}

/// Outcome of one attempted relocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MoveOutcome {
    /// File now lives at the record's destination
    Moved,
    /// Dry run: the move was planned but not performed
    Planned,
    /// Move failed; the file is untouched (or, after a copy that could not
    /// unlink its source, present in both places)
    Failed(String),
}

/// Outcome of attempting to relocate one file into quarantine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuarantineRecord {
    pub path: PathBuf,
    pub destination: PathBuf,
    pub outcome: MoveOutcome,
}

impl QuarantineRecord {
    pub fn is_moved(&self) -> bool {
        self.outcome == MoveOutcome::Moved
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, MoveOutcome::Failed(_))
    }
}

/// Aggregate outcome of one engine run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Duplicate groups discovered in the library
    pub groups: usize,
    /// Distinct normalized entries extracted from all playlists
    pub referenced_entries: usize,
    /// Members kept in place across all groups
    pub protected: usize,
    /// Members selected for quarantine across all groups
    pub removable: usize,
    /// Files actually relocated
    pub moved: usize,
    /// Files whose relocation failed
    pub failed: usize,
    /// True when the run previewed moves without performing them
    pub dry_run: bool,
    /// One record per removal candidate
    pub records: Vec<QuarantineRecord>,
}
