//! Quarantine execution
//!
//! Relocates removal candidates into the quarantine directory, preserving
//! filenames. Destination names are assigned serially before any move runs,
//! so collision suffixes cannot race; the moves themselves run on a worker
//! pool. A failed move is recorded and never aborts the batch.

use crate::types::{MoveOutcome, QuarantineRecord};
use rayon::prelude::*;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Quarantine setup errors. Per-file move failures are not errors; they are
/// recorded in the returned records.
#[derive(Debug, Error)]
pub enum QuarantineError {
    /// Destination directory could not be created
    #[error("Cannot create quarantine directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Quarantine executor
pub struct QuarantineExecutor {
    quarantine_dir: PathBuf,
}

impl QuarantineExecutor {
    pub fn new(quarantine_dir: &Path) -> Self {
        Self {
            quarantine_dir: quarantine_dir.to_path_buf(),
        }
    }

    /// Move every candidate into the quarantine directory, creating it if
    /// absent. Returns one record per candidate; failures are isolated.
    ///
    /// The executor trusts the classification snapshot it was handed; it does
    /// not re-check protection at move time.
    pub fn execute(&self, candidates: &[PathBuf]) -> Result<Vec<QuarantineRecord>, QuarantineError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        fs::create_dir_all(&self.quarantine_dir).map_err(|e| QuarantineError::CreateDir {
            path: self.quarantine_dir.clone(),
            source: e,
        })?;

        let moves = self.assign_destinations(candidates);

        let records: Vec<QuarantineRecord> = moves
            .par_iter()
            .map(|(source, destination)| {
                let outcome = match move_file(source, destination) {
                    Ok(()) => {
                        tracing::info!(
                            from = %source.display(),
                            to = %destination.display(),
                            "Quarantined file"
                        );
                        MoveOutcome::Moved
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %source.display(),
                            error = %e,
                            "Failed to quarantine file"
                        );
                        MoveOutcome::Failed(e.to_string())
                    }
                };
                QuarantineRecord {
                    path: source.clone(),
                    destination: destination.clone(),
                    outcome,
                }
            })
            .collect();

        Ok(records)
    }

    /// Compute the destination assignment without touching any file.
    pub fn plan(&self, candidates: &[PathBuf]) -> Vec<(PathBuf, PathBuf)> {
        self.assign_destinations(candidates)
    }

    /// Pick a destination per candidate, preserving the original filename and
    /// disambiguating collisions deterministically with a numeric suffix
    /// (`Song.mp3`, `Song.1.mp3`, `Song.2.mp3`, ...). Collisions are checked
    /// against both the directory contents and the batch itself. Assignment
    /// runs serially; the move phase relies on destinations being pre-claimed.
    fn assign_destinations(&self, candidates: &[PathBuf]) -> Vec<(PathBuf, PathBuf)> {
        let mut claimed: HashSet<PathBuf> = HashSet::new();

        candidates
            .iter()
            .map(|source| {
                let file_name = source
                    .file_name()
                    .map(OsStr::to_os_string)
                    .unwrap_or_else(|| OsString::from("unnamed"));

                let mut destination = self.quarantine_dir.join(&file_name);
                let mut suffix = 1u32;
                while destination.exists() || claimed.contains(&destination) {
                    destination = self.quarantine_dir.join(suffixed_name(&file_name, suffix));
                    suffix += 1;
                }

                claimed.insert(destination.clone());
                (source.clone(), destination)
            })
            .collect()
    }
}

/// `Song.mp3` + 2 → `Song.2.mp3`; names without an extension get the suffix
/// appended (`Song` + 2 → `Song.2`).
fn suffixed_name(name: &OsStr, suffix: u32) -> OsString {
    let path = Path::new(name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => {
            let mut out = stem.to_os_string();
            out.push(format!(".{suffix}."));
            out.push(ext);
            out
        }
        _ => {
            let mut out = name.to_os_string();
            out.push(format!(".{suffix}"));
            out
        }
    }
}

/// Rename when possible; fall back to copy+delete when the rename fails,
/// which covers cross-device moves. A source that is genuinely unreadable or
/// missing fails again in the fallback with a representative error.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    if fs::rename(source, destination).is_ok() {
        return Ok(());
    }

    fs::copy(source, destination)?;
    fs::remove_file(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path, content: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn moves_candidates_preserving_filename() {
        let lib = TempDir::new().unwrap();
        let quarantine = TempDir::new().unwrap();
        let source = lib.path().join("b/Song.mp3");
        touch(&source, b"audio");

        let records = QuarantineExecutor::new(quarantine.path())
            .execute(&[source.clone()])
            .unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].is_moved());
        assert!(!source.exists());
        let moved_to = quarantine.path().join("Song.mp3");
        assert_eq!(records[0].destination, moved_to);
        assert_eq!(fs::read(moved_to).unwrap(), b"audio");
    }

    #[test]
    fn creates_quarantine_dir_if_absent() {
        let lib = TempDir::new().unwrap();
        let quarantine = lib.path().join("nested/quarantine");
        let source = lib.path().join("Song.mp3");
        touch(&source, b"x");

        let records = QuarantineExecutor::new(&quarantine)
            .execute(&[source])
            .unwrap();

        assert!(records[0].is_moved());
        assert!(quarantine.join("Song.mp3").exists());
    }

    #[test]
    fn collision_with_existing_file_gets_suffix() {
        let lib = TempDir::new().unwrap();
        let quarantine = TempDir::new().unwrap();
        touch(&quarantine.path().join("Song.mp3"), b"already here");
        let source = lib.path().join("Song.mp3");
        touch(&source, b"new");

        let records = QuarantineExecutor::new(quarantine.path())
            .execute(&[source])
            .unwrap();

        assert!(records[0].is_moved());
        assert_eq!(records[0].destination, quarantine.path().join("Song.1.mp3"));
        assert_eq!(
            fs::read(quarantine.path().join("Song.mp3")).unwrap(),
            b"already here"
        );
        assert_eq!(fs::read(quarantine.path().join("Song.1.mp3")).unwrap(), b"new");
    }

    #[test]
    fn in_batch_collisions_get_distinct_destinations() {
        let lib = TempDir::new().unwrap();
        let quarantine = TempDir::new().unwrap();
        let first = lib.path().join("a/Song.mp3");
        let second = lib.path().join("b/Song.mp3");
        let third = lib.path().join("c/Song.mp3");
        touch(&first, b"1");
        touch(&second, b"2");
        touch(&third, b"3");

        let records = QuarantineExecutor::new(quarantine.path())
            .execute(&[first, second, third])
            .unwrap();

        assert!(records.iter().all(QuarantineRecord::is_moved));
        let mut destinations: Vec<_> = records.iter().map(|r| r.destination.clone()).collect();
        destinations.sort();
        assert_eq!(
            destinations,
            vec![
                quarantine.path().join("Song.1.mp3"),
                quarantine.path().join("Song.2.mp3"),
                quarantine.path().join("Song.mp3"),
            ]
        );
    }

    #[test]
    fn failed_move_does_not_abort_the_batch() {
        let lib = TempDir::new().unwrap();
        let quarantine = TempDir::new().unwrap();
        let missing = lib.path().join("gone/Song.mp3");
        let present = lib.path().join("b/Other.mp3");
        touch(&present, b"ok");

        let records = QuarantineExecutor::new(quarantine.path())
            .execute(&[missing.clone(), present.clone()])
            .unwrap();

        assert_eq!(records.len(), 2);
        let failed = records.iter().find(|r| r.path == missing).unwrap();
        let moved = records.iter().find(|r| r.path == present).unwrap();
        assert!(failed.is_failed());
        assert!(moved.is_moved());
        assert!(quarantine.path().join("Other.mp3").exists());
    }

    #[test]
    fn plan_touches_nothing() {
        let lib = TempDir::new().unwrap();
        let quarantine = TempDir::new().unwrap();
        let source = lib.path().join("Song.mp3");
        touch(&source, b"x");

        let moves = QuarantineExecutor::new(quarantine.path()).plan(&[source.clone()]);

        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].1, quarantine.path().join("Song.mp3"));
        assert!(source.exists());
        assert!(!moves[0].1.exists());
    }

    #[test]
    fn extensionless_names_get_plain_suffix() {
        assert_eq!(
            suffixed_name(OsStr::new("Song"), 3),
            OsString::from("Song.3")
        );
        assert_eq!(
            suffixed_name(OsStr::new("Song.mp3"), 1),
            OsString::from("Song.1.mp3")
        );
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        // The quarantine dir must not even be created
        let parent = TempDir::new().unwrap();
        let quarantine = parent.path().join("quarantine");

        let records = QuarantineExecutor::new(&quarantine).execute(&[]).unwrap();

        assert!(records.is_empty());
        assert!(!quarantine.exists());
    }
}
