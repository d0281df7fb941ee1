//! Crate-wide error types.

use thiserror::Error;

/// Common result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for a run
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Library indexing failed (inaccessible root)
    #[error("Library scan failed: {0}")]
    Scan(#[from] crate::services::library_indexer::ScanError),

    /// Playlist resolution failed; the run stops before any mutation
    #[error("Playlist resolution failed: {0}")]
    Playlist(#[from] crate::services::playlist_reader::PlaylistError),

    /// Quarantine directory could not be prepared
    #[error("Quarantine setup failed: {0}")]
    Quarantine(#[from] crate::services::quarantine_executor::QuarantineError),

    /// Internal error (worker task panic or similar)
    #[error("Internal error: {0}")]
    Internal(String),
}
