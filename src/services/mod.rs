//! Service modules for the duplicate quarantine pipeline

pub mod duplicate_classifier;
pub mod library_indexer;
pub mod playlist_reader;
pub mod quarantine_executor;

pub use duplicate_classifier::classify;
pub use library_indexer::{LibraryIndexer, ScanError};
pub use playlist_reader::{PlaylistError, PlaylistReader};
pub use quarantine_executor::{QuarantineError, QuarantineExecutor};
