//! Playlist-aware duplicate resolution for a media library.
//!
//! The engine indexes a library tree into duplicate groups (same filename
//! stem, any directory or extension), resolves which paths are pinned as
//! in-use by `.m3u` playlists, classifies every duplicate as protected or
//! removable while always retaining at least one copy per group, and
//! relocates the removable copies into a quarantine directory. Nothing is
//! ever deleted outright; every removal is a move.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod services;
pub mod types;

pub use error::{Error, Result};
