//! Melo Core
//!
//! Platform-agnostic domain types, traits, and error handling shared by the
//! Melo playback engine, the backend client, and the applications.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Song`, `Playlist`, external search results, download progress
//! - **Core Traits**: `ResourceResolver` (song reference → playable audio)
//! - **Error Handling**: Unified `MeloError` and `Result` types
//! - **Formatting**: clock, duration and view-count labels used by front ends
//!
//! # Example
//!
//! ```rust
//! use melo_core::types::{Playlist, Song};
//!
//! let song = Song::new("6543a1", "Blue in Green", "Miles Davis")
//!     .with_album("Kind of Blue")
//!     .with_audio_url("/song/blue-in-green.mp3");
//!
//! let mut playlist = Playlist::new("Late Night");
//! playlist.songs.push(song);
//! assert_eq!(playlist.songs.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod format;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{MeloError, Result};
pub use traits::{AudioResource, ResourceResolver};

pub use types::{
    CatalogSong, DownloadDecoder, DownloadProgressTracker, DownloadRequest, DownloadUpdate,
    ExternalSearchResults, Playlist, PlaylistId, PlaylistMetadata, SearchHit, Song, SongId,
    StepProgress, VideoResult,
};
