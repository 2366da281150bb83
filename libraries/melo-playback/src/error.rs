//! Error types for playback management

use melo_core::MeloError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No song is currently loaded
    #[error("No song loaded")]
    NoSongLoaded,

    /// Resource resolution failed (after retries)
    #[error("Resolution failed: {0}")]
    Resolution(#[from] MeloError),

    /// Media element rejected an operation
    #[error("Media error: {0}")]
    Media(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
