/// Core error types for Melo
use thiserror::Error;

/// Result type alias using `MeloError`
pub type Result<T> = std::result::Result<T, MeloError>;

/// Core error type for Melo
#[derive(Error, Debug)]
pub enum MeloError {
    /// A song reference could not be turned into playable audio
    #[error("Resolution failed for song {song_id}: {message}")]
    Resolution { song_id: String, message: String },

    /// Data received from a collaborator did not match the expected shape
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl MeloError {
    /// Create a resolution error
    pub fn resolution(song_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            song_id: song_id.into(),
            message: message.into(),
        }
    }

    /// Create an invalid data error
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }
}
