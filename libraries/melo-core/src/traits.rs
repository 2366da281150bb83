/// Core traits for Melo
use crate::error::Result;
use crate::types::{Song, SongId};
use async_trait::async_trait;

/// Playable audio produced by resolving a song reference.
///
/// The resolver fetches the authorized, time-limited resource once; the media
/// element only ever sees this buffered form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioResource {
    /// Song the resource was resolved for
    pub song_id: SongId,

    /// MIME type reported by the server, if any
    pub content_type: Option<String>,

    /// Encoded audio bytes
    pub data: Vec<u8>,
}

impl AudioResource {
    /// Create a resource for the given song
    pub fn new(song_id: SongId, content_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            song_id,
            content_type,
            data,
        }
    }

    /// Size of the encoded audio in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the resource carries no audio data
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Resource resolution
///
/// Converts a song reference into playable audio. Implementations typically
/// attach an authorization token and may refresh it before fetching.
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    /// Resolve the playable resource for `song`
    ///
    /// # Errors
    /// Returns an error if the resource cannot be fetched or authorized
    async fn resolve(&self, song: &Song) -> Result<AudioResource>;
}
