/// Song domain type
use super::ids::SongId;
use serde::{Deserialize, Serialize};

/// Song metadata as served by the Melo backend
///
/// Immutable from the point of view of the queue and the playback controller.
/// `audio_url` is only a reference; it is resolved into playable audio lazily.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Melo song id
    pub id: SongId,

    /// Song title
    #[serde(default)]
    pub title: String,

    /// Artist name
    #[serde(default)]
    pub artist: String,

    /// Album name
    #[serde(default)]
    pub album: String,

    /// Melo resource URL for the audio (absolute or relative to the server)
    #[serde(rename = "audioURL", default)]
    pub audio_url: String,

    /// Artwork URL
    #[serde(default)]
    pub artwork: String,
}

impl Song {
    /// Create a song with the display fields every view needs
    pub fn new(id: impl Into<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: SongId::new(id),
            title: title.into(),
            artist: artist.into(),
            ..Self::default()
        }
    }

    /// Set the album name
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    /// Set the audio resource URL
    #[must_use]
    pub fn with_audio_url(mut self, url: impl Into<String>) -> Self {
        self.audio_url = url.into();
        self
    }

    /// Set the artwork URL
    #[must_use]
    pub fn with_artwork(mut self, url: impl Into<String>) -> Self {
        self.artwork = url.into();
        self
    }
}
