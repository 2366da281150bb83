/// Playlist domain types
use super::ids::PlaylistId;
use super::null_as_empty;
use super::song::Song;
use serde::{Deserialize, Serialize};

/// Playlist with its songs, as returned by `/api/playlist/metadata`
///
/// A `null` response body is normalized to `Playlist::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist identifier
    #[serde(default)]
    pub id: PlaylistId,

    /// Playlist title
    #[serde(default)]
    pub title: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Artwork URL
    #[serde(default)]
    pub artwork: String,

    /// Songs in playlist order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub songs: Vec<Song>,
}

impl Playlist {
    /// Create an unsaved playlist with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Metadata without the songs
    pub fn metadata(&self) -> PlaylistMetadata {
        PlaylistMetadata {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            artwork: self.artwork.clone(),
        }
    }
}

/// Playlist metadata without songs, as listed by the sample/personal endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistMetadata {
    /// Unique playlist identifier
    #[serde(default)]
    pub id: PlaylistId,

    /// Playlist title
    #[serde(default)]
    pub title: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Artwork URL
    #[serde(default)]
    pub artwork: String,
}

impl PlaylistMetadata {
    /// Create metadata for a new playlist
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        artwork: impl Into<String>,
    ) -> Self {
        Self {
            id: PlaylistId::default(),
            title: title.into(),
            description: description.into(),
            artwork: artwork.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_song_list_becomes_empty() {
        let json = r#"{"id": "p1", "title": "Mix", "description": "", "artwork": "", "songs": null}"#;
        let playlist: Playlist = serde_json::from_str(json).unwrap();
        assert!(playlist.songs.is_empty());
        assert_eq!(playlist.id.as_str(), "p1");
    }

    #[test]
    fn metadata_drops_songs() {
        let mut playlist = Playlist::new("Road Trip");
        playlist.songs.push(Song::new("1", "Song", "Artist"));

        let meta = playlist.metadata();
        assert_eq!(meta.title, "Road Trip");
        assert!(meta.id.is_empty());
    }
}
