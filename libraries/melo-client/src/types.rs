//! Types for Melo API requests and responses.

use crate::auth::TokenStore;
use melo_core::{PlaylistId, PlaylistMetadata, SongId};
use serde::{Deserialize, Serialize};

/// Configuration for connecting to a Melo server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the server (e.g., "https://melo.example.com")
    pub url: String,
    /// Id and refresh tokens
    pub tokens: TokenStore,
}

impl ClientConfig {
    /// Create a new config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tokens: TokenStore::default(),
        }
    }

    /// Create a config with existing tokens.
    pub fn with_tokens(
        url: impl Into<String>,
        id_token: Option<String>,
        refresh_token: Option<String>,
    ) -> Self {
        Self {
            url: url.into(),
            tokens: TokenStore::new(id_token, refresh_token),
        }
    }
}

// =============================================================================
// Authentication Types
// =============================================================================

/// Request body for the token refresh URL.
#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response from the token refresh URL.
#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    #[serde(default)]
    pub id_token: Option<String>,
}

// =============================================================================
// Playlist Types
// =============================================================================

/// Response from `POST /api/playlist`.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatePlaylistResponse {
    #[serde(rename = "playlistId", default)]
    pub playlist_id: Option<String>,
}

/// Body of `POST /api/playlist/metadata`; the server names the id `playlistId`.
#[derive(Debug, Serialize)]
pub(crate) struct UpdatePlaylistRequest<'a> {
    #[serde(rename = "playlistId")]
    pub playlist_id: &'a PlaylistId,
    pub title: &'a str,
    pub description: &'a str,
    pub artwork: &'a str,
}

impl<'a> From<&'a PlaylistMetadata> for UpdatePlaylistRequest<'a> {
    fn from(meta: &'a PlaylistMetadata) -> Self {
        Self {
            playlist_id: &meta.id,
            title: &meta.title,
            description: &meta.description,
            artwork: &meta.artwork,
        }
    }
}

/// Body of the add/remove song endpoints.
#[derive(Debug, Serialize)]
pub(crate) struct PlaylistSongRequest<'a> {
    #[serde(rename = "playlistId")]
    pub playlist_id: &'a PlaylistId,
    #[serde(rename = "songId")]
    pub song_id: &'a SongId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_renames_id() {
        let mut meta = PlaylistMetadata::new("Road Trip", "long drives", "");
        meta.id = PlaylistId::new("p1");

        let json = serde_json::to_value(UpdatePlaylistRequest::from(&meta)).unwrap();
        assert_eq!(json["playlistId"], "p1");
        assert!(json.get("id").is_none());
        assert_eq!(json["title"], "Road Trip");
    }

    #[test]
    fn song_request_field_names() {
        let pid = PlaylistId::new("p1");
        let sid = SongId::new("s1");
        let json = serde_json::to_value(PlaylistSongRequest {
            playlist_id: &pid,
            song_id: &sid,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"playlistId": "p1", "songId": "s1"}));
    }
}
