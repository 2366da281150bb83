//! Playlist endpoints.

use crate::client::{endpoint, ensure_success, json_or_default, send_error};
use crate::error::{ClientError, Result};
use crate::types::{CreatePlaylistResponse, PlaylistSongRequest, UpdatePlaylistRequest};
use melo_core::{Playlist, PlaylistId, PlaylistMetadata, SongId};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

/// Playlist client for the Melo backend.
pub(crate) struct PlaylistClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    id_token: &'a str,
}

impl<'a> PlaylistClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, id_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            id_token,
        }
    }

    /// A playlist with its songs.
    pub async fn get(&self, id: &PlaylistId) -> Result<Playlist> {
        let url = endpoint(self.base_url, "/api/playlist/metadata", &[("id", id.as_str())])?;
        debug!(url = %url, playlist_id = %id, "Fetching playlist");

        let playlist: Playlist = json_or_default(self.get_url(url).await?, "playlist").await?;
        debug!(playlist_id = %id, songs = playlist.songs.len(), "Fetched playlist");
        Ok(playlist)
    }

    /// Playlists owned by the user.
    pub async fn personal(&self) -> Result<Vec<PlaylistMetadata>> {
        let url = endpoint(self.base_url, "/api/playlist/personal", &[])?;
        debug!(url = %url, "Fetching personal playlists");
        json_or_default(self.get_url(url).await?, "playlists").await
    }

    /// A random set of playlists.
    pub async fn sample(&self) -> Result<Vec<PlaylistMetadata>> {
        let url = endpoint(self.base_url, "/api/playlist/sample", &[])?;
        debug!(url = %url, "Fetching sample playlists");
        json_or_default(self.get_url(url).await?, "playlists").await
    }

    /// Create a playlist; the server must answer with its `playlistId`.
    pub async fn create(&self, meta: &PlaylistMetadata) -> Result<PlaylistId> {
        let url = endpoint(self.base_url, "/api/playlist", &[])?;
        debug!(url = %url, title = %meta.title, "Creating playlist");

        let response = self.post_json(url, meta).await?;
        let body: Option<CreatePlaylistResponse> = response.json().await.map_err(|e| {
            ClientError::ParseError(format!("Failed to parse create playlist response: {}", e))
        })?;

        match body.and_then(|b| b.playlist_id).filter(|id| !id.is_empty()) {
            Some(id) => {
                info!(playlist_id = %id, title = %meta.title, "Playlist created");
                Ok(PlaylistId::new(id))
            }
            None => Err(ClientError::ParseError(
                "Response is missing \"playlistId\" property".to_string(),
            )),
        }
    }

    /// Update title, description and artwork.
    pub async fn update_metadata(&self, meta: &PlaylistMetadata) -> Result<()> {
        let url = endpoint(self.base_url, "/api/playlist/metadata", &[])?;
        debug!(url = %url, playlist_id = %meta.id, "Updating playlist metadata");
        self.post_json(url, &UpdatePlaylistRequest::from(meta))
            .await
            .map(drop)
    }

    /// Append a song.
    pub async fn add_song(&self, playlist_id: &PlaylistId, song_id: &SongId) -> Result<()> {
        let url = endpoint(self.base_url, "/api/playlist/addSong", &[])?;
        debug!(url = %url, playlist_id = %playlist_id, song_id = %song_id, "Adding song to playlist");
        self.post_json(
            url,
            &PlaylistSongRequest {
                playlist_id,
                song_id,
            },
        )
        .await
        .map(drop)
    }

    /// Remove a song.
    pub async fn remove_song(&self, playlist_id: &PlaylistId, song_id: &SongId) -> Result<()> {
        let url = endpoint(self.base_url, "/api/playlist/removeSong", &[])?;
        debug!(url = %url, playlist_id = %playlist_id, song_id = %song_id, "Removing song from playlist");
        self.post_json(
            url,
            &PlaylistSongRequest {
                playlist_id,
                song_id,
            },
        )
        .await
        .map(drop)
    }

    async fn get_url(&self, url: Url) -> Result<Response> {
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.id_token)
            .send()
            .await
            .map_err(send_error)?;
        ensure_success(response).await
    }

    async fn post_json<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<Response> {
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.id_token)
            .json(body)
            .send()
            .await
            .map_err(send_error)?;
        ensure_success(response).await
    }
}
