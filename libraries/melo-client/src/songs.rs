//! Song catalog and audio endpoints.

use crate::client::{endpoint, ensure_success, json_or_default, send_error};
use crate::error::{ClientError, Result};
use melo_core::{AudioResource, Song};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Song client for the Melo backend.
pub(crate) struct SongClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    id_token: &'a str,
}

impl<'a> SongClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, id_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            id_token,
        }
    }

    /// Songs shown on the home page.
    pub async fn sample(&self) -> Result<Vec<Song>> {
        let url = endpoint(self.base_url, "/api/song/sample", &[])?;
        debug!(url = %url, "Fetching sample songs");
        self.fetch_list(url).await
    }

    /// Songs matching a search string.
    pub async fn search(&self, query: &str) -> Result<Vec<Song>> {
        let url = endpoint(self.base_url, "/api/song/search", &[("q", query)])?;
        debug!(url = %url, query = %query, "Searching songs");
        self.fetch_list(url).await
    }

    async fn fetch_list(&self, url: Url) -> Result<Vec<Song>> {
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.id_token)
            .send()
            .await
            .map_err(send_error)?;

        let songs: Vec<Song> = json_or_default(ensure_success(response).await?, "songs").await?;
        debug!(count = songs.len(), "Fetched songs");
        Ok(songs)
    }

    /// Download the audio behind `song.audio_url`.
    pub async fn audio(&self, song: &Song) -> Result<AudioResource> {
        let url = audio_url(self.base_url, &song.audio_url)?;
        debug!(url = %url, song_id = %song.id, "Fetching audio");

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.id_token)
            .send()
            .await
            .map_err(send_error)?;

        let response = ensure_success(response).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let data = response.bytes().await?.to_vec();

        debug!(song_id = %song.id, bytes = data.len(), "Fetched audio");
        Ok(AudioResource::new(song.id.clone(), content_type, data))
    }
}

/// Resolve an audio reference that is either absolute or relative to the
/// server.
fn audio_url(base_url: &str, reference: &str) -> Result<Url> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(ClientError::InvalidUrl("song has no audio URL".to_string()));
    }

    let full = if reference.starts_with("http://") || reference.starts_with("https://") {
        reference.to_string()
    } else if reference.starts_with('/') {
        format!("{}{}", base_url, reference)
    } else {
        format!("{}/{}", base_url, reference)
    };

    Url::parse(&full).map_err(|e| ClientError::InvalidUrl(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_url_forms() {
        let base = "https://melo.example.com/app";
        assert_eq!(
            audio_url(base, "/song/a.mp3").unwrap().as_str(),
            "https://melo.example.com/app/song/a.mp3"
        );
        assert_eq!(
            audio_url(base, "song/a.mp3").unwrap().as_str(),
            "https://melo.example.com/app/song/a.mp3"
        );
        assert_eq!(
            audio_url(base, "https://cdn.example.com/a.mp3?sig=1").unwrap().as_str(),
            "https://cdn.example.com/a.mp3?sig=1"
        );
        assert!(matches!(
            audio_url(base, "  "),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
