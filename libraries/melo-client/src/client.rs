//! Main Melo client.

use crate::auth::AuthClient;
use crate::download::DownloadClient;
use crate::error::{ClientError, Result};
use crate::playlists::PlaylistClient;
use crate::songs::SongClient;
use crate::types::ClientConfig;
use async_trait::async_trait;
use chrono::Utc;
use melo_core::{
    AudioResource, DownloadProgressTracker, DownloadRequest, DownloadUpdate,
    ExternalSearchResults, MeloError, Playlist, PlaylistId, PlaylistMetadata, ResourceResolver,
    Song, SongId,
};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

/// Client for the Melo backend.
///
/// Holds the session tokens, attaches the id token to every request, and
/// refreshes it when it is missing, expired, or rejected with a 401.
///
/// # Example
///
/// ```ignore
/// use melo_client::{ClientConfig, MeloClient};
///
/// let config = ClientConfig::with_tokens("https://melo.example.com", None, Some(refresh));
/// let client = MeloClient::new(config)?;
///
/// for song in client.search_songs("kind of blue").await? {
///     println!("{} - {}", song.artist, song.title);
/// }
/// ```
#[derive(Clone)]
pub struct MeloClient {
    http: Client,
    config: Arc<RwLock<ClientConfig>>,
}

impl MeloClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        // Validate URL
        if config.url.is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }

        // Parse and normalize URL
        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        Url::parse(&url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let normalized_config = ClientConfig {
            url,
            tokens: config.tokens,
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Melo/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(normalized_config)),
        })
    }

    /// Get the server URL.
    pub async fn url(&self) -> String {
        self.config.read().await.url.clone()
    }

    /// Check if the client holds any token.
    pub async fn is_authenticated(&self) -> bool {
        !self.config.read().await.tokens.is_empty()
    }

    /// Set tokens directly (e.g., from stored credentials).
    pub async fn set_tokens(&self, id_token: Option<String>, refresh_token: Option<String>) {
        let mut config = self.config.write().await;
        config.tokens = crate::auth::TokenStore::new(id_token, refresh_token);
    }

    /// Get the current tokens.
    pub async fn tokens(&self) -> (Option<String>, Option<String>) {
        let config = self.config.read().await;
        (
            config.tokens.id_token().map(str::to_string),
            config.tokens.refresh_token().map(str::to_string),
        )
    }

    /// Clear stored tokens.
    pub async fn logout(&self) {
        self.config.write().await.tokens.clear();
        info!("Logged out");
    }

    /// A valid id token, refreshing it when missing or expired.
    pub async fn id_token(&self) -> Result<String> {
        let cached = self.config.write().await.tokens.valid_id_token(Utc::now());
        match cached {
            Some(token) => Ok(token),
            None => self.refresh_id_token().await,
        }
    }

    /// Exchange the refresh token for a new id token and store it.
    ///
    /// A rejected refresh token is forgotten and `AuthRequired` returned.
    pub async fn refresh_id_token(&self) -> Result<String> {
        let (url, refresh_token) = {
            let mut config = self.config.write().await;
            let refresh_token = config
                .tokens
                .valid_refresh_token(Utc::now())
                .ok_or(ClientError::AuthRequired)?;
            (config.url.clone(), refresh_token)
        };

        let auth_client = AuthClient::new(&self.http, &url);
        match auth_client.refresh_id_token(&refresh_token).await {
            Ok(id_token) => {
                self.config.write().await.tokens.set_id_token(id_token.clone());
                Ok(id_token)
            }
            Err(ClientError::AuthRequired) => {
                self.config.write().await.tokens.clear_refresh_token();
                Err(ClientError::AuthRequired)
            }
            Err(e) => Err(e),
        }
    }

    /// Execute an operation with automatic token refresh on 401.
    ///
    /// If the operation fails with `AuthRequired`, refreshes the id token
    /// and retries once.
    pub async fn with_auto_refresh<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match operation().await {
            Ok(result) => Ok(result),
            Err(ClientError::AuthRequired) => {
                warn!("Id token rejected, attempting refresh");
                self.refresh_id_token().await?;
                operation().await
            }
            Err(e) => Err(e),
        }
    }

    /// Base URL and a valid id token.
    async fn session(&self) -> Result<(String, String)> {
        let token = self.id_token().await?;
        Ok((self.url().await, token))
    }

    // =========================================================================
    // Songs
    // =========================================================================

    /// Songs for the home page.
    pub async fn sample_songs(&self) -> Result<Vec<Song>> {
        let this = self;
        self.with_auto_refresh(move || async move {
            let (base, token) = this.session().await?;
            SongClient::new(&this.http, &base, &token).sample().await
        })
        .await
    }

    /// Search the catalog.
    pub async fn search_songs(&self, query: &str) -> Result<Vec<Song>> {
        let this = self;
        self.with_auto_refresh(move || async move {
            let (base, token) = this.session().await?;
            SongClient::new(&this.http, &base, &token)
                .search(query)
                .await
        })
        .await
    }

    /// Fetch the audio a song's `audio_url` points to.
    pub async fn resolve_audio(&self, song: &Song) -> Result<AudioResource> {
        let this = self;
        self.with_auto_refresh(move || async move {
            let (base, token) = this.session().await?;
            SongClient::new(&this.http, &base, &token)
                .audio(song)
                .await
        })
        .await
    }

    // =========================================================================
    // Playlists
    // =========================================================================

    /// A playlist with its songs; a `null` answer yields an empty playlist.
    pub async fn get_playlist(&self, id: &PlaylistId) -> Result<Playlist> {
        let this = self;
        self.with_auto_refresh(move || async move {
            let (base, token) = this.session().await?;
            PlaylistClient::new(&this.http, &base, &token).get(id).await
        })
        .await
    }

    /// Playlists owned by the user.
    pub async fn personal_playlists(&self) -> Result<Vec<PlaylistMetadata>> {
        let this = self;
        self.with_auto_refresh(move || async move {
            let (base, token) = this.session().await?;
            PlaylistClient::new(&this.http, &base, &token)
                .personal()
                .await
        })
        .await
    }

    /// A random set of playlists.
    pub async fn sample_playlists(&self) -> Result<Vec<PlaylistMetadata>> {
        let this = self;
        self.with_auto_refresh(move || async move {
            let (base, token) = this.session().await?;
            PlaylistClient::new(&this.http, &base, &token)
                .sample()
                .await
        })
        .await
    }

    /// Create a playlist and return its id.
    pub async fn create_playlist(&self, meta: &PlaylistMetadata) -> Result<PlaylistId> {
        let this = self;
        self.with_auto_refresh(move || async move {
            let (base, token) = this.session().await?;
            PlaylistClient::new(&this.http, &base, &token)
                .create(meta)
                .await
        })
        .await
    }

    /// Update a playlist's title, description and artwork.
    pub async fn update_playlist_metadata(&self, meta: &PlaylistMetadata) -> Result<()> {
        let this = self;
        self.with_auto_refresh(move || async move {
            let (base, token) = this.session().await?;
            PlaylistClient::new(&this.http, &base, &token)
                .update_metadata(meta)
                .await
        })
        .await
    }

    /// Append a song to a playlist.
    pub async fn add_song_to_playlist(
        &self,
        playlist_id: &PlaylistId,
        song_id: &SongId,
    ) -> Result<()> {
        let this = self;
        self.with_auto_refresh(move || async move {
            let (base, token) = this.session().await?;
            PlaylistClient::new(&this.http, &base, &token)
                .add_song(playlist_id, song_id)
                .await
        })
        .await
    }

    /// Remove a song from a playlist.
    pub async fn remove_song_from_playlist(
        &self,
        playlist_id: &PlaylistId,
        song_id: &SongId,
    ) -> Result<()> {
        let this = self;
        self.with_auto_refresh(move || async move {
            let (base, token) = this.session().await?;
            PlaylistClient::new(&this.http, &base, &token)
                .remove_song(playlist_id, song_id)
                .await
        })
        .await
    }

    // =========================================================================
    // Downloads
    // =========================================================================

    /// Search the external catalog and audio provider.
    pub async fn external_search(&self, query: &str) -> Result<ExternalSearchResults> {
        let this = self;
        self.with_auto_refresh(move || async move {
            let (base, token) = this.session().await?;
            DownloadClient::new(&this.http, &base, &token)
                .search(query)
                .await
        })
        .await
    }

    /// Ask the server to download a song, reporting each progress message.
    ///
    /// Returns the final progress state once the stream ends.
    pub async fn download_song<F>(
        &self,
        request: &DownloadRequest,
        on_update: F,
    ) -> Result<DownloadProgressTracker>
    where
        F: FnMut(&DownloadUpdate, &DownloadProgressTracker),
    {
        let this = self;
        let response = self
            .with_auto_refresh(move || async move {
                let (base, token) = this.session().await?;
                DownloadClient::new(&this.http, &base, &token)
                    .start(request)
                    .await
            })
            .await?;

        DownloadClient::follow(response, &request.title, on_update).await
    }
}

#[async_trait]
impl ResourceResolver for MeloClient {
    async fn resolve(&self, song: &Song) -> melo_core::Result<AudioResource> {
        self.resolve_audio(song)
            .await
            .map_err(|e| MeloError::resolution(song.id.as_str(), e.to_string()))
    }
}

// =============================================================================
// Response helpers
// =============================================================================

/// Classify a transport error.
pub(crate) fn send_error(e: reqwest::Error) -> ClientError {
    if e.is_connect() || e.is_timeout() {
        ClientError::ServerUnreachable(e.to_string())
    } else {
        ClientError::Request(e)
    }
}

/// Turn non-success statuses into errors; 401 becomes `AuthRequired`.
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
        Ok(response)
    } else if status == StatusCode::UNAUTHORIZED {
        debug!(url = %response.url(), "Request unauthorized");
        Err(ClientError::AuthRequired)
    } else {
        let error_text = response.text().await.unwrap_or_default();
        Err(ClientError::ServerError {
            status: status.as_u16(),
            message: error_text,
        })
    }
}

/// Parse a JSON body, treating `null` as the default value.
pub(crate) async fn json_or_default<T>(response: Response, what: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let body: Option<T> = response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse {}: {}", what, e)))?;
    Ok(body.unwrap_or_default())
}

/// Build an endpoint URL under the base with an encoded query string.
pub(crate) fn endpoint(base_url: &str, path: &str, query: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(&format!("{}{}", base_url, path))
        .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}
