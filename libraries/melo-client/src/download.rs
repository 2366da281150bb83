//! External search and server-side song downloads.

use crate::client::{endpoint, ensure_success, json_or_default, send_error};
use crate::error::{ClientError, Result};
use futures_util::StreamExt;
use melo_core::{
    DownloadDecoder, DownloadProgressTracker, DownloadRequest, DownloadUpdate,
    ExternalSearchResults,
};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response};
use tracing::{debug, info};

/// Download client for the Melo backend.
pub(crate) struct DownloadClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    id_token: &'a str,
}

impl<'a> DownloadClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, id_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            id_token,
        }
    }

    /// Search the external catalog and the audio provider.
    pub async fn search(&self, query: &str) -> Result<ExternalSearchResults> {
        let url = endpoint(self.base_url, "/download/search", &[("q", query)])?;
        debug!(url = %url, query = %query, "External search");

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.id_token)
            .send()
            .await
            .map_err(send_error)?;

        let results: ExternalSearchResults =
            json_or_default(ensure_success(response).await?, "search results").await?;
        debug!(
            songs = results.songs.len(),
            videos = results.videos.len(),
            "External search finished"
        );
        Ok(results)
    }

    /// Submit a download; the response body is the progress stream.
    pub async fn start(&self, request: &DownloadRequest) -> Result<Response> {
        let url = endpoint(self.base_url, "/download/song", &[])?;
        debug!(url = %url, title = %request.title, source = %request.source, "Requesting download");

        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.id_token)
            .json(request)
            .send()
            .await
            .map_err(send_error)?;
        ensure_success(response).await
    }

    /// Read the progress stream to the end.
    ///
    /// Chunks are decoded incrementally; every completed message is applied
    /// to the tracker and handed to `on_update`.
    pub async fn follow<F>(
        response: Response,
        title: &str,
        mut on_update: F,
    ) -> Result<DownloadProgressTracker>
    where
        F: FnMut(&DownloadUpdate, &DownloadProgressTracker),
    {
        let mut decoder = DownloadDecoder::new();
        let mut tracker = DownloadProgressTracker::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let updates = decoder
                .push(&chunk)
                .map_err(|e| ClientError::ParseError(e.to_string()))?;

            for update in updates {
                tracker.apply(&update);
                on_update(&update, &tracker);
            }
        }

        decoder
            .finish()
            .map_err(|e| ClientError::ParseError(e.to_string()))?;

        info!(
            title = %title,
            steps = tracker.steps().len(),
            complete = tracker.is_complete(),
            "Download stream finished"
        );
        Ok(tracker)
    }
}
