/// Song download request and progress stream types
use super::search::{CatalogSong, VideoResult};
use crate::error::{MeloError, Result};
use serde::{Deserialize, Serialize};

/// Body of `POST /download/song`
///
/// Pairs catalog metadata with the provider video used as the audio source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork: String,
    /// Provider video id
    pub source: String,
}

impl DownloadRequest {
    /// Build a request from the user's catalog and video selections
    pub fn from_selection(song: &CatalogSong, video: &VideoResult) -> Self {
        Self {
            title: song.title.clone(),
            artist: song.artist.clone(),
            album: song.album.clone(),
            artwork: song.artwork.clone(),
            source: video.id.clone(),
        }
    }
}

/// Progress of one named download step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepProgress {
    pub step: String,
    /// Percent complete, 0-100
    pub progress: f64,
    #[serde(default)]
    pub done: bool,
}

/// One message of the download progress stream
///
/// The first message announces the step names; every following message
/// reports progress of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DownloadUpdate {
    /// `{"steps": ["Download", "Extract"]}`
    Steps { steps: Vec<String> },
    /// `{"step": "Download", "progress": 42, "done": false}`
    Progress(StepProgress),
}

/// Incremental decoder for the download progress stream
///
/// The server writes one JSON object per message; chunk boundaries do not
/// line up with message boundaries, so partial objects are buffered until the
/// rest arrives. Objects may be separated by newlines or not at all.
#[derive(Debug, Default)]
pub struct DownloadDecoder {
    buf: Vec<u8>,
}

impl DownloadDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every message it completed
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<DownloadUpdate>> {
        self.buf.extend_from_slice(chunk);

        let mut updates = Vec::new();
        let mut consumed = 0;
        {
            let mut stream =
                serde_json::Deserializer::from_slice(&self.buf).into_iter::<DownloadUpdate>();
            loop {
                match stream.next() {
                    Some(Ok(update)) => {
                        updates.push(update);
                        consumed = stream.byte_offset();
                    }
                    Some(Err(e)) if e.is_eof() => break,
                    Some(Err(e)) => return Err(MeloError::Serialization(e)),
                    None => {
                        consumed = stream.byte_offset();
                        break;
                    }
                }
            }
        }

        self.buf.drain(..consumed);
        Ok(updates)
    }

    /// Check that the stream ended on a message boundary
    pub fn finish(self) -> Result<()> {
        if self.buf.iter().all(u8::is_ascii_whitespace) {
            Ok(())
        } else {
            Err(MeloError::invalid_data(format!(
                "download stream ended mid-message ({} bytes pending)",
                self.buf.len()
            )))
        }
    }
}

/// Aggregated state of a download, one entry per announced step
#[derive(Debug, Clone, Default)]
pub struct DownloadProgressTracker {
    steps: Vec<StepProgress>,
}

impl DownloadProgressTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one stream message
    ///
    /// Progress for a step that was never announced is appended at the end.
    pub fn apply(&mut self, update: &DownloadUpdate) {
        match update {
            DownloadUpdate::Steps { steps } => {
                self.steps = steps
                    .iter()
                    .map(|name| StepProgress {
                        step: name.clone(),
                        progress: 0.0,
                        done: false,
                    })
                    .collect();
            }
            DownloadUpdate::Progress(progress) => {
                match self.steps.iter_mut().find(|s| s.step == progress.step) {
                    Some(step) => {
                        step.progress = progress.progress.clamp(0.0, 100.0);
                        step.done = progress.done;
                    }
                    None => self.steps.push(progress.clone()),
                }
            }
        }
    }

    /// Steps in announcement order
    pub fn steps(&self) -> &[StepProgress] {
        &self.steps
    }

    /// Progress of a step as a fraction in [0, 1]
    pub fn fraction(&self, step: &str) -> Option<f64> {
        self.steps
            .iter()
            .find(|s| s.step == step)
            .map(|s| s.progress / 100.0)
    }

    /// Whether every announced step reported done
    pub fn is_complete(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| s.done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_messages_split_across_chunks() {
        let mut decoder = DownloadDecoder::new();

        let first = decoder.push(br#"{"steps":["Download","Ext"#).unwrap();
        assert!(first.is_empty());

        let second = decoder
            .push(br#"ract"]}{"step":"Download","progress":0.5,"done":false}"#)
            .unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(
            second[0],
            DownloadUpdate::Steps {
                steps: vec!["Download".into(), "Extract".into()]
            }
        );
        assert!(matches!(&second[1], DownloadUpdate::Progress(p) if p.step == "Download"));

        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn newline_delimited_messages() {
        let mut decoder = DownloadDecoder::new();
        let updates = decoder
            .push(b"{\"step\":\"Extract\",\"progress\":100,\"done\":true}\n{\"step\":\"Ex")
            .unwrap();
        assert_eq!(updates.len(), 1);
        assert!(decoder.finish().is_err());
    }

    #[test]
    fn tracker_follows_steps() {
        let mut tracker = DownloadProgressTracker::new();
        tracker.apply(&DownloadUpdate::Steps {
            steps: vec!["Download".into(), "Extract".into()],
        });
        assert!(!tracker.is_complete());

        tracker.apply(&DownloadUpdate::Progress(StepProgress {
            step: "Download".into(),
            progress: 100.0,
            done: true,
        }));
        assert_eq!(tracker.fraction("Download"), Some(1.0));
        assert_eq!(tracker.fraction("Extract"), Some(0.0));

        tracker.apply(&DownloadUpdate::Progress(StepProgress {
            step: "Extract".into(),
            progress: 100.0,
            done: true,
        }));
        assert!(tracker.is_complete());
    }

    #[test]
    fn request_from_selection() {
        let song = CatalogSong {
            title: "Song".into(),
            album: "Album".into(),
            artwork: "art".into(),
            artist: "Artist".into(),
            duration: 200,
        };
        let video: VideoResult = serde_json::from_str(
            r#"{"id": "vid1", "publishedAt": "2020-01-01T00:00:00Z", "title": "t", "viewCount": "3"}"#,
        )
        .unwrap();

        let req = DownloadRequest::from_selection(&song, &video);
        assert_eq!(req.source, "vid1");
        assert_eq!(req.album, "Album");
    }
}
