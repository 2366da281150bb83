//! Terminal playback session
//!
//! The CLI has no audio output. `SimulatedMedia` stands in for the media
//! element: it accepts resolved audio, estimates a duration from its size and
//! advances a clock while playing. The session drives a
//! [`PlaybackController`] through the queue exactly like a UI would, feeding
//! time updates and end-of-track signals.

use crate::error::Result;
use crate::render::{song_line, transport_line};
use melo_core::{AudioResource, Playlist, Song, SongId};
use melo_playback::{
    EntryId, LoadOutcome, MediaElement, NowPlayingView, PlaybackController, PlaybackEvent,
    Queue, QueueView, ReadyState,
};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Bitrate used to estimate a duration from the encoded size
const ASSUMED_BITRATE_BPS: f64 = 128_000.0;

/// Media element that plays silence on a clock
#[derive(Debug)]
pub struct SimulatedMedia {
    source: Option<SongId>,
    duration: Option<Duration>,
    /// Position at the last pause or seek
    offset: Duration,
    /// Set while playing
    started: Option<Instant>,
    volume: f64,
    muted: bool,
}

impl SimulatedMedia {
    pub fn new() -> Self {
        Self {
            source: None,
            duration: None,
            offset: Duration::ZERO,
            started: None,
            volume: 1.0,
            muted: false,
        }
    }

    fn clamp(&self, position: Duration) -> Duration {
        self.duration.map_or(position, |d| position.min(d))
    }
}

impl Default for SimulatedMedia {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaElement for SimulatedMedia {
    fn load(&mut self, resource: &AudioResource) -> melo_playback::Result<()> {
        let seconds = resource.len() as f64 * 8.0 / ASSUMED_BITRATE_BPS;
        self.duration = (seconds > 0.0).then(|| Duration::from_secs_f64(seconds));
        self.source = Some(resource.song_id.clone());
        self.offset = Duration::ZERO;
        self.started = None;
        debug!(
            song_id = %resource.song_id,
            bytes = resource.len(),
            content_type = resource.content_type.as_deref().unwrap_or("unknown"),
            "Media source replaced"
        );
        Ok(())
    }

    fn play(&mut self) -> melo_playback::Result<()> {
        if self.source.is_none() {
            return Err(melo_playback::PlaybackError::Media(
                "no source loaded".to_string(),
            ));
        }
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.offset = self.position();
        self.started = None;
    }

    fn is_paused(&self) -> bool {
        self.started.is_none()
    }

    fn is_ended(&self) -> bool {
        self.duration.is_some_and(|d| self.position() >= d)
    }

    fn ready_state(&self) -> ReadyState {
        if self.source.is_some() {
            ReadyState::HaveEnoughData
        } else {
            ReadyState::HaveNothing
        }
    }

    fn position(&self) -> Duration {
        let running = self.started.map_or(Duration::ZERO, |s| s.elapsed());
        self.clamp(self.offset + running)
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn seek(&mut self, position: Duration) -> melo_playback::Result<()> {
        self.offset = self.clamp(position);
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
        Ok(())
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

/// Queue view that logs every change
#[derive(Debug, Default)]
pub struct LoggingQueueView;

impl QueueView for LoggingQueueView {
    fn insert(&mut self, id: EntryId, song: &Song, before: Option<EntryId>) {
        debug!(entry = %id, title = %song.title, before = ?before, "Queue row inserted");
    }

    fn move_before(&mut self, id: EntryId, before: Option<EntryId>) {
        debug!(entry = %id, before = ?before, "Queue row moved");
    }

    fn remove(&mut self, id: EntryId) {
        debug!(entry = %id, "Queue row removed");
    }

    fn set_current(&mut self, id: EntryId, current: bool) {
        debug!(entry = %id, current, "Queue marker");
    }
}

/// Now-playing panel printed to stdout
#[derive(Debug, Default)]
pub struct PrintNowPlaying;

impl NowPlayingView for PrintNowPlaying {
    fn show(&mut self, song: &Song) {
        println!("▶ {}", song_line(song));
    }

    fn clear(&mut self) {
        println!("■ queue finished");
    }
}

/// How the session walks the queue
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Interval between time updates
    pub tick: Duration,
    /// Skip to the next entry after this much of each song
    pub preview: Option<Duration>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            preview: None,
        }
    }
}

/// Songs of `playlist` in play order, shuffled on request
pub fn playlist_order(playlist: Playlist, shuffle: bool) -> Vec<Song> {
    if shuffle {
        melo_playback::shuffled(&playlist.songs)
    } else {
        playlist.songs
    }
}

/// Queue `songs` and play them through; returns how many songs finished
/// or were skipped
pub async fn play_through(
    controller: &PlaybackController,
    songs: Vec<Song>,
    options: SessionOptions,
) -> Result<usize> {
    if songs.is_empty() {
        info!("Nothing to play");
        return Ok(0);
    }

    for song in songs {
        if let Err(e) = controller.enqueue(song).await {
            warn!(error = %e, "First song failed to load");
        }
    }
    log_events(controller).await;

    if controller.loaded_song().await.is_none() {
        // The first entry failed to load; move on to one that does.
        if advance(controller, false).await?.is_none() {
            return Ok(0);
        }
    } else {
        controller.resume().await?;
        controller.on_duration_change().await;
    }

    let mut played = 0;
    loop {
        tokio::time::sleep(options.tick).await;

        let times = controller.on_time_update().await;
        println!("  {}", transport_line(&times));
        log_events(controller).await;

        let finished = times.remaining == Some(Duration::ZERO);
        let previewed = options.preview.is_some_and(|p| times.elapsed >= p);
        if !finished && !previewed {
            continue;
        }

        played += 1;
        if advance(controller, finished).await?.is_none() {
            break;
        }
    }

    log_events(controller).await;
    info!(played, "Session finished");
    Ok(played)
}

/// Move to the next entry, skipping songs that fail to load
///
/// `ended` reports a natural end, which also empties the transport when the
/// queue is exhausted.
async fn advance(controller: &PlaybackController, ended: bool) -> Result<Option<LoadOutcome>> {
    let mut ended = ended;
    loop {
        let step = if ended {
            controller.on_ended().await
        } else {
            controller.next_track().await
        };
        log_events(controller).await;

        match step {
            Ok(Some(outcome)) => {
                controller.on_duration_change().await;
                return Ok(Some(outcome));
            }
            Ok(None) => return Ok(None),
            Err(melo_playback::PlaybackError::Resolution(e)) => {
                warn!(error = %e, "Skipping song");
                // The cursor went back to the loaded song; step onto the
                // failed entry so the next attempt moves past it.
                controller.with_queue(Queue::next).await;
                ended = false;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn log_events(controller: &PlaybackController) {
    for event in controller.drain_events().await {
        match event {
            PlaybackEvent::PositionUpdate { .. } => {}
            PlaybackEvent::Error { message } => warn!(%message, "Playback error"),
            other => debug!(event = ?other, "Playback event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(bytes: usize) -> AudioResource {
        AudioResource::new(SongId::new("s1"), Some("audio/mpeg".into()), vec![0; bytes])
    }

    #[test]
    fn duration_is_estimated_from_size() {
        let mut media = SimulatedMedia::new();
        media.load(&resource(160_000)).unwrap();
        assert_eq!(media.duration(), Some(Duration::from_secs(10)));
        assert!(media.is_paused());
        assert_eq!(media.position(), Duration::ZERO);
    }

    #[test]
    fn playlist_order_keeps_or_shuffles_songs() {
        let mut playlist = Playlist::new("Mix");
        playlist.songs = (0..8)
            .map(|i| Song::new(i.to_string(), format!("Song {i}"), "Artist"))
            .collect();
        let in_order: Vec<String> = playlist.songs.iter().map(|s| s.id.to_string()).collect();

        let kept: Vec<String> = playlist_order(playlist.clone(), false)
            .iter()
            .map(|s| s.id.to_string())
            .collect();
        assert_eq!(kept, in_order);

        let mut shuffled: Vec<String> = playlist_order(playlist, true)
            .iter()
            .map(|s| s.id.to_string())
            .collect();
        shuffled.sort();
        let mut sorted = in_order;
        sorted.sort();
        assert_eq!(shuffled, sorted);
    }

    #[test]
    fn play_requires_a_source() {
        let mut media = SimulatedMedia::new();
        assert!(media.play().is_err());
        assert_eq!(media.ready_state(), ReadyState::HaveNothing);
    }

    #[tokio::test(start_paused = true)]
    async fn clock_advances_only_while_playing() {
        let mut media = SimulatedMedia::new();
        media.load(&resource(160_000)).unwrap();
        media.play().unwrap();

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(media.position(), Duration::from_secs(3));
        assert!(media.is_playing());

        media.pause();
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(media.position(), Duration::from_secs(3));

        media.seek(Duration::from_secs(9)).unwrap();
        media.play().unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(media.position(), Duration::from_secs(10));
        assert!(media.is_ended());
        assert!(!media.is_playing());
    }
}
