//! Playback controller - transport orchestration
//!
//! Owns the queue and the single active media element, resolves songs into
//! playable audio, and derives the UI state (volume icon, clock labels, seek
//! control) from media notifications.
//!
//! All methods take `&self`. Mutable state sits behind an async mutex that is
//! released before every `.await`, so overlapping loads can interleave; each
//! load takes a ticket and only the latest ticket may touch the media.

use crate::{
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    media::MediaElement,
    queue::{EntryId, Queue},
    transport::{SeekControl, SeekInput, TransportTimes},
    types::{MediaKey, PlaybackConfig, PlaybackState, RetryPolicy},
    view::NowPlayingView,
    volume::{Volume, VolumeIcon},
};
use melo_core::{AudioResource, ResourceResolver, Song};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// How a `set_song` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The song is now the media source
    Loaded,
    /// A newer load was requested before this one finished; its result was
    /// discarded and the media element left untouched
    Superseded,
}

/// Playback controller
pub struct PlaybackController {
    resolver: Arc<dyn ResourceResolver>,
    retry: RetryPolicy,
    inner: Mutex<Inner>,
}

struct Inner {
    queue: Queue,
    media: Box<dyn MediaElement>,
    now_playing: Box<dyn NowPlayingView>,

    state: PlaybackState,

    /// Last state other than `Loading`, restored when a load fails
    stable_state: PlaybackState,

    /// Song currently assigned to the media element
    loaded: Option<Song>,

    /// Ticket of the most recent `set_song`
    load_generation: u64,

    volume: Volume,
    seek: SeekControl,

    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackController {
    /// Create a controller around an owned queue and media element
    ///
    /// Applies the configured initial volume to the media element.
    pub fn new(
        queue: Queue,
        mut media: Box<dyn MediaElement>,
        now_playing: Box<dyn NowPlayingView>,
        resolver: Arc<dyn ResourceResolver>,
        config: PlaybackConfig,
    ) -> Self {
        let volume = Volume::new(config.volume);
        media.set_volume(volume.gain());
        media.set_muted(false);

        Self {
            resolver,
            retry: config.retry,
            inner: Mutex::new(Inner {
                queue,
                media,
                now_playing,
                state: PlaybackState::Empty,
                stable_state: PlaybackState::Empty,
                loaded: None,
                load_generation: 0,
                volume,
                seek: SeekControl::default(),
                pending_events: Vec::new(),
            }),
        }
    }

    // ===== Loading =====

    /// Make `song` the media source, leaving it paused
    ///
    /// Pauses the current song and enters `Loading` while the resource is
    /// resolved. When a newer `set_song` starts before this one finishes, the
    /// result is dropped and `LoadOutcome::Superseded` is returned.
    ///
    /// # Errors
    /// Returns `PlaybackError::Resolution` when every attempt fails. The
    /// controller is put back into the state it had before the call.
    pub async fn set_song(&self, song: Song) -> Result<LoadOutcome> {
        let ticket = {
            let mut inner = self.inner.lock().await;
            inner.media.pause();
            inner.load_generation += 1;
            inner.set_state(PlaybackState::Loading);
            inner.load_generation
        };

        debug!(song_id = %song.id, ticket, "Resolving song");

        let Some(resolved) = self.resolve_with_retry(&song, ticket).await else {
            return Ok(self.discard(&song).await);
        };

        let mut inner = self.inner.lock().await;
        if inner.load_generation != ticket {
            drop(inner);
            return Ok(self.discard(&song).await);
        }

        match resolved {
            Ok(resource) => {
                if let Err(e) = inner.media.load(&resource) {
                    warn!(song_id = %song.id, error = %e, "Media rejected resource");
                    inner.restore_after_failure(&e);
                    return Err(e);
                }

                inner.now_playing.show(&song);
                let duration = inner.media.duration();
                inner.seek.reset(duration);

                let previous_song_id = inner
                    .loaded
                    .replace(song.clone())
                    .map(|previous| previous.id.to_string());
                inner.pending_events.push(PlaybackEvent::SongChanged {
                    song_id: song.id.to_string(),
                    previous_song_id,
                });
                inner.set_state(PlaybackState::Paused);

                info!(song_id = %song.id, title = %song.title, bytes = resource.len(), "Song loaded");
                Ok(LoadOutcome::Loaded)
            }
            Err(e) => {
                let err = PlaybackError::Resolution(e);
                warn!(song_id = %song.id, error = %err, "Giving up on song");
                inner.restore_after_failure(&err);
                Err(err)
            }
        }
    }

    /// Load `song` and start playing it
    ///
    /// # Errors
    /// Same as [`set_song`](Self::set_song), plus media errors on resume
    pub async fn play_song(&self, song: Song) -> Result<LoadOutcome> {
        let outcome = self.set_song(song).await?;
        if outcome == LoadOutcome::Loaded {
            self.inner.lock().await.resume()?;
        }
        Ok(outcome)
    }

    /// Resolve with retries; `None` once the ticket has been superseded
    async fn resolve_with_retry(
        &self,
        song: &Song,
        ticket: u64,
    ) -> Option<melo_core::Result<AudioResource>> {
        let attempts = self.retry.attempts();
        let mut attempt = 1;

        loop {
            match self.resolver.resolve(song).await {
                Ok(resource) => return Some(Ok(resource)),
                Err(e) if attempt < attempts => {
                    warn!(
                        song_id = %song.id,
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "Resolution failed, retrying"
                    );
                    tokio::time::sleep(self.retry.delay()).await;
                    if self.inner.lock().await.load_generation != ticket {
                        return None;
                    }
                    attempt += 1;
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }

    async fn discard(&self, song: &Song) -> LoadOutcome {
        debug!(song_id = %song.id, "Discarding superseded load");
        self.inner
            .lock()
            .await
            .pending_events
            .push(PlaybackEvent::LoadSuperseded {
                song_id: song.id.to_string(),
            });
        LoadOutcome::Superseded
    }

    // ===== Transport =====

    /// Pause if playing, otherwise resume
    ///
    /// Does nothing while empty or loading. Returns the resulting state.
    ///
    /// # Errors
    /// Returns media errors raised on resume
    pub async fn toggle_playback(&self) -> Result<PlaybackState> {
        let mut inner = self.inner.lock().await;
        match inner.state {
            PlaybackState::Empty | PlaybackState::Loading => {}
            _ if inner.media.is_playing() => inner.pause(),
            _ => inner.resume()?,
        }
        Ok(inner.state)
    }

    /// Resume the loaded song
    ///
    /// # Errors
    /// `NoSongLoaded` when nothing is loaded, or media errors
    pub async fn resume(&self) -> Result<()> {
        self.inner.lock().await.resume()
    }

    /// Pause the loaded song (no-op when nothing is playing)
    pub async fn pause(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state == PlaybackState::Playing {
            inner.pause();
        }
    }

    /// The media element reached the end of the song
    ///
    /// Plays the next queue entry, or stops and empties the transport when
    /// the queue is exhausted. If the next entry fails to load, the finished
    /// song stays loaded and paused and the cursor stays on it.
    ///
    /// # Errors
    /// Same as [`play_song`](Self::play_song)
    pub async fn on_ended(&self) -> Result<Option<LoadOutcome>> {
        let (left, target) = {
            let mut inner = self.inner.lock().await;
            let finished = inner.loaded.as_ref().map(|song| song.id.to_string());
            if let Some(song_id) = finished {
                inner
                    .pending_events
                    .push(PlaybackEvent::TrackFinished { song_id });
            }

            let left = inner.queue.current_id();
            if !inner.queue.next() {
                debug!("Queue exhausted");
                inner.media.pause();
                inner.loaded = None;
                inner.now_playing.clear();
                inner.seek.reset(None);
                inner.set_state(PlaybackState::Empty);
                return Ok(None);
            }

            // A failed load must not restart the finished song.
            inner.stable_state = PlaybackState::Paused;
            (left, landed(&inner.queue))
        };

        self.play_landed(left, target).await
    }

    /// Skip to the next queue entry and play it
    ///
    /// Returns `Ok(None)` and changes nothing at the end of the queue.
    ///
    /// # Errors
    /// Same as [`play_song`](Self::play_song). The cursor goes back to the
    /// entry it left.
    pub async fn next_track(&self) -> Result<Option<LoadOutcome>> {
        self.step(Queue::next).await
    }

    /// Go back to the previous queue entry and play it
    ///
    /// Returns `Ok(None)` and changes nothing at the start of the queue.
    ///
    /// # Errors
    /// Same as [`play_song`](Self::play_song). The cursor goes back to the
    /// entry it left.
    pub async fn previous_track(&self) -> Result<Option<LoadOutcome>> {
        self.step(Queue::previous).await
    }

    async fn step(&self, move_cursor: fn(&mut Queue) -> bool) -> Result<Option<LoadOutcome>> {
        let (left, target) = {
            let mut inner = self.inner.lock().await;
            let left = inner.queue.current_id();
            if !move_cursor(&mut inner.queue) {
                return Ok(None);
            }
            (left, landed(&inner.queue))
        };

        self.play_landed(left, target).await
    }

    /// Play the entry the cursor moved to, moving it back to `left` on failure
    async fn play_landed(
        &self,
        left: Option<EntryId>,
        target: Option<(EntryId, Song)>,
    ) -> Result<Option<LoadOutcome>> {
        let Some((arrived, song)) = target else {
            return Ok(None);
        };

        match self.play_song(song).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) => {
                let mut inner = self.inner.lock().await;
                if let Some(left) = left {
                    // Leave the cursor alone if something else moved it meanwhile.
                    if inner.queue.current_id() == Some(arrived) {
                        inner.queue.select(left);
                    }
                }
                Err(e)
            }
        }
    }

    /// Hardware / OS media-session action
    ///
    /// # Errors
    /// Propagates errors of the mapped operation
    pub async fn handle_media_key(&self, key: MediaKey) -> Result<()> {
        debug!(?key, "Media key");
        match key {
            MediaKey::PlayPause => self.toggle_playback().await.map(|_| ()),
            MediaKey::Play => self.resume().await,
            MediaKey::Pause => {
                self.pause().await;
                Ok(())
            }
            MediaKey::NextTrack => self.next_track().await.map(|_| ()),
            MediaKey::PreviousTrack => self.previous_track().await.map(|_| ()),
        }
    }

    // ===== Queue =====

    /// Append a song to the queue
    ///
    /// When the queue was empty the song becomes current and is loaded (not
    /// played).
    ///
    /// # Errors
    /// Load errors for a song that became current. The entry stays queued.
    pub async fn enqueue(&self, song: Song) -> Result<EntryId> {
        let outcome = {
            let mut inner = self.inner.lock().await;
            let outcome = inner.queue.push(song.clone());
            let length = inner.queue.len();
            inner
                .pending_events
                .push(PlaybackEvent::QueueChanged { length });
            outcome
        };

        debug!(song_id = %song.id, entry = %outcome.id, became_current = outcome.became_current, "Song queued");

        if outcome.became_current {
            self.set_song(song).await?;
        }
        Ok(outcome.id)
    }

    /// Run `f` against the queue, then report its length
    pub async fn with_queue<T>(&self, f: impl FnOnce(&mut Queue) -> T) -> T {
        let mut inner = self.inner.lock().await;
        let result = f(&mut inner.queue);
        let length = inner.queue.len();
        inner
            .pending_events
            .push(PlaybackEvent::QueueChanged { length });
        result
    }

    // ===== Volume =====

    /// Move the volume slider (0-100)
    pub async fn set_volume_percent(&self, percent: u8) {
        let mut inner = self.inner.lock().await;
        inner.volume.set_level(percent);
        let gain = inner.volume.gain();
        inner.media.set_volume(gain);
        inner.emit_volume_changed();
    }

    /// Flip the mute flag, keeping the slider position
    pub async fn toggle_mute(&self) -> bool {
        let mut inner = self.inner.lock().await;
        let muted = !inner.volume.is_muted();
        inner.volume.set_muted(muted);
        inner.media.set_muted(muted);
        inner.emit_volume_changed();
        muted
    }

    /// The media element reported a volume or mute change
    pub async fn on_volume_change(&self) -> VolumeIcon {
        let mut inner = self.inner.lock().await;
        let muted = inner.media.is_muted();
        inner.volume.set_muted(muted);
        inner.emit_volume_changed();
        inner.icon()
    }

    /// Icon tier for the media element's current output
    pub async fn volume_icon(&self) -> VolumeIcon {
        self.inner.lock().await.icon()
    }

    /// Current slider position (0-100)
    pub async fn volume_percent(&self) -> u8 {
        self.inner.lock().await.volume.level()
    }

    // ===== Time and seeking =====

    /// The media position advanced
    ///
    /// Recomputes the clock labels and reflects the position into the seek
    /// control without seeking.
    pub async fn on_time_update(&self) -> TransportTimes {
        let mut inner = self.inner.lock().await;
        let position = inner.media.position();
        let duration = inner.media.duration();

        inner.seek.reflect(position);

        let times = TransportTimes::new(position, duration);
        inner.pending_events.push(PlaybackEvent::PositionUpdate {
            position_ms: millis(position),
            duration_ms: duration.map_or(0, millis),
            elapsed_label: times.elapsed_label.clone(),
            remaining_label: times.remaining_label.clone(),
        });
        times
    }

    /// The media reported a new duration; resets the seek control
    pub async fn on_duration_change(&self) {
        let mut inner = self.inner.lock().await;
        let duration = inner.media.duration();
        inner.seek.reset(duration);
        inner.pending_events.push(PlaybackEvent::DurationChanged {
            duration_ms: duration.map_or(0, millis),
        });
    }

    /// Apply an input on the seek control
    ///
    /// Only user inputs move the media; returns the position sought to.
    ///
    /// # Errors
    /// Returns media errors raised by the seek
    pub async fn handle_seek_input(&self, input: SeekInput) -> Result<Option<Duration>> {
        let mut inner = self.inner.lock().await;
        if inner.loaded.is_none() {
            return Ok(None);
        }
        let Some(target) = inner.seek.apply(input) else {
            return Ok(None);
        };
        inner.media.seek(target)?;
        debug!(position_ms = millis(target), "Seeked");
        Ok(Some(target))
    }

    /// Copy of the seek control model
    pub async fn seek_control(&self) -> SeekControl {
        self.inner.lock().await.seek
    }

    // ===== State =====

    /// Current controller state
    pub async fn state(&self) -> PlaybackState {
        self.inner.lock().await.state
    }

    /// Song currently assigned to the media element
    pub async fn loaded_song(&self) -> Option<Song> {
        self.inner.lock().await.loaded.clone()
    }

    /// Take all events queued since the last call
    pub async fn drain_events(&self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.inner.lock().await.pending_events)
    }
}

/// Current entry id and song
fn landed(queue: &Queue) -> Option<(EntryId, Song)> {
    queue
        .current_entry()
        .map(|entry| (entry.id(), entry.song().clone()))
}

impl Inner {
    fn set_state(&mut self, state: PlaybackState) {
        if state != PlaybackState::Loading {
            self.stable_state = state;
        }
        if self.state != state {
            self.state = state;
            self.pending_events
                .push(PlaybackEvent::StateChanged { state });
        }
    }

    fn resume(&mut self) -> Result<()> {
        if self.loaded.is_none() {
            return Err(PlaybackError::NoSongLoaded);
        }
        self.media.play()?;
        self.set_state(PlaybackState::Playing);
        Ok(())
    }

    fn pause(&mut self) {
        self.media.pause();
        self.set_state(PlaybackState::Paused);
    }

    /// Put back the state from before the failed load
    ///
    /// The media was only paused, so a song that was playing resumes.
    fn restore_after_failure(&mut self, error: &PlaybackError) {
        let restored = match self.stable_state {
            PlaybackState::Playing if self.loaded.is_some() => match self.media.play() {
                Ok(()) => PlaybackState::Playing,
                Err(_) => PlaybackState::Paused,
            },
            PlaybackState::Playing | PlaybackState::Loading => {
                if self.loaded.is_some() {
                    PlaybackState::Paused
                } else {
                    PlaybackState::Empty
                }
            }
            other => other,
        };
        self.set_state(restored);
        self.pending_events.push(PlaybackEvent::Error {
            message: error.to_string(),
        });
    }

    fn icon(&self) -> VolumeIcon {
        VolumeIcon::for_output(self.media.volume(), self.media.is_muted())
    }

    fn emit_volume_changed(&mut self) {
        let icon = self.icon();
        self.pending_events.push(PlaybackEvent::VolumeChanged {
            level: self.volume.level(),
            is_muted: self.volume.is_muted(),
            icon,
        });
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReadyState;
    use crate::view::NullNowPlaying;
    use async_trait::async_trait;

    struct SilentMedia {
        paused: bool,
        position: Duration,
        volume: f64,
        muted: bool,
    }

    impl MediaElement for SilentMedia {
        fn load(&mut self, _resource: &AudioResource) -> Result<()> {
            self.position = Duration::ZERO;
            self.paused = true;
            Ok(())
        }
        fn play(&mut self) -> Result<()> {
            self.paused = false;
            Ok(())
        }
        fn pause(&mut self) {
            self.paused = true;
        }
        fn is_paused(&self) -> bool {
            self.paused
        }
        fn is_ended(&self) -> bool {
            false
        }
        fn ready_state(&self) -> ReadyState {
            ReadyState::HaveEnoughData
        }
        fn position(&self) -> Duration {
            self.position
        }
        fn duration(&self) -> Option<Duration> {
            Some(Duration::from_secs(200))
        }
        fn seek(&mut self, position: Duration) -> Result<()> {
            self.position = position;
            Ok(())
        }
        fn volume(&self) -> f64 {
            self.volume
        }
        fn set_volume(&mut self, volume: f64) {
            self.volume = volume;
        }
        fn is_muted(&self) -> bool {
            self.muted
        }
        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }
    }

    struct EchoResolver;

    #[async_trait]
    impl ResourceResolver for EchoResolver {
        async fn resolve(&self, song: &Song) -> melo_core::Result<AudioResource> {
            Ok(AudioResource::new(song.id.clone(), None, vec![0; 4]))
        }
    }

    fn controller(volume: u8) -> PlaybackController {
        let media = SilentMedia {
            paused: true,
            position: Duration::ZERO,
            volume: 1.0,
            muted: false,
        };
        PlaybackController::new(
            Queue::headless(),
            Box::new(media),
            Box::new(NullNowPlaying),
            Arc::new(EchoResolver),
            PlaybackConfig {
                volume,
                ..PlaybackConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn initial_volume_is_applied() {
        let controller = controller(50);
        assert_eq!(controller.volume_percent().await, 50);
        assert_eq!(controller.volume_icon().await, VolumeIcon::Down);
    }

    #[tokio::test]
    async fn toggle_is_noop_while_empty() {
        let controller = controller(100);
        assert_eq!(
            controller.toggle_playback().await.unwrap(),
            PlaybackState::Empty
        );
        assert!(matches!(
            controller.resume().await,
            Err(PlaybackError::NoSongLoaded)
        ));
    }

    #[tokio::test]
    async fn set_song_ends_paused() {
        let controller = controller(100);
        let outcome = controller
            .set_song(Song::new("a", "A", "Artist"))
            .await
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(controller.state().await, PlaybackState::Paused);
        assert_eq!(controller.seek_control().await.max(), 200.0);

        let events = controller.drain_events().await;
        assert_eq!(
            events.first(),
            Some(&PlaybackEvent::StateChanged {
                state: PlaybackState::Loading
            })
        );
        assert_eq!(
            events.last(),
            Some(&PlaybackEvent::StateChanged {
                state: PlaybackState::Paused
            })
        );
    }

    #[tokio::test]
    async fn seeking_without_song_does_nothing() {
        let controller = controller(100);
        let sought = controller
            .handle_seek_input(SeekInput::user(10.0))
            .await
            .unwrap();
        assert_eq!(sought, None);
    }

    #[test]
    fn millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
