//! Playback session tests with an in-memory resolver and paused time

use async_trait::async_trait;
use melo_cli::session::{play_through, SessionOptions, SimulatedMedia};
use melo_core::{AudioResource, MeloError, ResourceResolver, Song};
use melo_playback::{
    NullNowPlaying, NullQueueView, PlaybackConfig, PlaybackController, PlaybackState, Queue,
    RetryPolicy,
};
use std::sync::Arc;
use std::time::Duration;

/// One second of audio at the simulated bitrate
const ONE_SECOND: usize = 16_000;

struct MemoryResolver {
    broken: Vec<&'static str>,
}

#[async_trait]
impl ResourceResolver for MemoryResolver {
    async fn resolve(&self, song: &Song) -> melo_core::Result<AudioResource> {
        if self.broken.contains(&song.id.as_str()) {
            return Err(MeloError::resolution(song.id.as_str(), "not found"));
        }
        Ok(AudioResource::new(
            song.id.clone(),
            Some("audio/mpeg".to_string()),
            vec![0; ONE_SECOND],
        ))
    }
}

fn controller(broken: Vec<&'static str>) -> PlaybackController {
    PlaybackController::new(
        Queue::new(Box::new(NullQueueView)),
        Box::new(SimulatedMedia::new()),
        Box::new(NullNowPlaying),
        Arc::new(MemoryResolver { broken }),
        PlaybackConfig {
            volume: 100,
            retry: RetryPolicy::none(),
        },
    )
}

fn songs() -> Vec<Song> {
    vec![
        Song::new("s1", "One", "Band"),
        Song::new("s2", "Two", "Band"),
        Song::new("s3", "Three", "Band"),
    ]
}

fn options() -> SessionOptions {
    SessionOptions {
        tick: Duration::from_millis(250),
        preview: None,
    }
}

#[tokio::test(start_paused = true)]
async fn test_plays_every_song_to_the_end() {
    let controller = controller(vec![]);

    let played = play_through(&controller, songs(), options()).await.unwrap();

    assert_eq!(played, 3);
    assert_eq!(controller.state().await, PlaybackState::Empty);
    assert!(controller.loaded_song().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_skips_songs_that_fail_to_resolve() {
    let controller = controller(vec!["s2"]);

    let played = play_through(&controller, songs(), options()).await.unwrap();

    assert_eq!(played, 2);
    assert_eq!(controller.state().await, PlaybackState::Empty);
}

#[tokio::test(start_paused = true)]
async fn test_first_song_failure_starts_from_the_second() {
    let controller = controller(vec!["s1"]);

    let played = play_through(&controller, songs(), options()).await.unwrap();

    assert_eq!(played, 2);
}

#[tokio::test(start_paused = true)]
async fn test_failing_last_song_ends_session() {
    let controller = controller(vec!["s3"]);

    let played = play_through(&controller, songs(), options()).await.unwrap();

    assert_eq!(played, 2);
    assert_eq!(controller.state().await, PlaybackState::Paused);
    assert_eq!(
        controller.loaded_song().await.map(|s| s.title),
        Some("Two".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_preview_skips_ahead() {
    let controller = controller(vec![]);
    let options = SessionOptions {
        tick: Duration::from_millis(100),
        preview: Some(Duration::from_millis(300)),
    };

    let played = play_through(&controller, songs(), options).await.unwrap();

    // next_track at the tail changes nothing, so the last song stays loaded.
    assert_eq!(played, 3);
    assert_eq!(
        controller.loaded_song().await.map(|s| s.title),
        Some("Three".to_string())
    );
}

#[tokio::test]
async fn test_empty_session_plays_nothing() {
    let controller = controller(vec![]);
    assert_eq!(play_through(&controller, vec![], options()).await.unwrap(), 0);
    assert_eq!(controller.state().await, PlaybackState::Empty);
}
