//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback controller state
///
/// ```text
/// Empty ──set_song──▶ Loading ──resolved──▶ Paused ◀──toggle──▶ Playing
///                        │                                        │
///                        └── error: previous state      ended ────┘
///                                                  (next entry or Empty)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No song loaded
    Empty,

    /// Resource resolution in flight
    Loading,

    /// Song loaded, transport paused
    Paused,

    /// Currently playing
    Playing,
}

/// Retry policy for resource resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first (minimum 1)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl RetryPolicy {
    /// Policy that tries exactly once
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay_ms: 0,
        }
    }

    /// Delay between attempts
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Attempts to make, never less than one
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    250
}

/// Configuration for the playback controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Initial volume slider position (0-100, default: 100)
    #[serde(default = "default_volume")]
    pub volume: u8,

    /// Resource resolution retries
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_volume() -> u8 {
    100
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Media element readiness, ordered like `HTMLMediaElement.readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReadyState {
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

/// Who moved the seek control
///
/// Reflecting the playback position into the control must not be mistaken
/// for a user seek, otherwise every tick would seek the media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeekOrigin {
    /// The user dragged or clicked the control
    User,
    /// The controller reflected a position tick
    PositionTick,
}

/// Hardware / OS media-session actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKey {
    PlayPause,
    Play,
    Pause,
    NextTrack,
    PreviousTrack,
}
