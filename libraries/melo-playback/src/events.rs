//! Playback Events
//!
//! Event-based communication for UI synchronization. Events are queued by the
//! controller and drained by the front end:
//! - State changes (loading/play/pause/empty)
//! - Song changes (after a resolved load)
//! - Position and duration updates
//! - Volume changes (with the derived icon tier)
//! - Resolution errors

use crate::types::PlaybackState;
use crate::volume::VolumeIcon;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Controller state changed
    StateChanged {
        /// The new state
        state: PlaybackState,
    },

    /// A song finished resolving and is now the media source
    SongChanged {
        /// ID of the new (loaded) song
        song_id: String,
        /// ID of the previously loaded song (if any)
        previous_song_id: Option<String>,
    },

    /// A resolution finished after a newer load was requested; discarded
    LoadSuperseded {
        /// ID of the song whose result was dropped
        song_id: String,
    },

    /// Song played through to the end
    TrackFinished {
        /// ID of the finished song
        song_id: String,
    },

    /// Position tick
    PositionUpdate {
        position_ms: u64,
        /// Zero while unknown
        duration_ms: u64,
        elapsed_label: String,
        remaining_label: String,
    },

    /// Media reported a new duration; seek control reset
    DurationChanged {
        duration_ms: u64,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// Slider position (0-100)
        level: u8,
        /// Whether audio is muted
        is_muted: bool,
        /// Derived icon tier
        icon: VolumeIcon,
    },

    /// Queue changed (songs added/removed/reordered)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Error occurred; playback state left unchanged
    Error {
        /// Error message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_variant_name() {
        let event = PlaybackEvent::StateChanged {
            state: PlaybackState::Paused,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["StateChanged"]["state"], "Paused");
    }
}
