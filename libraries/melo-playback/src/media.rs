//! Platform-agnostic media element trait
//!
//! Abstracts the single audio element the controller drives (an HTML media
//! element in a browser, a decoder + output stream on desktop).

use crate::error::Result;
use crate::types::ReadyState;
use melo_core::AudioResource;
use std::time::Duration;

/// The one active audio source owned by the playback controller
pub trait MediaElement: Send {
    /// Replace the source with `resource` and start loading it
    ///
    /// Leaves the element paused at position zero.
    fn load(&mut self, resource: &AudioResource) -> Result<()>;

    /// Resume playback
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self);

    /// Whether the element is paused
    fn is_paused(&self) -> bool;

    /// Whether playback reached the end of the source
    fn is_ended(&self) -> bool;

    /// How much data is buffered
    fn ready_state(&self) -> ReadyState;

    /// Current playback position
    fn position(&self) -> Duration;

    /// Source duration, `None` while unknown
    fn duration(&self) -> Option<Duration>;

    /// Move the playback position
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Output gain in [0, 1]
    fn volume(&self) -> f64;

    /// Set output gain in [0, 1]
    fn set_volume(&mut self, volume: f64);

    /// Whether output is muted
    fn is_muted(&self) -> bool;

    /// Mute or unmute output
    fn set_muted(&mut self, muted: bool);

    /// Whether audio is audibly playing right now
    ///
    /// Playing means: position past zero, not paused, not ended, and more
    /// than the current frame buffered.
    fn is_playing(&self) -> bool {
        self.position() > Duration::ZERO
            && !self.is_paused()
            && !self.is_ended()
            && self.ready_state() > ReadyState::HaveCurrentData
    }
}
