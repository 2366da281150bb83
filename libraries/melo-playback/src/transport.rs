//! Transport display state: clock labels and the seek control

use crate::types::SeekOrigin;
use melo_core::format::{clock_label, slider_fill_percent};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Elapsed / remaining time as shown beside the seek control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportTimes {
    pub elapsed: Duration,
    /// `None` while the duration is unknown
    pub remaining: Option<Duration>,
    pub elapsed_label: String,
    pub remaining_label: String,
    /// Seek control fill in percent, zero while the duration is unknown
    pub progress: f64,
}

impl TransportTimes {
    /// Compute labels from a position and an optional duration
    pub fn new(position: Duration, duration: Option<Duration>) -> Self {
        let remaining = duration.map(|d| d.saturating_sub(position));
        Self {
            elapsed: position,
            remaining,
            elapsed_label: clock_label(position.as_secs_f64()),
            remaining_label: clock_label(remaining.map_or(f64::NAN, |r| r.as_secs_f64())),
            progress: duration.map_or(0.0, |d| {
                slider_fill_percent(position.as_secs_f64(), 0.0, d.as_secs_f64())
            }),
        }
    }
}

/// An input on the seek control, tagged with who caused it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekInput {
    /// Control value in seconds
    pub value: f64,
    pub origin: SeekOrigin,
}

impl SeekInput {
    /// The user moved the control
    pub fn user(value: f64) -> Self {
        Self {
            value,
            origin: SeekOrigin::User,
        }
    }

    /// The position was reflected into the control
    pub fn tick(value: f64) -> Self {
        Self {
            value,
            origin: SeekOrigin::PositionTick,
        }
    }
}

/// Seek control model (a range input measured in seconds)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeekControl {
    value: f64,
    max: f64,
}

impl SeekControl {
    /// Reset for a new duration
    pub fn reset(&mut self, duration: Option<Duration>) {
        self.value = 0.0;
        self.max = duration.map_or(0.0, |d| d.as_secs_f64());
    }

    /// Reflect the playback position; the returned input must not seek
    pub fn reflect(&mut self, position: Duration) -> SeekInput {
        self.value = position.as_secs_f64().min(self.max.max(0.0));
        SeekInput::tick(self.value)
    }

    /// Apply an input and return the position to seek to, if any
    ///
    /// Only user inputs produce a seek target; whole seconds, like the
    /// integer value of a range input.
    pub fn apply(&mut self, input: SeekInput) -> Option<Duration> {
        match input.origin {
            SeekOrigin::PositionTick => None,
            SeekOrigin::User => {
                let secs = input.value.clamp(0.0, self.max.max(0.0)).floor();
                self.value = secs;
                Some(Duration::from_secs(secs as u64))
            }
        }
    }

    /// Current value in seconds
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Maximum value in seconds
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Fill percentage for styling the control track
    pub fn fill_percent(&self) -> f64 {
        slider_fill_percent(self.value, 0.0, self.max)
    }
}
