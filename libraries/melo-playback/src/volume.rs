//! Volume control with a perceptual curve
//!
//! The slider position (0-100%) maps to output gain as `(percent / 100)^4`,
//! so the lower half of the slider covers the quiet range the ear resolves
//! best.

use serde::{Deserialize, Serialize};

/// Gain above which the loud icon is shown (0.5^4)
const LOUD_THRESHOLD: f64 = 0.0625;

/// Volume controller with quartic scaling
#[derive(Debug, Clone)]
pub struct Volume {
    /// Slider position (0-100)
    level: u8,

    /// Mute state (preserves volume level)
    muted: bool,

    /// Cached linear gain multiplier
    linear_gain: f64,
}

impl Volume {
    /// Create new volume controller
    ///
    /// # Arguments
    /// * `level` - Initial slider position (0-100, clamped)
    pub fn new(level: u8) -> Self {
        let level = level.min(100);
        Self {
            level,
            muted: false,
            linear_gain: Self::calculate_linear_gain(level),
        }
    }

    /// Set slider position (0-100)
    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(100);
        self.linear_gain = Self::calculate_linear_gain(self.level);
    }

    /// Current slider position (0-100)
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Set mute state (preserves volume level)
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Linear gain for the media element, ignoring mute
    pub fn gain(&self) -> f64 {
        self.linear_gain
    }

    /// Icon tier for the current state
    pub fn icon(&self) -> VolumeIcon {
        VolumeIcon::for_output(self.linear_gain, self.muted)
    }

    /// Convert slider percentage to linear gain: `(level / 100)^4`
    ///
    /// - 0%   → 0.0
    /// - 50%  → 0.0625
    /// - 80%  → 0.4096
    /// - 100% → 1.0
    fn calculate_linear_gain(level: u8) -> f64 {
        (f64::from(level) / 100.0).powi(4)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Volume icon tiers shown on the mute button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeIcon {
    /// Output muted
    Off,
    /// Gain above 6.25%
    Up,
    /// Gain above zero
    Down,
    /// Gain exactly zero
    Mute,
}

impl VolumeIcon {
    /// Tier for a media element's gain and mute flag
    pub fn for_output(gain: f64, muted: bool) -> Self {
        if muted {
            VolumeIcon::Off
        } else if gain > LOUD_THRESHOLD {
            VolumeIcon::Up
        } else if gain > 0.0 {
            VolumeIcon::Down
        } else {
            VolumeIcon::Mute
        }
    }

    /// Material icon ligature for the tier
    pub fn icon_name(self) -> &'static str {
        match self {
            VolumeIcon::Off => "volume_off",
            VolumeIcon::Up => "volume_up",
            VolumeIcon::Down => "volume_down",
            VolumeIcon::Mute => "volume_mute",
        }
    }
}
