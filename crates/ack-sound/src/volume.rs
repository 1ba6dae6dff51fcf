//! Master volume level.

use serde::{Deserialize, Serialize};

/// Normalized volume level in `0.0..=1.0`.
///
/// Construction always clamps, so a `Volume` is never out of range.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Volume(f32);

impl Volume {
    /// Silence.
    pub const MUTE: Self = Self(0.0);

    /// Full volume.
    pub const MAX: Self = Self(1.0);

    /// Creates a volume, clamping to `0.0..=1.0`. NaN maps to silence.
    #[must_use]
    pub fn new(level: f32) -> Self {
        if level.is_nan() {
            return Self::MUTE;
        }
        Self(level.clamp(0.0, 1.0))
    }

    /// Converts from the engine's 0-255 byte scale.
    #[must_use]
    pub fn from_byte(level: u8) -> Self {
        Self(f32::from(level) / 255.0)
    }

    /// Returns the level as a byte on the 0-255 scale.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        (self.0 * 255.0).round() as u8
    }

    /// Returns the normalized level.
    #[must_use]
    pub const fn level(self) -> f32 {
        self.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::MAX
    }
}

impl From<f32> for Volume {
    fn from(level: f32) -> Self {
        Self::new(level)
    }
}

impl From<Volume> for f32 {
    fn from(volume: Volume) -> Self {
        volume.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_clamps() {
        assert!((Volume::new(1.5).level() - 1.0).abs() < f32::EPSILON);
        assert!(Volume::new(-0.3).level().abs() < f32::EPSILON);
        assert!(Volume::new(f32::NAN).level().abs() < f32::EPSILON);
        assert!((Volume::new(0.25).level() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_byte_scale() {
        assert_eq!(Volume::from_byte(255), Volume::MAX);
        assert_eq!(Volume::from_byte(0), Volume::MUTE);
        assert_eq!(Volume::from_byte(128).to_byte(), 128);
    }
}
