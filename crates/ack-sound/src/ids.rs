//! ID types for sounds, music tracks and mixer playback instances.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a sound effect in the sound store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SoundId(u32);

impl SoundId {
    /// Creates a sound ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sound #{}", self.0)
    }
}

/// Identifier of a music track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MusicId(u32);

impl MusicId {
    /// Creates a music ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MusicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "music #{}", self.0)
    }
}

/// Opaque reference to a playback instance owned by a mixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MixerHandle(u64);

impl MixerHandle {
    /// Creates a handle from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Issues unique mixer handles.
#[derive(Debug, Default)]
pub struct HandleGenerator {
    next_id: u64,
}

impl HandleGenerator {
    /// Creates a new handle generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Generates the next unique handle.
    pub fn next_handle(&mut self) -> MixerHandle {
        // Default-constructed generators start at zero; skip it so raw 0 never escapes.
        if self.next_id == 0 {
            self.next_id = 1;
        }
        let handle = MixerHandle(self.next_id);
        self.next_id += 1;
        handle
    }
}
